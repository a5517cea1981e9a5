/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io;

use crate::traits::*;
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

/// An implementation of [`ByteRead`] and [`ByteSeek`] for a slice.
///
/// Seeking beyond the end of the slice is allowed; reads after such a seek
/// report exhaustion.
///
/// # Example
/// ```
/// use bitcursor::prelude::*;
/// let data = [0x5a_u8, 0xc3];
/// let mut cursor = BitCursor::new();
/// cursor.open(MemByteReader::new(&data), 64)?;
/// assert_eq!(cursor.read_unsigned_int(12)?, 0x35a);
/// # Ok::<(), bitcursor::error::CursorError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
pub struct MemByteReader<B: AsRef<[u8]>> {
    data: B,
    byte_index: usize,
}

impl<B: AsRef<[u8]>> MemByteReader<B> {
    /// Create a new [`MemByteReader`] from a slice of data
    #[must_use]
    pub fn new(data: B) -> Self {
        Self {
            data,
            byte_index: 0,
        }
    }

    /// Return the current position in bytes.
    #[must_use]
    pub fn byte_pos(&self) -> usize {
        self.byte_index
    }

    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]>> ByteRead for MemByteReader<B> {
    #[inline]
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.as_ref();
        // past the end after a seek: nothing to copy, position unchanged
        let start = self.byte_index.min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.byte_index += n;
        Ok(n)
    }

    #[inline(always)]
    fn as_seek(&mut self) -> Option<&mut dyn ByteSeek> {
        Some(self)
    }
}

impl<B: AsRef<[u8]>> ByteSeek for MemByteReader<B> {
    #[inline]
    fn seek_forward(&mut self, n_bytes: u64) -> io::Result<u64> {
        let n_bytes = usize::try_from(n_bytes)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Seek offset overflow"))?;
        self.byte_index = self.byte_index.saturating_add(n_bytes);
        Ok(self.byte_index as u64)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mem_byte_reader() -> anyhow::Result<()> {
        let data: Vec<u8> = (0..10).collect();
        let mut reader = MemByteReader::new(&data);
        let mut buf = [0_u8; 4];

        assert_eq!(reader.read_bytes(&mut buf)?, 4);
        assert_eq!(buf, [0, 1, 2, 3]);
        assert!(reader.as_seek().is_some());
        assert_eq!(reader.seek_forward(3)?, 7);
        assert_eq!(reader.read_bytes(&mut buf)?, 3);
        assert_eq!(&buf[..3], &[7, 8, 9]);
        assert_eq!(reader.read_bytes(&mut buf)?, 0);

        // beyond the end
        assert_eq!(reader.seek_forward(5)?, 15);
        assert_eq!(reader.read_bytes(&mut buf)?, 0);
        assert_eq!(reader.byte_pos(), 15);
        assert_eq!(reader.read_bytes(&mut buf)?, 0);
        assert_eq!(reader.seek_forward(2)?, 17);
        assert_eq!(reader.byte_pos(), 17);
        Ok(())
    }
}
