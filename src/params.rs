/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Configuration of a [`BitCursor`](crate::impls::BitCursor).

The only knob is the size of the internal buffer. It has no observable
effect on decoded values, but larger buffers mean fewer refills and make
the seek-based skip of [`BitCursor::skip`](crate::impls::BitCursor::skip)
kick in only for longer distances.

The buffer starts with a reserved overlap region, the *sled*, holding the
tail of the previous window, so that a decode crossing the window boundary
always finds real bytes in memory. Its width is [`SLED_BYTES`], and the
buffer size must be a multiple of it and strictly larger than twice it.

*/

use crate::error::{CursorError, Result};
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

/// Width in bytes of the sled, that is, of the widest word loaded by a decode.
pub const SLED_BYTES: usize = 8;

/// Width in bits of the sled.
pub const SLED_BITS: usize = SLED_BYTES * 8;

/// Default buffer size in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 1 << 16;

/// Check that `size` can be used as the buffer size of a cursor.
pub fn check_buffer_size(size: usize) -> Result<()> {
    if size % SLED_BYTES != 0 || size <= 2 * SLED_BYTES {
        return Err(CursorError::InvalidBufferSize {
            size,
            sled: SLED_BYTES,
        });
    }
    Ok(())
}

/// Parameters used to open a cursor.
///
/// With the `serde` feature the parameters can be embedded in the
/// configuration of an application:
/// ```
/// # #[cfg(feature = "serde")]
/// # {
/// use bitcursor::params::CursorParams;
/// let params: CursorParams = serde_json::from_str(r#"{"buffer_size": 4096}"#).unwrap();
/// assert!(params.validate().is_ok());
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CursorParams {
    /// Size in bytes of the internal buffer.
    pub buffer_size: usize,
}

impl CursorParams {
    /// Create parameters with the given buffer size, checking it.
    pub fn new(buffer_size: usize) -> Result<Self> {
        let params = Self { buffer_size };
        params.validate()?;
        Ok(params)
    }

    /// Check that these parameters can be used to open a cursor.
    pub fn validate(&self) -> Result<()> {
        check_buffer_size(self.buffer_size)
    }
}

impl Default for CursorParams {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}
