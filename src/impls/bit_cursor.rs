/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::error::{CursorError, Result};
use crate::params::{check_buffer_size, CursorParams, SLED_BYTES};
use crate::traits::*;

mod chunks;

/// A buffered, little-endian bit cursor over a [`ByteRead`].
///
/// The cursor keeps a window of the source in an internal byte buffer. The
/// first [`SLED_BYTES`] bytes of the buffer, the *sled*, hold the tail of the
/// previous window, and the last [`SLED_BYTES`] bytes of a full window are
/// not counted as readable until the next refill moves them to the front.
/// As a consequence, every decode of at most 32 bits starting inside the
/// readable region can load a whole 64-bit word from the buffer, and all
/// boundary handling happens in the (rare) refill path.
///
/// Bits are numbered from the least significant bit of each byte, and
/// multi-bit values are assembled in little-endian order.
///
/// A cursor is created closed; [`open`](BitCursor::open) or
/// [`open_with_buffer`](BitCursor::open_with_buffer) attach a source, and
/// [`close`](BitCursor::close) detaches it and gives back the buffer, so that
/// both the cursor and the buffer can be reused.
///
/// # Example
/// ```
/// use bitcursor::prelude::*;
/// let data = [0b1010_0110_u8, 0xff, 0x00, b'h', b'i', 0, b'x'];
/// let mut cursor = BitCursor::new();
/// cursor.open(MemByteReader::new(&data), 32)?;
///
/// assert!(!cursor.read_bit()?);
/// assert_eq!(cursor.read_unsigned_int(3)?, 0b011);
/// assert_eq!(cursor.read_signed_int(4)?, -6);
/// cursor.begin_chunk(16)?;
/// assert_eq!(cursor.read_single_byte()?, 0xff);
/// cursor.end_chunk()?;
/// assert_eq!(cursor.read_cstring(4)?, "hi");
/// assert_eq!(cursor.actual_position(), 56);
/// # Ok::<(), bitcursor::error::CursorError>(())
/// ```
#[derive(Debug)]
pub struct BitCursor<R> {
    /// The source of bytes; [`None`] when the cursor is closed.
    source: Option<R>,
    /// The window over the source, sled included.
    buffer: Vec<u8>,
    /// The current bit offset from the start of the buffer.
    offset: usize,
    /// Number of readable bits from the start of the buffer. If the end of
    /// the source has not been reached it is always the size of the buffer
    /// minus the sled.
    bits_in_buffer: usize,
    /// The absolute bit position of the start of the buffer.
    lazy_pos: u64,
    /// Absolute bit positions of the ends of the open chunks.
    chunk_targets: Vec<u64>,
    /// Whether the last fill of the buffer exhausted the source.
    end_reached: bool,
}

impl<R> Default for BitCursor<R> {
    fn default() -> Self {
        Self {
            source: None,
            buffer: Vec::new(),
            offset: 0,
            bits_in_buffer: 0,
            lazy_pos: 0,
            chunk_targets: Vec::new(),
            end_reached: false,
        }
    }
}

impl<R> BitCursor<R> {
    /// Create a new closed cursor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return whether the cursor is open.
    #[inline(always)]
    pub fn is_open(&self) -> bool {
        self.source.is_some()
    }

    /// Return the size in bytes of the buffer, or zero if the cursor is closed.
    #[inline(always)]
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Return the absolute bit position of the start of the buffer, as of the
    /// last refill.
    ///
    /// This value changes only when the buffer is refilled or reloaded after
    /// a seek; use [`actual_position`](BitCursor::actual_position) for the
    /// current position.
    #[inline(always)]
    pub fn lazy_position(&self) -> u64 {
        self.lazy_pos
    }

    /// Return the current absolute bit position.
    #[inline(always)]
    pub fn actual_position(&self) -> u64 {
        self.lazy_pos + self.offset as u64
    }

    #[inline(always)]
    fn check_open(&self) -> Result<()> {
        if self.source.is_none() {
            return Err(CursorError::Closed);
        }
        Ok(())
    }

    /// Load the little-endian word starting at the given byte of the buffer,
    /// padding with zeros past the end of the buffer.
    #[inline(always)]
    fn word_at(&self, byte_index: usize) -> u64 {
        let mut word = [0_u8; 8];
        match self.buffer.get(byte_index..byte_index + 8) {
            Some(bytes) => word.copy_from_slice(bytes),
            None => {
                // only possible in the last window of the source
                let tail = &self.buffer[byte_index.min(self.buffer.len())..];
                word[..tail.len()].copy_from_slice(tail);
            }
        }
        u64::from_le_bytes(word)
    }

    #[cfg(feature = "checks")]
    fn check_invariants(&self) {
        assert_eq!(self.bits_in_buffer % 8, 0);
        assert!(self.bits_in_buffer <= self.buffer.len() * 8);
        assert!(
            self.end_reached || self.bits_in_buffer == (self.buffer.len() - SLED_BYTES) * 8,
            "a window not at the end of the source must reserve the sled"
        );
    }
}

impl<R: ByteRead> BitCursor<R> {
    /// Attach `source` using a newly allocated buffer of `buffer_size` bytes
    /// and fill the first window.
    ///
    /// If the cursor is already open, it is closed first.
    pub fn open(&mut self, source: R, buffer_size: usize) -> Result<()> {
        check_buffer_size(buffer_size)?;
        self.open_with_buffer(source, vec![0; buffer_size])
    }

    /// Like [`open`](BitCursor::open), taking the buffer size from `params`.
    pub fn open_with_params(&mut self, source: R, params: &CursorParams) -> Result<()> {
        self.open(source, params.buffer_size)
    }

    /// Like [`open`](BitCursor::open), but using the provided buffer, whose
    /// length (not capacity) is the buffer size.
    ///
    /// If the first window cannot be read, the error of the source is
    /// returned and the cursor is left closed.
    ///
    /// The buffer is handed back by [`close`](BitCursor::close), which makes
    /// it possible to pool buffers among short-lived cursors.
    pub fn open_with_buffer(&mut self, source: R, buffer: Vec<u8>) -> Result<()> {
        check_buffer_size(buffer.len())?;
        if self.is_open() {
            self.close()?;
        }
        self.source = Some(source);
        self.buffer = buffer;
        self.offset = 0;
        self.lazy_pos = 0;
        self.chunk_targets.clear();
        if let Err(e) = self.load_window() {
            // a cursor whose first window failed to load stays closed
            self.source = None;
            self.buffer = Vec::new();
            return Err(e);
        }
        Ok(())
    }

    /// Detach the source, closing it, and reset the cursor so that it can be
    /// opened again.
    ///
    /// Return the buffer used by the cursor, or an empty vector if the
    /// cursor was already closed.
    pub fn close(&mut self) -> Result<Vec<u8>> {
        let buffer = core::mem::take(&mut self.buffer);
        let source = self.source.take();
        self.offset = 0;
        self.bits_in_buffer = 0;
        self.lazy_pos = 0;
        self.chunk_targets.clear();
        self.end_reached = false;
        if let Some(mut source) = source {
            source.close()?;
        }
        Ok(buffer)
    }

    /// Return whether the source can seek, enabling the fast path of
    /// [`skip`](BitCursor::skip).
    pub fn is_seekable(&mut self) -> bool {
        self.source
            .as_mut()
            .is_some_and(|source| source.as_seek().is_some())
    }

    /// Read from the source into the buffer starting at `start` until the
    /// buffer is full or the source is exhausted. Return the number of bytes
    /// read.
    fn fill(&mut self, start: usize) -> Result<usize> {
        let source = self.source.as_mut().ok_or(CursorError::Closed)?;
        let mut filled = start;
        while filled < self.buffer.len() {
            match source.read_bytes(&mut self.buffer[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled - start)
    }

    /// Fill the whole buffer, whose first byte is at `lazy_pos`.
    ///
    /// This is used when there is no previous window to slide from, that is,
    /// at open time and after a seek.
    fn load_window(&mut self) -> Result<()> {
        let new_bytes = self.fill(0)?;
        if new_bytes == self.buffer.len() {
            self.end_reached = false;
            self.bits_in_buffer = (self.buffer.len() - SLED_BYTES) * 8;
        } else {
            // no more data: the last bytes need no protection
            self.end_reached = true;
            self.bits_in_buffer = new_bytes * 8;
        }
        #[cfg(feature = "checks")]
        self.check_invariants();
        Ok(())
    }

    /// Slide the window forward: move the sled to the front of the buffer
    /// and read fresh bytes after it.
    ///
    /// Must be called only when `offset >= bits_in_buffer`.
    fn refill(&mut self) -> Result<()> {
        if self.end_reached {
            return Err(CursorError::UnexpectedEnd {
                position: self.actual_position(),
            });
        }
        debug_assert!(self.offset >= self.bits_in_buffer);

        let consumed = self.bits_in_buffer;
        let tail = consumed / 8;
        self.buffer.copy_within(tail..tail + SLED_BYTES, 0);
        self.offset -= consumed;
        self.lazy_pos += consumed as u64;

        let new_bytes = self.fill(SLED_BYTES)?;
        if new_bytes == self.buffer.len() - SLED_BYTES {
            self.bits_in_buffer = new_bytes * 8;
        } else {
            // first time we see the end: consume the sled
            self.end_reached = true;
            self.bits_in_buffer = (SLED_BYTES + new_bytes) * 8;
        }
        #[cfg(feature = "checks")]
        self.check_invariants();
        Ok(())
    }

    /// Make sure that a decode of `n_bits` bits at the current offset reads
    /// only bytes of the source, refilling as needed.
    ///
    /// Before the end of the source, an offset inside the readable region is
    /// enough, as the sled covers any decode width; in the last window the
    /// whole decode must lie inside the readable region.
    #[inline(always)]
    fn ensure(&mut self, n_bits: usize) -> Result<()> {
        loop {
            if self.end_reached {
                if self.offset + n_bits > self.bits_in_buffer {
                    return Err(CursorError::UnexpectedEnd {
                        position: self.actual_position() + n_bits as u64,
                    });
                }
                return Ok(());
            }
            if self.offset < self.bits_in_buffer {
                return Ok(());
            }
            self.refill()?;
        }
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        self.check_open()?;
        self.ensure(1)?;
        let res = (self.buffer[self.offset >> 3] >> (self.offset & 7)) & 1 != 0;
        self.offset += 1;
        Ok(res)
    }

    /// Read the next `n` bits as an unsigned integer.
    ///
    /// # Panics
    /// If `n` is greater than 32.
    #[inline]
    pub fn read_unsigned_int(&mut self, n: usize) -> Result<u32> {
        assert!(n <= 32, "cannot read {} bits into an unsigned int (at most 32)", n);
        self.check_open()?;
        if n == 0 {
            return Ok(0);
        }
        self.ensure(n)?;
        let word = self.word_at(self.offset >> 3) >> (self.offset & 7);
        self.offset += n;
        Ok((word & ((1_u64 << n) - 1)) as u32)
    }

    /// Read the next `n` bits as a two's complement signed integer.
    ///
    /// # Panics
    /// If `n` is greater than 32.
    #[inline]
    pub fn read_signed_int(&mut self, n: usize) -> Result<i32> {
        assert!(n <= 32, "cannot read {} bits into a signed int (at most 32)", n);
        self.check_open()?;
        if n == 0 {
            return Ok(0);
        }
        self.ensure(n)?;
        let word = self.word_at(self.offset >> 3);
        // move the most significant bit read to the sign bit, then shift back
        // propagating it
        let res = ((word << (64 - (self.offset & 7) - n)) as i64) >> (64 - n);
        self.offset += n;
        Ok(res as i32)
    }

    /// Read the next `n` bits into a byte.
    ///
    /// # Panics
    /// If `n` is greater than 8.
    #[inline]
    pub fn read_bits_to_byte(&mut self, n: usize) -> Result<u8> {
        assert!(n <= 8, "cannot read {} bits into a byte (at most 8)", n);
        Ok(self.read_unsigned_int(n)? as u8)
    }

    /// Read the next 8 bits as a byte.
    #[inline]
    pub fn read_single_byte(&mut self) -> Result<u8> {
        self.check_open()?;
        if self.offset & 7 != 0 {
            return self.read_bits_to_byte(8);
        }
        self.ensure(8)?;
        let res = self.buffer[self.offset >> 3];
        self.offset += 8;
        Ok(res)
    }

    /// Fill `out` with the next `out.len()` bytes.
    ///
    /// If the cursor is byte-aligned, whole runs of buffered bytes are copied
    /// at once; otherwise bytes are assembled one by one.
    pub fn read_bytes_into_slice(&mut self, out: &mut [u8]) -> Result<()> {
        self.check_open()?;
        if self.offset & 7 != 0 {
            for byte in out.iter_mut() {
                *byte = self.read_bits_to_byte(8)?;
            }
            return Ok(());
        }

        let mut done = 0;
        while done < out.len() {
            self.ensure(8)?;
            // both values are multiples of 8, and ensure guarantees at least
            // one readable byte
            let available = (self.bits_in_buffer - self.offset) / 8;
            let len = available.min(out.len() - done);
            let start = self.offset >> 3;
            out[done..done + len].copy_from_slice(&self.buffer[start..start + len]);
            self.offset += len * 8;
            done += len;
        }
        Ok(())
    }

    /// Append the next `n` bytes to `out`.
    ///
    /// Useful to reuse the same vector for many reads.
    pub fn read_bytes_into(&mut self, out: &mut Vec<u8>, n: usize) -> Result<()> {
        let start = out.len();
        out.resize(start + n, 0);
        let res = self.read_bytes_into_slice(&mut out[start..]);
        if res.is_err() {
            out.truncate(start);
        }
        res
    }

    /// Read the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut res = Vec::with_capacity(n);
        self.read_bytes_into(&mut res, n)?;
        Ok(res)
    }

    /// Read the next `n` bits into `n.div_ceil(8)` bytes.
    ///
    /// The last byte contains the `n % 8` trailing bits in its lowest bits,
    /// if `n` is not a multiple of 8.
    pub fn read_bits_to_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut res = self.read_bytes(n / 8)?;
        if n % 8 != 0 {
            res.push(self.read_bits_to_byte(n % 8)?);
        }
        Ok(res)
    }

    /// Read exactly `n` bytes and return the ones before the first zero, or
    /// all of them if there is no zero.
    pub fn read_cstring_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut bytes = self.read_bytes(n)?;
        if let Some(end) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(end);
        }
        Ok(bytes)
    }

    /// Like [`read_cstring_bytes`](BitCursor::read_cstring_bytes), decoding
    /// the result as UTF-8; invalid sequences are replaced with
    /// [`char::REPLACEMENT_CHARACTER`].
    pub fn read_cstring(&mut self, n: usize) -> Result<String> {
        let bytes = self.read_cstring_bytes(n)?;
        Ok(match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

impl<R: ByteRead> BitRead for BitCursor<R> {
    type Error = CursorError;

    #[inline(always)]
    fn read_bit(&mut self) -> Result<bool> {
        BitCursor::read_bit(self)
    }

    #[inline(always)]
    fn read_bits(&mut self, n: usize) -> Result<u32> {
        self.read_unsigned_int(n)
    }

    #[inline(always)]
    fn skip_bits(&mut self, n: u64) -> Result<()> {
        self.skip(n)
    }
}

impl<R> BitSeek for BitCursor<R> {
    type Error = CursorError;

    #[inline(always)]
    fn bit_pos(&mut self) -> Result<u64> {
        Ok(self.actual_position())
    }
}
