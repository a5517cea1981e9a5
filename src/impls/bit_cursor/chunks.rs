/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Chunks and skips.
//!
//! A chunk is a span of a known number of bits starting at the current
//! position. Closing a chunk checks that the decoder did not read past its
//! end, and skips whatever was left unread.

use super::BitCursor;
use crate::error::{CursorError, Result};
use crate::params::{SLED_BITS, SLED_BYTES};
use crate::traits::*;

impl<R> BitCursor<R> {
    /// Return the number of open chunks.
    #[inline(always)]
    pub fn chunk_depth(&self) -> usize {
        self.chunk_targets.len()
    }

    /// Return the absolute position `n_bits` bits ahead; a position that
    /// does not fit in a `u64` is past the end of any source.
    #[inline(always)]
    fn target_of(&self, n_bits: u64) -> Result<u64> {
        self.actual_position()
            .checked_add(n_bits)
            .ok_or(CursorError::UnexpectedEnd { position: u64::MAX })
    }
}

impl<R: ByteRead> BitCursor<R> {
    /// Open a chunk of `n_bits` bits starting at the current position.
    ///
    /// Chunks nest: [`end_chunk`](BitCursor::end_chunk) closes the most
    /// recently opened one.
    pub fn begin_chunk(&mut self, n_bits: u64) -> Result<()> {
        self.check_open()?;
        let target = self.target_of(n_bits)?;
        self.chunk_targets.push(target);
        Ok(())
    }

    /// Return whether the current position has reached (or passed) the end
    /// of the innermost open chunk.
    pub fn chunk_finished(&self) -> Result<bool> {
        self.check_open()?;
        let target = self
            .chunk_targets
            .last()
            .ok_or(CursorError::NoOpenChunk)?;
        Ok(self.actual_position() >= *target)
    }

    /// Close the innermost open chunk, skipping to its end if it has not
    /// been read completely.
    ///
    /// Fails with [`CursorError::ChunkOverrun`] if more bits than declared
    /// have been read.
    pub fn end_chunk(&mut self) -> Result<()> {
        self.check_open()?;
        let target = self.chunk_targets.pop().ok_or(CursorError::NoOpenChunk)?;
        let position = self.actual_position();
        if position > target {
            return Err(CursorError::ChunkOverrun { target, position });
        }
        if position < target {
            self.skip(target - position)?;
            assert_eq!(
                self.actual_position(),
                target,
                "skipping to the end of a chunk landed at the wrong position"
            );
        }
        Ok(())
    }

    /// Advance the position by `n_bits` bits without decoding them.
    ///
    /// If the skip goes beyond the data pulled so far from the source and
    /// the source is seekable, the source is moved forward by seeking and
    /// the buffer is reloaded at the new position, so the cost does not
    /// depend on `n_bits`. Otherwise the cursor slides through the data
    /// window by window.
    pub fn skip(&mut self, n_bits: u64) -> Result<()> {
        self.check_open()?;
        let target = self.target_of(n_bits)?;

        if !self.end_reached {
            // before the end, the buffer holds the source up to this byte
            let source_byte = self.lazy_pos / 8 + self.buffer.len() as u64;
            let target_byte = target / 8;
            // seek only forward, and far enough that the new window can start
            // with a sled of bytes preceding the target
            if target_byte >= source_byte + SLED_BYTES as u64 {
                if let Some(seeker) = self.source.as_mut().and_then(|s| s.as_seek()) {
                    let window_byte = target_byte - SLED_BYTES as u64;
                    seeker.seek_forward(window_byte - source_byte)?;
                    self.lazy_pos = window_byte * 8;
                    self.offset = SLED_BITS + (target % 8) as usize;
                    self.load_window()?;
                    // in a short last window, the target might not exist
                    return self.ensure(0);
                }
            }
        }

        let mut remaining = n_bits;
        loop {
            let available = self.bits_in_buffer.saturating_sub(self.offset) as u64;
            if remaining <= available {
                self.offset += remaining as usize;
                break;
            }
            if self.end_reached {
                return Err(CursorError::UnexpectedEnd { position: target });
            }
            // consume the whole window, possibly more if a read already
            // went into the sled
            self.offset += available as usize;
            remaining -= available;
            self.refill()?;
        }
        #[cfg(feature = "checks")]
        self.check_invariants();
        debug_assert_eq!(self.actual_position(), target);
        Ok(())
    }
}
