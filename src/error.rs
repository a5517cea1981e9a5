/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Errors reported by a [`BitCursor`](crate::impls::BitCursor).
//!
//! Every error aborts the operation in flight. Apart from
//! [`CursorError::Closed`] and [`CursorError::NoOpenChunk`], which are
//! reported before any state is touched, the cursor should be discarded (or
//! closed and reopened) after an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CursorError {
    /// The buffer size does not satisfy the sled constraints.
    #[error("Invalid buffer size {size}: it must be a multiple of {sled} and larger than twice {sled}")]
    InvalidBufferSize {
        /// The rejected size in bytes.
        size: usize,
        /// The sled width in bytes.
        sled: usize,
    },

    /// More bits were read inside a chunk than the chunk declared.
    #[error("Chunk overrun: chunk ends at bit {target} but the cursor is at bit {position}")]
    ChunkOverrun {
        /// Absolute bit position where the chunk should have ended.
        target: u64,
        /// Absolute bit position of the cursor when the chunk was closed.
        position: u64,
    },

    /// A read or skip needed bits beyond the end of the source.
    #[error("Unexpected end of source at bit position {position}")]
    UnexpectedEnd {
        /// Absolute bit position the operation tried to reach.
        position: u64,
    },

    /// The source failed for a reason other than clean exhaustion.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The cursor has not been opened, or has been closed.
    #[error("The cursor is closed")]
    Closed,

    /// A chunk operation was issued with no open chunk.
    #[error("No open chunk")]
    NoOpenChunk,
}

/// Result type for cursor operations.
pub type Result<T> = core::result::Result<T, CursorError>;
