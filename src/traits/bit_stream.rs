/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use core::error::Error;

/// Sequential, streaming bit-by-bit reads, least-significant bit first.
///
/// This is the minimal interface decoders need; wrappers such as
/// [`CountBitRead`](crate::utils::CountBitRead) can be stacked over any
/// implementation.
pub trait BitRead {
    type Error: Error;

    /// Read a single bit.
    fn read_bit(&mut self) -> Result<bool, Self::Error>;

    /// Read `n` bits, `n` at most 32, and return them in the lowest bits.
    fn read_bits(&mut self, n: usize) -> Result<u32, Self::Error>;

    /// Skip `n` bits from the stream.
    fn skip_bits(&mut self, n: u64) -> Result<(), Self::Error>;
}

/// Position reporting for [`BitRead`] streams.
pub trait BitSeek {
    type Error: Error;

    /// Return the current position in bits from the start of the stream.
    fn bit_pos(&mut self) -> Result<u64, Self::Error>;
}
