/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::*;

/// Wrapping struct that keep tracks of read bits. Optionally,
/// prints to standard error information about methods called.
///
/// Skipped bits are counted as read.
#[derive(Debug, Clone)]
pub struct CountBitRead<BR: BitRead, const PRINT: bool = false> {
    bit_read: BR,
    /// The number of bits read (or skipped) so far from the underlying [`BitRead`].
    pub bits_read: u64,
}

impl<BR: BitRead, const PRINT: bool> CountBitRead<BR, PRINT> {
    pub fn new(bit_read: BR) -> Self {
        Self {
            bit_read,
            bits_read: 0,
        }
    }

    pub fn into_inner(self) -> BR {
        self.bit_read
    }
}

impl<BR: BitRead, const PRINT: bool> BitRead for CountBitRead<BR, PRINT> {
    type Error = BR::Error;

    fn read_bit(&mut self) -> Result<bool, Self::Error> {
        self.bit_read.read_bit().inspect(|x| {
            self.bits_read += 1;
            if PRINT {
                eprintln!("read_bit() = {} (total = {})", x, self.bits_read);
            }
        })
    }

    fn read_bits(&mut self, n_bits: usize) -> Result<u32, Self::Error> {
        self.bit_read.read_bits(n_bits).inspect(|x| {
            self.bits_read += n_bits as u64;
            if PRINT {
                eprintln!(
                    "read_bits({}) = {:#010x} (total = {})",
                    n_bits, x, self.bits_read
                );
            }
        })
    }

    fn skip_bits(&mut self, n_bits: u64) -> Result<(), Self::Error> {
        self.bit_read.skip_bits(n_bits).inspect(|_| {
            self.bits_read += n_bits;
            if PRINT {
                eprintln!("skip_bits({}) (total = {})", n_bits, self.bits_read);
            }
        })
    }
}

impl<BR: BitRead + BitSeek, const PRINT: bool> BitSeek for CountBitRead<BR, PRINT> {
    type Error = <BR as BitSeek>::Error;

    fn bit_pos(&mut self) -> Result<u64, Self::Error> {
        self.bit_read.bit_pos()
    }
}
