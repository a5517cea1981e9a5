/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io;

/// Sequential, streaming byte reads: the source of a
/// [`BitCursor`](crate::impls::BitCursor).
///
/// Seekability is an optional capability: a source that can move forward
/// cheaply exposes it through [`ByteRead::as_seek`], and the cursor uses it
/// to skip long chunks without reading them.
pub trait ByteRead {
    /// Read some bytes into `buf`, returning how many were read.
    ///
    /// Fewer bytes than requested may be returned; zero bytes (with a
    /// nonempty `buf`) means that the source is exhausted. Any other
    /// failure must be reported as an error.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Return the seeking capability of this source, if any.
    #[inline(always)]
    fn as_seek(&mut self) -> Option<&mut dyn ByteSeek> {
        None
    }

    /// Release the source. Called once when the owning cursor is closed.
    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Forward seekability for [`ByteRead`] sources.
pub trait ByteSeek {
    /// Move the current position `n_bytes` bytes forward, returning the new
    /// position in bytes from the start of the source.
    ///
    /// Moving beyond the end of the source is not an error; subsequent reads
    /// will just report exhaustion.
    fn seek_forward(&mut self, n_bytes: u64) -> io::Result<u64>;
}

impl<R: ByteRead + ?Sized> ByteRead for &mut R {
    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_bytes(buf)
    }

    #[inline(always)]
    fn as_seek(&mut self) -> Option<&mut dyn ByteSeek> {
        (**self).as_seek()
    }

    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

impl<R: ByteRead + ?Sized> ByteRead for Box<R> {
    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_bytes(buf)
    }

    #[inline(always)]
    fn as_seek(&mut self) -> Option<&mut dyn ByteSeek> {
        (**self).as_seek()
    }

    #[inline(always)]
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
