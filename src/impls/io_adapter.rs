/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::*;
use std::io::{self, Read, Seek, SeekFrom};

/// Reads into `buf` until it is full or `backend` is exhausted, retrying on
/// [`io::ErrorKind::Interrupted`].
fn read_retrying<B: Read>(backend: &mut B, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match backend.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            res => return res,
        }
    }
}

/// An adapter from [`Read`] to [`ByteRead`] that does not expose any seeking
/// capability.
///
/// Use it for pipes, sockets, decompressors and any other stream that can
/// only be consumed sequentially: skips will read and discard the data.
#[derive(Debug, Clone)]
pub struct ReadAdapter<B> {
    backend: B,
}

impl<B> ReadAdapter<B> {
    /// Create a new [`ReadAdapter`].
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B: Read> ByteRead for ReadAdapter<B> {
    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_retrying(&mut self.backend, buf)
    }
}

/// An adapter from [`Read`] and [`Seek`] to [`ByteRead`] and [`ByteSeek`].
///
/// Instances of this struct turn every standard seekable source of bytes
/// (such as [`std::fs::File`], [`std::io::BufReader`] over a file, or
/// [`std::io::Cursor`]) into a source whose long skips are performed by
/// seeking.
#[derive(Debug, Clone)]
pub struct SeekAdapter<B> {
    backend: B,
}

impl<B> SeekAdapter<B> {
    /// Create a new [`SeekAdapter`].
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B: Read + Seek> ByteRead for SeekAdapter<B> {
    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        read_retrying(&mut self.backend, buf)
    }

    #[inline(always)]
    fn as_seek(&mut self) -> Option<&mut dyn ByteSeek> {
        Some(self)
    }
}

impl<B: Read + Seek> ByteSeek for SeekAdapter<B> {
    #[inline]
    fn seek_forward(&mut self, n_bytes: u64) -> io::Result<u64> {
        let n_bytes = i64::try_from(n_bytes)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "Seek offset overflow"))?;
        self.backend.seek(SeekFrom::Current(n_bytes))
    }
}
