/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Implementations of byte sources and of the bit cursor.

If you need to read bits from a file or any backend implementing
[`std::io::Read`] you just need to wrap it in a [`ReadAdapter`], or in a
[`SeekAdapter`] if it also implements [`std::io::Seek`]: in the latter case,
long skips will be performed by seeking. If instead you want to read
directly from memory, you can use [`MemByteReader`], which is seekable.

Once you have a source, a [`BitCursor`] reads bits, integers, bytes and
strings from it, keeping track of nested length-checked chunks.

*/

mod mem_byte_reader;
pub use mem_byte_reader::*;

mod io_adapter;
pub use io_adapter::*;

mod bit_cursor;
pub use bit_cursor::BitCursor;
