/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Debug helpers.

[`CountBitRead`] keeps track of the number of bits read or skipped from a
[`BitRead`](crate::traits::BitRead), optionally printing on standard error
the operations performed on the stream.

*/

mod count;
pub use count::*;
