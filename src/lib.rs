/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]

pub mod error;
pub mod impls;
pub mod params;
pub mod traits;
pub mod utils;

/// Prelude module to import everything from this crate
pub mod prelude {
    pub use crate::error::CursorError;
    pub use crate::impls::*;
    pub use crate::params::*;
    pub use crate::traits::*;
    pub use crate::utils::*;
}
