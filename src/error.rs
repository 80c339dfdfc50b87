// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;

use crate::config::error::ConfigError;

/// The axis a cursor coordinate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Column,
    Row,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Column => write!(f, "column"),
            Axis::Row => write!(f, "row"),
        }
    }
}

/// Errors produced by the grid instrument.
///
/// `InvalidPosition` and `MalformedConfig` point at a configuration problem and are
/// expected to be caught during validation. `NoSampleAvailable` is routine while a
/// sample library is still loading; the scheduler swallows it rather than failing.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("no note is defined for {axis} {position}")]
    InvalidPosition { axis: Axis, position: i32 },

    #[error("no sample is available to play")]
    NoSampleAvailable,

    #[error("malformed configuration: {0}")]
    MalformedConfig(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
