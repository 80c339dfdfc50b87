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
//! A grid instrument: a cursor on a small grid picks a note, a pan position and a set
//! of out-of-bounds effects, and plays the note from the closest of a sparse set of
//! samples.

pub mod button;
pub mod chain;
pub mod config;
pub mod continuity;
pub mod curve;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod instrument;
pub mod pitch;
pub mod scheduler;

pub use config::InstrumentConfig;
pub use engine::AudioEngine;
pub use error::GridError;
pub use geometry::GridPosition;
pub use instrument::{GridStrument, Key, KeyOutcome};
pub use scheduler::PlaybackScheduler;
