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
use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::geometry::GridPosition;

/// No grid coordinate or size may exceed this in magnitude.
pub const MAX_GRID_EXTENT: i32 = 1 << 16;

/// The grid's playable rectangle and the wider area the cursor may roam.
///
/// Cells `0..num_cols` by `0..num_rows` are in bounds. The cursor may move anywhere
/// in `min_col..=max_col` by `min_row..=max_row`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct GridConfig {
    pub start_col: i32,
    pub start_row: i32,
    pub min_col: i32,
    pub max_col: i32,
    pub min_row: i32,
    pub max_row: i32,
    pub num_cols: i32,
    pub num_rows: i32,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            start_col: 2,
            start_row: 2,
            min_col: -2,
            max_col: 6,
            min_row: -2,
            max_row: 6,
            num_cols: 5,
            num_rows: 5,
        }
    }
}

impl GridConfig {
    pub fn start(&self) -> GridPosition {
        GridPosition::new(self.start_col, self.start_row)
    }

    /// Whether the cursor is allowed at this position.
    pub fn reachable(&self, position: GridPosition) -> bool {
        (self.min_col..=self.max_col).contains(&position.col)
            && (self.min_row..=self.max_row).contains(&position.row)
    }

    /// Checks the bounds are consistent with each other.
    pub fn validate(&self) -> Result<(), GridError> {
        for (name, value) in [
            ("start_col", self.start_col),
            ("start_row", self.start_row),
            ("min_col", self.min_col),
            ("max_col", self.max_col),
            ("min_row", self.min_row),
            ("max_row", self.max_row),
            ("num_cols", self.num_cols),
            ("num_rows", self.num_rows),
        ] {
            if !(-MAX_GRID_EXTENT..=MAX_GRID_EXTENT).contains(&value) {
                return Err(GridError::MalformedConfig(format!(
                    "{} must be within +/-{}, got {}",
                    name, MAX_GRID_EXTENT, value
                )));
            }
        }
        if self.min_col > self.max_col || self.min_row > self.max_row {
            return Err(GridError::MalformedConfig(format!(
                "cursor range is empty: cols {}..={}, rows {}..={}",
                self.min_col, self.max_col, self.min_row, self.max_row
            )));
        }
        if self.num_cols <= 0 || self.num_rows <= 0 {
            return Err(GridError::MalformedConfig(format!(
                "grid must have at least one cell, got {}x{}",
                self.num_cols, self.num_rows
            )));
        }
        if !self.reachable(self.start()) {
            return Err(GridError::MalformedConfig(format!(
                "start position {} is outside the cursor range",
                self.start()
            )));
        }
        Ok(())
    }
}
