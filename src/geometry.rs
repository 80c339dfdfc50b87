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

//! Coordinate math for the grid: cursor position to note, octave, pan and
//! out-of-bounds distance.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::config::grid::GridConfig;
use crate::config::sound::Layout;
use crate::error::{Axis, GridError};

/// Number of entries in every note table.
pub const NOTE_TABLE_LEN: usize = 9;

/// A pitch class, named with sharps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Semitones above C.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// The pitch class for the given number of semitones above C, wrapping.
    pub fn from_index(index: i32) -> NoteName {
        Self::ALL[index.rem_euclid(12) as usize]
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        };
        write!(f, "{}", name)
    }
}

/// Pitches a note may have: C-1 through B10.
pub const PITCH_RANGE: RangeInclusive<i32> = 0..=143;

/// A note name with its octave, e.g. `E2` or `C#-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Note {
    pub name: NoteName,
    pub octave: i32,
}

impl Note {
    pub fn new(name: NoteName, octave: i32) -> Note {
        Note { name, octave }
    }

    /// MIDI numbering: C4 is 60.
    pub fn pitch(&self) -> i32 {
        12 * (self.octave + 1) + self.name.index()
    }

    /// The note for a MIDI pitch, spelled with sharps.
    pub fn from_pitch(pitch: i32) -> Note {
        Note {
            name: NoteName::from_index(pitch),
            octave: pitch.div_euclid(12) - 1,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

impl FromStr for Note {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GridError::MalformedConfig(format!("unrecognised note name '{}'", s));

        let mut chars = s.trim().chars();
        let base = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(malformed()),
        };

        let rest = chars.as_str();
        let (shift, octave) = if let Some(octave) = rest.strip_prefix('#') {
            (1, octave)
        } else if let Some(octave) = rest.strip_prefix('b') {
            (-1, octave)
        } else {
            (0, rest)
        };

        let octave: i32 = octave.parse().map_err(|_| malformed())?;
        // Cb and B# cross the octave boundary; let the pitch number sort it out.
        let pitch = octave
            .checked_add(1)
            .and_then(|octave| octave.checked_mul(12))
            .and_then(|pitch| pitch.checked_add(base + shift))
            .filter(|pitch| PITCH_RANGE.contains(pitch))
            .ok_or_else(malformed)?;
        Ok(Note::from_pitch(pitch))
    }
}

/// A fixed table of nine notes laid along one axis of the grid, starting at `origin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteTable {
    notes: [NoteName; NOTE_TABLE_LEN],
    origin: i32,
}

impl NoteTable {
    /// Pitch rises with position: C, C#, D, D#, E, F, F#, G, A.
    pub fn ascending(origin: i32) -> NoteTable {
        use NoteName::*;
        NoteTable {
            notes: [C, CSharp, D, DSharp, E, F, FSharp, G, A],
            origin,
        }
    }

    /// Pitch falls with position: G#, G, F#, F, E, D#, D, C#, C.
    pub fn descending(origin: i32) -> NoteTable {
        use NoteName::*;
        NoteTable {
            notes: [GSharp, G, FSharp, F, E, DSharp, D, CSharp, C],
            origin,
        }
    }

    /// The positions this table has entries for.
    pub fn domain(&self) -> RangeInclusive<i32> {
        self.origin..=self.origin + NOTE_TABLE_LEN as i32 - 1
    }

    /// Looks up the note at the given position along `axis`.
    pub fn note_at(&self, position: i32, axis: Axis) -> Result<NoteName, GridError> {
        usize::try_from(position - self.origin)
            .ok()
            .and_then(|index| self.notes.get(index))
            .copied()
            .ok_or(GridError::InvalidPosition { axis, position })
    }
}

/// A cursor location. Either coordinate may lie outside the playable rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GridPosition {
    pub col: i32,
    pub row: i32,
}

impl GridPosition {
    pub fn new(col: i32, row: i32) -> GridPosition {
        GridPosition { col, row }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Lower rows sit at higher octaves.
pub fn octave_for_row(row: i32, num_rows: i32, base_octave: i32) -> i32 {
    base_octave + (num_rows - row)
}

/// How far `position` overshoots `[lower, upper]`; zero when inside.
pub fn out_of_bounds_distance(position: i32, lower: i32, upper: i32) -> f64 {
    if position < lower {
        f64::from(lower - position)
    } else if position > upper {
        f64::from(position - upper)
    } else {
        0.0
    }
}

/// Combines per-axis overshoot as orthogonal components.
pub fn combined_out_of_bounds(cols_out_of_bounds: f64, rows_out_of_bounds: f64) -> f64 {
    cols_out_of_bounds.hypot(rows_out_of_bounds)
}

/// Pan for a column relative to the middle of the reachable column range. Not clamped.
pub fn pan_value(col: i32, min_col: i32, max_col: i32, pan_per_column: f64) -> f64 {
    let midpoint = f64::from(min_col + max_col) / 2.0;
    (f64::from(col) - midpoint) * pan_per_column
}

/// Everything the grid geometry says about a cursor position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorReading {
    pub note: Note,
    pub pan: f64,
    pub distance: f64,
}

/// Maps positions to readings for one layout and grid.
#[derive(Debug, Clone)]
pub struct GeometryMapper {
    layout: Layout,
    table: NoteTable,
    grid: GridConfig,
    base_octave: i32,
    pan_per_column: f64,
}

impl GeometryMapper {
    /// Builds a mapper, checking that the note table covers exactly the reachable
    /// range of the note axis so lookups cannot fail later.
    pub fn new(
        layout: Layout,
        grid: GridConfig,
        base_octave: i32,
        pan_per_column: f64,
    ) -> Result<GeometryMapper, GridError> {
        let (table, axis, range) = match layout {
            Layout::Row => (
                NoteTable::ascending(grid.min_col),
                Axis::Column,
                grid.min_col..=grid.max_col,
            ),
            Layout::Pan => (
                NoteTable::descending(grid.min_row),
                Axis::Row,
                grid.min_row..=grid.max_row,
            ),
        };

        grid.validate()?;
        if table.domain() != range {
            return Err(GridError::MalformedConfig(format!(
                "{} range {}..={} does not match the {} entry note table",
                axis,
                range.start(),
                range.end(),
                NOTE_TABLE_LEN
            )));
        }

        let (lowest_octave, highest_octave) = match layout {
            Layout::Row => (
                i64::from(base_octave) + i64::from(grid.num_rows) - i64::from(grid.max_row),
                i64::from(base_octave) + i64::from(grid.num_rows) - i64::from(grid.min_row),
            ),
            Layout::Pan => (i64::from(base_octave), i64::from(base_octave)),
        };
        let lowest = 12 * (lowest_octave + 1);
        let highest = 12 * (highest_octave + 1) + 11;
        if lowest < i64::from(*PITCH_RANGE.start()) || highest > i64::from(*PITCH_RANGE.end()) {
            return Err(GridError::MalformedConfig(format!(
                "base octave {} puts notes in octaves {}..={}, outside {}..={}",
                base_octave,
                lowest_octave,
                highest_octave,
                Note::from_pitch(*PITCH_RANGE.start()),
                Note::from_pitch(*PITCH_RANGE.end())
            )));
        }

        Ok(GeometryMapper {
            layout,
            table,
            grid,
            base_octave,
            pan_per_column,
        })
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Reads note, pan and out-of-bounds distance for a cursor position.
    ///
    /// Positions outside the cursor range are rejected.
    pub fn read(&self, position: GridPosition) -> Result<CursorReading, GridError> {
        if !(self.grid.min_col..=self.grid.max_col).contains(&position.col) {
            return Err(GridError::InvalidPosition {
                axis: Axis::Column,
                position: position.col,
            });
        }
        if !(self.grid.min_row..=self.grid.max_row).contains(&position.row) {
            return Err(GridError::InvalidPosition {
                axis: Axis::Row,
                position: position.row,
            });
        }

        let note = match self.layout {
            Layout::Row => Note::new(
                self.table.note_at(position.col, Axis::Column)?,
                octave_for_row(position.row, self.grid.num_rows, self.base_octave),
            ),
            Layout::Pan => Note::new(
                self.table.note_at(position.row, Axis::Row)?,
                self.base_octave,
            ),
        };

        let cols = out_of_bounds_distance(position.col, 0, self.grid.num_cols - 1);
        let rows = out_of_bounds_distance(position.row, 0, self.grid.num_rows - 1);

        Ok(CursorReading {
            note,
            pan: pan_value(
                position.col,
                self.grid.min_col,
                self.grid.max_col,
                self.pan_per_column,
            ),
            distance: combined_out_of_bounds(cols, rows),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_parsing() {
        let e2: Note = "E2".parse().unwrap();
        assert_eq!(e2, Note::new(NoteName::E, 2));
        assert_eq!(e2.pitch(), 40);

        assert_eq!("C4".parse::<Note>().unwrap().pitch(), 60);
        assert_eq!("c#3".parse::<Note>().unwrap().pitch(), 49);
        assert_eq!("Db3".parse::<Note>().unwrap().pitch(), 49);
        assert_eq!("C-1".parse::<Note>().unwrap().pitch(), 0);
        assert_eq!("Cb4".parse::<Note>().unwrap(), Note::new(NoteName::B, 3));

        assert_eq!("B10".parse::<Note>().unwrap().pitch(), 143);
        for out_of_range in ["Cb-1", "B#10", "C11", "C2147483000", "C-2147483648"] {
            assert!(matches!(
                out_of_range.parse::<Note>(),
                Err(GridError::MalformedConfig(_))
            ));
        }

        assert!("H2".parse::<Note>().is_err());
        assert!("E".parse::<Note>().is_err());
        assert!("".parse::<Note>().is_err());
    }

    #[test]
    fn test_note_from_pitch() {
        assert_eq!(Note::from_pitch(60).to_string(), "C4");
        assert_eq!(Note::from_pitch(61).to_string(), "C#4");
        assert_eq!(Note::from_pitch(40).to_string(), "E2");
        assert_eq!(Note::from_pitch(-1).to_string(), "B-2");
    }

    #[test]
    fn test_note_tables() {
        let ascending = NoteTable::ascending(-2);
        assert_eq!(ascending.domain(), -2..=6);
        assert_eq!(ascending.note_at(-2, Axis::Column).unwrap(), NoteName::C);
        assert_eq!(ascending.note_at(2, Axis::Column).unwrap(), NoteName::E);
        assert_eq!(ascending.note_at(6, Axis::Column).unwrap(), NoteName::A);

        let descending = NoteTable::descending(-2);
        assert_eq!(descending.note_at(-2, Axis::Row).unwrap(), NoteName::GSharp);
        assert_eq!(descending.note_at(2, Axis::Row).unwrap(), NoteName::E);
        assert_eq!(descending.note_at(6, Axis::Row).unwrap(), NoteName::C);

        assert!(matches!(
            descending.note_at(7, Axis::Row),
            Err(GridError::InvalidPosition {
                axis: Axis::Row,
                position: 7
            })
        ));
        assert!(ascending.note_at(-3, Axis::Column).is_err());
    }

    #[test]
    fn test_octave_for_row() {
        assert_eq!(octave_for_row(2, 5, 2), 5);
        assert_eq!(octave_for_row(5, 5, 2), 2);
        assert_eq!(octave_for_row(-2, 5, 2), 9);
    }

    #[test]
    fn test_out_of_bounds_distance() {
        for position in 0..=4 {
            assert_eq!(out_of_bounds_distance(position, 0, 4), 0.0);
        }
        assert_eq!(out_of_bounds_distance(-2, 0, 4), 2.0);
        assert_eq!(out_of_bounds_distance(6, 0, 4), 2.0);
        assert_eq!(out_of_bounds_distance(5, 0, 4), 1.0);
    }

    #[test]
    fn test_combined_out_of_bounds() {
        assert_eq!(combined_out_of_bounds(0.0, 0.0), 0.0);
        assert_eq!(combined_out_of_bounds(2.0, 0.0), 2.0);
        assert!((combined_out_of_bounds(3.0, 4.0) - 5.0).abs() < 1e-12);

        // Diagonal overshoot costs more than one axis but less than the sum.
        let diagonal = combined_out_of_bounds(1.0, 1.0);
        assert!(diagonal > 1.0 && diagonal < 2.0);

        // Non-decreasing in each axis.
        for fixed in 0..4 {
            let mut previous = 0.0;
            for overshoot in 0..6 {
                let value = combined_out_of_bounds(f64::from(overshoot), f64::from(fixed));
                assert!(value >= previous);
                previous = value;
                let flipped = combined_out_of_bounds(f64::from(fixed), f64::from(overshoot));
                assert_eq!(value, flipped);
            }
        }
    }

    #[test]
    fn test_pan_value() {
        for k in [0.0, 0.25, 1.0, -3.5] {
            assert_eq!(pan_value(2, -2, 6, k), 0.0);
        }
        assert_eq!(pan_value(6, -2, 6, 0.25), 1.0);
        assert_eq!(pan_value(-2, -2, 6, 0.25), -1.0);
        // Unclamped.
        assert_eq!(pan_value(6, -2, 6, 0.5), 2.0);
        // Half-column midpoint.
        assert_eq!(pan_value(0, 0, 1, 1.0), -0.5);
    }

    #[test]
    fn test_mapper_row_layout() {
        let mapper = GeometryMapper::new(Layout::Row, GridConfig::default(), 2, 0.25).unwrap();

        let reading = mapper.read(GridPosition::new(2, 2)).unwrap();
        assert_eq!(reading.note.to_string(), "E5");
        assert_eq!(reading.distance, 0.0);
        assert_eq!(reading.pan, 0.0);

        let reading = mapper.read(GridPosition::new(-2, 6)).unwrap();
        assert_eq!(reading.note.to_string(), "C1");
        assert!((reading.distance - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mapper_pan_layout() {
        let mapper = GeometryMapper::new(Layout::Pan, GridConfig::default(), 2, 0.25).unwrap();

        let reading = mapper.read(GridPosition::new(6, -1)).unwrap();
        assert_eq!(reading.note, Note::new(NoteName::G, 2));
        assert_eq!(reading.pan, 1.0);
        assert!((reading.distance - 2.0_f64.hypot(1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_mapper_rejects_unreachable_positions() {
        let mapper = GeometryMapper::new(Layout::Pan, GridConfig::default(), 2, 0.25).unwrap();

        assert!(matches!(
            mapper.read(GridPosition::new(i32::MIN, 2)),
            Err(GridError::InvalidPosition {
                axis: Axis::Column,
                position: i32::MIN
            })
        ));
        assert!(matches!(
            mapper.read(GridPosition::new(2, 7)),
            Err(GridError::InvalidPosition {
                axis: Axis::Row,
                position: 7
            })
        ));
    }

    #[test]
    fn test_mapper_rejects_octaves_out_of_range() {
        // Rows -2..=6 on a five row grid span octaves base - 1 to base + 7.
        for base_octave in [0, 2, 3] {
            let mapper = GeometryMapper::new(Layout::Row, GridConfig::default(), base_octave, 0.25);
            assert!(mapper.is_ok());
        }
        for base_octave in [-1, 4, 200_000_000, i32::MAX, i32::MIN] {
            assert!(matches!(
                GeometryMapper::new(Layout::Row, GridConfig::default(), base_octave, 0.25),
                Err(GridError::MalformedConfig(_))
            ));
        }

        assert!(GeometryMapper::new(Layout::Pan, GridConfig::default(), 10, 0.25).is_ok());
        assert!(GeometryMapper::new(Layout::Pan, GridConfig::default(), 11, 0.25).is_err());
        assert!(GeometryMapper::new(Layout::Pan, GridConfig::default(), -1, 0.25).is_ok());
        assert!(GeometryMapper::new(Layout::Pan, GridConfig::default(), -2, 0.25).is_err());
    }

    #[test]
    fn test_mapper_rejects_mismatched_table() {
        let grid = GridConfig {
            max_col: 7,
            ..GridConfig::default()
        };
        assert!(matches!(
            GeometryMapper::new(Layout::Row, grid.clone(), 2, 0.25),
            Err(GridError::MalformedConfig(_))
        ));
        // The pan layout reads notes from rows, so extra columns are fine.
        assert!(GeometryMapper::new(Layout::Pan, grid, 2, 0.25).is_ok());
    }
}
