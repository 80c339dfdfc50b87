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

//! Nearest-neighbour pitch resolution over a sparse set of sample pitches.

use crate::error::GridError;

/// The sample chosen for a desired pitch and how to bend it there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// The natural pitch of the chosen sample.
    pub chosen_pitch: i32,
    /// `chosen_pitch - desired_pitch`. Negative when the sample sits below the target.
    pub semitone_offset: i32,
    /// Rate to play the chosen sample at so it sounds at the desired pitch.
    pub playback_rate: f64,
}

/// Playback rate that shifts a sample by `-semitone_offset` semitones.
pub fn playback_rate(semitone_offset: i32) -> f64 {
    if semitone_offset % 12 == 0 {
        // Whole octaves stay exact.
        2.0_f64.powi(-semitone_offset / 12)
    } else {
        (f64::from(-semitone_offset) / 12.0).exp2()
    }
}

/// Picks the available pitch closest to `desired_pitch`.
///
/// When two pitches are equally close the lower one wins, independent of iteration
/// order.
pub fn resolve(
    desired_pitch: i32,
    available_pitches: impl IntoIterator<Item = i32>,
) -> Result<Resolution, GridError> {
    let chosen_pitch = available_pitches
        .into_iter()
        .min_by_key(|pitch| ((pitch - desired_pitch).abs(), *pitch))
        .ok_or(GridError::NoSampleAvailable)?;

    let semitone_offset = chosen_pitch - desired_pitch;
    Ok(Resolution {
        chosen_pitch,
        semitone_offset,
        playback_rate: playback_rate(semitone_offset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let resolution = resolve(60, [58, 60, 64]).unwrap();
        assert_eq!(resolution.chosen_pitch, 60);
        assert_eq!(resolution.semitone_offset, 0);
        assert_eq!(resolution.playback_rate, 1.0);
    }

    #[test]
    fn test_tie_prefers_lower_pitch() {
        let resolution = resolve(61, [58, 64]).unwrap();
        assert_eq!(resolution.chosen_pitch, 58);
        assert_eq!(resolution.semitone_offset, -3);
        assert!((resolution.playback_rate - 2.0_f64.powf(3.0 / 12.0)).abs() < 1e-12);

        // Iteration order does not matter.
        assert_eq!(resolve(61, [64, 58]).unwrap().chosen_pitch, 58);
    }

    #[test]
    fn test_sample_below_target_plays_faster() {
        let resolution = resolve(67, [60]).unwrap();
        assert_eq!(resolution.semitone_offset, -7);
        assert!((resolution.playback_rate - 1.4983).abs() < 1e-4);
    }

    #[test]
    fn test_sample_above_target_plays_slower() {
        let resolution = resolve(40, [45]).unwrap();
        assert_eq!(resolution.semitone_offset, 5);
        assert!(resolution.playback_rate < 1.0);
        assert!((resolution.playback_rate - 2.0_f64.powf(-5.0 / 12.0)).abs() < 1e-12);
    }

    #[test]
    fn test_octave_equivalence() {
        for pitch in [24, 40, 60] {
            for n in 0..=4 {
                let up = resolve(pitch + 12 * n, [pitch]).unwrap();
                assert_eq!(up.playback_rate, 2.0_f64.powi(n));

                let down = resolve(pitch - 12 * n, [pitch]).unwrap();
                assert_eq!(down.playback_rate, 2.0_f64.powi(-n));
            }
        }
    }

    #[test]
    fn test_empty_set() {
        assert!(matches!(
            resolve(60, std::iter::empty()),
            Err(GridError::NoSampleAvailable)
        ));
    }
}
