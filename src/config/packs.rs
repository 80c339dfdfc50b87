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

//! Built-in sound packs for the grid and the sound list used by the picker.

use std::collections::HashMap;

/// A named set of samples for the grid, keyed by note name.
#[derive(Debug, Clone, Copy)]
pub struct SoundPack {
    pub name: &'static str,
    pub samples: &'static [(&'static str, &'static str)],
}

impl SoundPack {
    /// The note name -> URL map for this pack.
    pub fn urls(&self) -> HashMap<String, String> {
        self.samples
            .iter()
            .map(|(note, url)| (note.to_string(), url.to_string()))
            .collect()
    }
}

pub const SOUND_PACKS: &[SoundPack] = &[
    SoundPack {
        name: "Bongo",
        samples: &[("E2", "bongo.wav")],
    },
    SoundPack {
        name: "Euro Perc",
        samples: &[("A1", "wavestation-euro-perc-organ.wav")],
    },
    SoundPack {
        name: "Glissando (Down)",
        samples: &[("C3", "glissando/al-metalic-vs-robotic-down.wav")],
    },
    SoundPack {
        name: "Glissando (Up)",
        samples: &[("C2", "glissando/al-metalic-vs-robotic-up.wav")],
    },
    SoundPack {
        name: "Pencil",
        samples: &[("A1", "pencil-cardboard-shading.wav")],
    },
    SoundPack {
        name: "Train",
        samples: &[
            ("C1", "train/C1.wav"),
            ("C2", "train/C2.wav"),
            ("C3", "train/C3.wav"),
            ("C4", "train/C4.wav"),
        ],
    },
];

/// Finds a built-in pack by name, ignoring case.
pub fn find_pack(name: &str) -> Option<&'static SoundPack> {
    SOUND_PACKS
        .iter()
        .find(|pack| pack.name.eq_ignore_ascii_case(name))
}

/// A single sound offered by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundDefinition {
    pub name: String,
    pub path: String,
    pub looped: bool,
}

impl SoundDefinition {
    pub fn new(name: &str, path: &str, looped: bool) -> SoundDefinition {
        SoundDefinition {
            name: name.to_string(),
            path: path.to_string(),
            looped,
        }
    }
}

const PICKER_SOUNDS: &[(&str, &str, bool)] = &[
    ("Along the Trail", "wavestation-along-the-trail.wav", true),
    ("Bass Drone", "analog-lab-bass-drone.wav", true),
    ("Bongo", "bongo.wav", false),
    ("Droid Bass", "wavestation-droid-bass.wav", true),
    ("Droid Bass 2", "wavestation-droid-bass-2.wav", true),
    ("Euro Percussion Organ", "wavestation-euro-perc-organ.wav", true),
    ("Fingernail on Cardboard Tube", "cardboard-tube-fingernail.wav", false),
    ("Into A Maze", "wavestation-intoamaze.wav", true),
    ("Kalimba", "wavestation-kalimba.wav", true),
    ("Marimba", "wavestation-marimba.wav", true),
    ("Nut Pan Beat", "wavestation-nutpanbeat.wav", true),
    ("Ocean Drum (Circles)", "ocean-drum-circles.wav", false),
    ("Ocean Drum (Pen Cap)", "ocean-drum-pen-cap.wav", false),
    ("Ocean Drum (Vertical Line)", "ocean-drum-vertical-line.wav", false),
    ("Pen on Cardboard", "pen-cardboard-lines.wav", true),
    ("Pen on Cardboard 2", "pen-cardboard-lines-2.wav", true),
    ("Pencil Drawing", "pencil-cardboard-shading.wav", false),
    ("Phone Dial", "fisher-price-dial.wav", false),
    ("Phone Dial (Forward)", "fisher-price-phone-dial-forward.wav", false),
    ("Phone Dial (Release)", "fisher-price-phone-dial-release.wav", false),
    ("Phone Rolling", "fisher-price-phone-rolling.wav", false),
    ("Phone Rolling (Backward)", "fisher-price-phone-rolling-backward.wav", false),
    ("Robotic Sequence", "analog-lab-robotic-sequence.wav", true),
    ("Techno Sequence", "analog-lab-techno-sequence.wav", true),
    ("Toy Box (Falling)", "wavestation-toy-box-falling.wav", true),
];

/// The picker's sound list, with paths under `base_url`.
pub fn picker_sounds(base_url: &str) -> Vec<SoundDefinition> {
    PICKER_SOUNDS
        .iter()
        .map(|(name, file, looped)| {
            SoundDefinition::new(name, &format!("{}{}", base_url, file), *looped)
        })
        .collect()
}
