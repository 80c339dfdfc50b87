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
use std::collections::HashMap;
use std::time::Duration;

use duration_string::DurationString;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::packs;
use crate::chain::{Effect, StageOptions};
use crate::curve::StageCoefficients;

/// How the grid's axes map to sound.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Columns pick the note, rows pick the octave.
    #[default]
    Row,
    /// Rows pick the note, columns pick the stereo position.
    Pan,
}

impl Layout {
    /// The effects a layout uses when none are configured.
    pub fn default_effects(self) -> Vec<Effect> {
        match self {
            Layout::Row => Vec::new(),
            Layout::Pan => vec![Effect::Pan, Effect::Gain, Effect::Reverb, Effect::Lowpass],
        }
    }
}

/// A YAML representation of the instrument's sound settings.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct SoundConfig {
    /// How cursor position maps to note and pan.
    layout: Layout,

    /// The effect stages, in wiring order. Defaults depend on the layout.
    effects: Option<Vec<Effect>>,

    /// The octave notes are built from.
    base_octave: i32,

    /// Pan change per column away from the middle column.
    pan_per_column: f64,

    /// Gain lost per cell out of bounds.
    gain_cutoff_out_of_bounds: f64,

    /// Reverb wetness gained per cell out of bounds.
    reverb_wetness_out_of_bounds: f64,

    /// Lowpass resonance gained per cell out of bounds.
    lowpass_resonance_out_of_bounds: f64,

    /// Reverb decay time in seconds.
    reverb_decay: f64,

    /// Lowpass dampening frequency in Hz.
    lowpass_dampening: f64,

    /// Lowpass comb delay time in seconds. Must be non-zero.
    lowpass_delay_time: f64,

    /// How long effect parameters take to reach new values, e.g. "250ms".
    ramp_to_duration: Option<String>,

    /// Whether samples loop.
    #[serde(rename = "loop")]
    looped: bool,

    /// Whether a new note continues from the previous note's position.
    use_offsets: bool,

    /// Prefix for every sample URL.
    sampler_base_url: String,

    /// Note name -> sample URL.
    sampler_urls: HashMap<String, String>,

    /// A built-in sound pack to use instead of `sampler_urls`.
    sound_pack: Option<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        SoundConfig {
            layout: Layout::Row,
            effects: None,
            base_octave: 2,
            pan_per_column: 0.25,
            gain_cutoff_out_of_bounds: 0.0,
            reverb_wetness_out_of_bounds: 0.0,
            lowpass_resonance_out_of_bounds: 0.0,
            reverb_decay: 0.4,
            lowpass_dampening: 440.0,
            lowpass_delay_time: 0.00003,
            ramp_to_duration: None,
            looped: false,
            use_offsets: false,
            sampler_base_url: "./sounds/".to_string(),
            sampler_urls: HashMap::from([("E2".to_string(), "bongo.wav".to_string())]),
            sound_pack: None,
        }
    }
}

impl SoundConfig {
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// The configured effects, or the layout's defaults.
    pub fn effects(&self) -> Vec<Effect> {
        self.effects
            .clone()
            .unwrap_or_else(|| self.layout.default_effects())
    }

    pub fn base_octave(&self) -> i32 {
        self.base_octave
    }

    pub fn pan_per_column(&self) -> f64 {
        self.pan_per_column
    }

    pub fn stage_coefficients(&self) -> StageCoefficients {
        StageCoefficients {
            pan_per_column: self.pan_per_column,
            gain_cutoff: self.gain_cutoff_out_of_bounds,
            reverb_wetness: self.reverb_wetness_out_of_bounds,
            lowpass_resonance: self.lowpass_resonance_out_of_bounds,
        }
    }

    pub fn stage_options(&self) -> StageOptions {
        StageOptions {
            reverb_decay_seconds: self.reverb_decay,
            lowpass_dampening_hz: self.lowpass_dampening,
            lowpass_delay_time_seconds: self.lowpass_delay_time,
        }
    }

    /// The parameter ramp, or `None` for instant changes.
    pub fn ramp(&self) -> Result<Option<Duration>, ConfigError> {
        let ramp = match &self.ramp_to_duration {
            Some(ramp) => DurationString::from_string(ramp.clone())
                .map_err(|e| {
                    ConfigError::Invalid(format!("bad ramp_to_duration '{}': {:?}", ramp, e))
                })?
                .into(),
            None => Duration::ZERO,
        };
        Ok(if ramp.is_zero() { None } else { Some(ramp) })
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    pub fn use_offsets(&self) -> bool {
        self.use_offsets
    }

    pub fn sampler_base_url(&self) -> &str {
        &self.sampler_base_url
    }

    /// The note name -> URL map, taken from the sound pack when one is named.
    pub fn sampler_urls(&self) -> Result<HashMap<String, String>, ConfigError> {
        match &self.sound_pack {
            Some(name) => packs::find_pack(name)
                .map(|pack| pack.urls())
                .ok_or_else(|| ConfigError::Invalid(format!("unknown sound pack '{}'", name))),
            None => Ok(self.sampler_urls.clone()),
        }
    }

    /// Checks the numeric settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("gain_cutoff_out_of_bounds", self.gain_cutoff_out_of_bounds),
            ("reverb_wetness_out_of_bounds", self.reverb_wetness_out_of_bounds),
            (
                "lowpass_resonance_out_of_bounds",
                self.lowpass_resonance_out_of_bounds,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !self.pan_per_column.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "pan_per_column must be finite, got {}",
                self.pan_per_column
            )));
        }
        self.ramp()?;
        self.sampler_urls()?;
        Ok(())
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = Some(effects);
        self
    }

    pub fn with_strengths(mut self, gain: f64, reverb: f64, lowpass: f64) -> Self {
        self.gain_cutoff_out_of_bounds = gain;
        self.reverb_wetness_out_of_bounds = reverb;
        self.lowpass_resonance_out_of_bounds = lowpass;
        self
    }

    pub fn with_ramp(mut self, ramp: &str) -> Self {
        self.ramp_to_duration = Some(ramp.to_string());
        self
    }

    pub fn with_loop(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn with_offsets(mut self, use_offsets: bool) -> Self {
        self.use_offsets = use_offsets;
        self
    }

    pub fn with_sampler_urls(mut self, urls: HashMap<String, String>) -> Self {
        self.sampler_urls = urls;
        self.sound_pack = None;
        self
    }

    pub fn with_sound_pack(mut self, name: &str) -> Self {
        self.sound_pack = Some(name.to_string());
        self
    }
}
