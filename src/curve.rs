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

//! Out-of-bounds distance to effect scalar mappings, and the stages that apply them.
//!
//! Every boundary effect has the shape `clamp(baseline ± strength * distance, 0, 1)`.
//! A stage whose coefficient is exactly zero produces nothing at all, so the engine
//! keeps whatever value it last had.

use std::fmt;

use crate::chain::Effect;
use crate::geometry::CursorReading;

/// Output level: full inside the grid, falling with distance.
pub fn gain(strength: f64, distance: f64) -> f64 {
    (1.0 - strength * distance).clamp(0.0, 1.0)
}

/// Reverb wetness: dry inside the grid, rising with distance.
pub fn reverb_wet(strength: f64, distance: f64) -> f64 {
    (strength * distance).clamp(0.0, 1.0)
}

/// Lowpass resonance: none inside the grid, rising with distance.
pub fn lowpass_resonance(strength: f64, distance: f64) -> f64 {
    (strength * distance).clamp(0.0, 1.0)
}

/// A parameter-producing stage of the instrument.
pub trait EffectStage: fmt::Debug + Send + Sync {
    /// The effect this stage drives.
    fn effect(&self) -> Effect;

    /// The new parameter value for a reading, or `None` when the stage is disabled.
    fn compute_effect(&self, reading: &CursorReading) -> Option<f64>;
}

/// Passes the column pan through.
#[derive(Debug, Clone, Copy)]
pub struct PanStage {
    pan_per_column: f64,
}

impl PanStage {
    pub fn new(pan_per_column: f64) -> PanStage {
        PanStage { pan_per_column }
    }
}

impl EffectStage for PanStage {
    fn effect(&self) -> Effect {
        Effect::Pan
    }

    fn compute_effect(&self, reading: &CursorReading) -> Option<f64> {
        if self.pan_per_column == 0.0 {
            return None;
        }
        Some(reading.pan)
    }
}

/// Scales one boundary effect by out-of-bounds distance.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryStage {
    effect: Effect,
    strength: f64,
    curve: fn(f64, f64) -> f64,
}

impl BoundaryStage {
    pub fn gain(strength: f64) -> BoundaryStage {
        BoundaryStage {
            effect: Effect::Gain,
            strength,
            curve: gain,
        }
    }

    pub fn reverb(strength: f64) -> BoundaryStage {
        BoundaryStage {
            effect: Effect::Reverb,
            strength,
            curve: reverb_wet,
        }
    }

    pub fn lowpass(strength: f64) -> BoundaryStage {
        BoundaryStage {
            effect: Effect::Lowpass,
            strength,
            curve: lowpass_resonance,
        }
    }
}

impl EffectStage for BoundaryStage {
    fn effect(&self) -> Effect {
        self.effect
    }

    fn compute_effect(&self, reading: &CursorReading) -> Option<f64> {
        if self.strength == 0.0 {
            return None;
        }
        Some((self.curve)(self.strength, reading.distance))
    }
}

/// Coefficients for every stage that could be assembled.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StageCoefficients {
    pub pan_per_column: f64,
    pub gain_cutoff: f64,
    pub reverb_wetness: f64,
    pub lowpass_resonance: f64,
}

/// Assembles stages for the given effects, in order.
pub fn build_stages(
    effects: impl IntoIterator<Item = Effect>,
    coefficients: &StageCoefficients,
) -> Vec<Box<dyn EffectStage>> {
    effects
        .into_iter()
        .map(|effect| -> Box<dyn EffectStage> {
            match effect {
                Effect::Pan => Box::new(PanStage::new(coefficients.pan_per_column)),
                Effect::Gain => Box::new(BoundaryStage::gain(coefficients.gain_cutoff)),
                Effect::Reverb => Box::new(BoundaryStage::reverb(coefficients.reverb_wetness)),
                Effect::Lowpass => {
                    Box::new(BoundaryStage::lowpass(coefficients.lowpass_resonance))
                }
            }
        })
        .collect()
}

/// Parameter values derived from one cursor reading. `None` leaves the engine alone.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectSettings {
    pub pan: Option<f64>,
    pub gain: Option<f64>,
    pub reverb_wet: Option<f64>,
    pub lowpass_resonance: Option<f64>,
}

impl EffectSettings {
    /// Runs every stage over the reading.
    pub fn compute(stages: &[Box<dyn EffectStage>], reading: &CursorReading) -> EffectSettings {
        let mut settings = EffectSettings::default();
        for stage in stages {
            if let Some(value) = stage.compute_effect(reading) {
                settings.set(stage.effect(), value);
            }
        }
        settings
    }

    pub fn set(&mut self, effect: Effect, value: f64) {
        let slot = match effect {
            Effect::Pan => &mut self.pan,
            Effect::Gain => &mut self.gain,
            Effect::Reverb => &mut self.reverb_wet,
            Effect::Lowpass => &mut self.lowpass_resonance,
        };
        *slot = Some(value);
    }

    pub fn get(&self, effect: Effect) -> Option<f64> {
        match effect {
            Effect::Pan => self.pan,
            Effect::Gain => self.gain,
            Effect::Reverb => self.reverb_wet,
            Effect::Lowpass => self.lowpass_resonance,
        }
    }

    /// The enabled values, in pan, gain, reverb, lowpass order.
    pub fn enabled(&self) -> Vec<(Effect, f64)> {
        [Effect::Pan, Effect::Gain, Effect::Reverb, Effect::Lowpass]
            .into_iter()
            .filter_map(|effect| self.get(effect).map(|value| (effect, value)))
            .collect()
    }
}
