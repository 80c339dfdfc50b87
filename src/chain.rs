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

//! Declarative description of the effect chain the audio engine wires between
//! the sample players and the output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// An effect the instrument can drive. Each owns exactly one controllable parameter.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Stereo position, -1 (left) to 1 (right).
    Pan,
    /// Output level.
    Gain,
    /// Reverb wet/dry mix.
    Reverb,
    /// Lowpass comb filter resonance.
    Lowpass,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Pan => write!(f, "pan"),
            Effect::Gain => write!(f, "gain"),
            Effect::Reverb => write!(f, "reverb"),
            Effect::Lowpass => write!(f, "lowpass"),
        }
    }
}

/// One stage in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStage {
    Effect(Effect),
    Output,
}

impl fmt::Display for ChainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainStage::Effect(effect) => write!(f, "{}", effect),
            ChainStage::Output => write!(f, "output"),
        }
    }
}

/// Fixed node settings the engine needs when it builds the stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageOptions {
    pub reverb_decay_seconds: f64,
    pub lowpass_dampening_hz: f64,
    pub lowpass_delay_time_seconds: f64,
}

/// An ordered, validated effect chain. Construction fails unless every stage is
/// unique and the chain ends at the output sink.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectChainConfig {
    stages: Vec<ChainStage>,
    options: StageOptions,
}

impl EffectChainConfig {
    /// Builds the chain `effects... -> output`.
    pub fn from_effects(
        effects: &[Effect],
        options: StageOptions,
    ) -> Result<EffectChainConfig, GridError> {
        let stages = effects
            .iter()
            .copied()
            .map(ChainStage::Effect)
            .chain(std::iter::once(ChainStage::Output))
            .collect();
        EffectChainConfig::new(stages, options)
    }

    /// Validates an explicit stage list.
    pub fn new(
        stages: Vec<ChainStage>,
        options: StageOptions,
    ) -> Result<EffectChainConfig, GridError> {
        match stages.last() {
            Some(ChainStage::Output) => {}
            Some(stage) => {
                return Err(GridError::MalformedConfig(format!(
                    "effect chain must end at the output, found {}",
                    stage
                )))
            }
            None => {
                return Err(GridError::MalformedConfig(
                    "effect chain is empty".to_string(),
                ))
            }
        }

        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].contains(stage) {
                return Err(GridError::MalformedConfig(format!(
                    "stage {} appears more than once in the effect chain",
                    stage
                )));
            }
        }

        for (name, value) in [
            ("reverb decay", options.reverb_decay_seconds),
            ("lowpass dampening", options.lowpass_dampening_hz),
            ("lowpass delay time", options.lowpass_delay_time_seconds),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridError::MalformedConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        Ok(EffectChainConfig { stages, options })
    }

    pub fn stages(&self) -> &[ChainStage] {
        &self.stages
    }

    pub fn options(&self) -> &StageOptions {
        &self.options
    }

    /// The effects in wiring order, without the output sink.
    pub fn effects(&self) -> impl Iterator<Item = Effect> + '_ {
        self.stages.iter().filter_map(|stage| match stage {
            ChainStage::Effect(effect) => Some(*effect),
            ChainStage::Output => None,
        })
    }

    pub fn contains(&self, effect: Effect) -> bool {
        self.stages.contains(&ChainStage::Effect(effect))
    }
}

impl fmt::Display for EffectChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.stages.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", names.join(" -> "))
    }
}
