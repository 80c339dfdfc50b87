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
use std::path::Path;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::chain::EffectChainConfig;
use crate::engine::validate_sample_urls;
use crate::error::GridError;
use crate::geometry::GeometryMapper;

use self::error::ConfigError;
use self::grid::GridConfig;
use self::sound::SoundConfig;

pub mod error;
pub mod grid;
pub mod packs;
pub mod sound;

/// The full configuration of a grid instrument.
#[derive(Deserialize, Serialize, Clone, Debug, Default)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Grid bounds and start position.
    grid: GridConfig,

    /// Sound settings.
    sound: SoundConfig,
}

impl InstrumentConfig {
    /// Creates a new instrument configuration.
    pub fn new(grid: GridConfig, sound: SoundConfig) -> InstrumentConfig {
        InstrumentConfig { grid, sound }
    }

    /// Parse an instrument configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<InstrumentConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<InstrumentConfig>()?)
    }

    /// Parse an instrument configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<InstrumentConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<InstrumentConfig>()?)
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn sound(&self) -> &SoundConfig {
        &self.sound
    }

    /// The geometry mapper for this configuration.
    pub fn mapper(&self) -> Result<GeometryMapper, GridError> {
        GeometryMapper::new(
            self.sound.layout(),
            self.grid.clone(),
            self.sound.base_octave(),
            self.sound.pan_per_column(),
        )
    }

    /// The effect chain for this configuration.
    pub fn chain(&self) -> Result<EffectChainConfig, GridError> {
        EffectChainConfig::from_effects(&self.sound.effects(), self.sound.stage_options())
    }

    /// Checks everything that could otherwise fail at play time.
    pub fn validate(&self) -> Result<(), GridError> {
        self.grid.validate()?;
        self.sound.validate()?;
        self.mapper()?;
        self.chain()?;
        validate_sample_urls(&self.sound.sampler_urls()?)?;
        Ok(())
    }
}
