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

//! The capability the instrument drives: an audio engine that loads samples, plays
//! voices and owns the effect nodes. The instrument never touches audio data itself.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::chain::{Effect, EffectChainConfig};
use crate::error::GridError;
use crate::geometry::Note;

pub mod mock;

/// Identifies a started voice within the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceHandle(pub u64);

impl fmt::Display for VoiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice-{}", self.0)
    }
}

/// A loaded sample as the engine knows it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleHandle {
    /// The note name the sample was registered under, e.g. `E2`.
    key: String,
    /// Length of the sample at its natural rate.
    duration_seconds: f64,
}

impl SampleHandle {
    pub fn new(key: &str, duration_seconds: f64) -> SampleHandle {
        SampleHandle {
            key: key.to_string(),
            duration_seconds,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }
}

/// Loaded samples keyed by their natural pitch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleLibrary {
    samples: BTreeMap<i32, SampleHandle>,
}

impl SampleLibrary {
    pub fn new() -> SampleLibrary {
        SampleLibrary::default()
    }

    /// Registers a sample under its note name. Two samples may not share a pitch.
    pub fn insert(&mut self, key: &str, duration_seconds: f64) -> Result<i32, GridError> {
        let pitch = key.parse::<Note>()?.pitch();
        if let Some(existing) = self.samples.get(&pitch) {
            return Err(GridError::MalformedConfig(format!(
                "samples '{}' and '{}' share pitch {}",
                existing.key, key, pitch
            )));
        }
        self.samples
            .insert(pitch, SampleHandle::new(key, duration_seconds));
        Ok(pitch)
    }

    /// Builds a library from note names and durations.
    pub fn from_durations<'a>(
        samples: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Result<SampleLibrary, GridError> {
        let mut library = SampleLibrary::new();
        for (key, duration_seconds) in samples {
            library.insert(key, duration_seconds)?;
        }
        Ok(library)
    }

    pub fn get(&self, pitch: i32) -> Option<&SampleHandle> {
        self.samples.get(&pitch)
    }

    /// Pitches in ascending order.
    pub fn pitches(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.keys().copied()
    }

    /// The lowest-pitched sample, if any.
    pub fn first(&self) -> Option<&SampleHandle> {
        self.samples.values().next()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// A library load that may still be in flight.
pub type PendingLibrary = oneshot::Receiver<Result<SampleLibrary, GridError>>;

/// Checks a note name -> URL map before it is handed to an engine.
pub fn validate_sample_urls(urls: &HashMap<String, String>) -> Result<(), GridError> {
    if urls.is_empty() {
        return Err(GridError::MalformedConfig(
            "at least one sample URL is required".to_string(),
        ));
    }
    let mut probe = SampleLibrary::new();
    for key in urls.keys() {
        probe.insert(key, 0.0)?;
    }
    Ok(())
}

/// The operations the instrument needs from an audio engine.
pub trait AudioEngine {
    /// Starts loading samples. `urls` maps note names to paths relative to `base_url`.
    fn load_samples(&mut self, urls: &HashMap<String, String>, base_url: &str) -> PendingLibrary;

    /// Wires the effect nodes between the sample players and the output.
    fn wire_chain(&mut self, chain: &EffectChainConfig);

    /// Starts a voice. `seek_offset_seconds` is a position within the sample.
    fn start_voice(
        &mut self,
        sample: &SampleHandle,
        playback_rate: f64,
        seek_offset_seconds: f64,
        looped: bool,
    ) -> VoiceHandle;

    fn stop_voice(&mut self, voice: VoiceHandle);

    /// Sets an effect parameter immediately, or ramps to it over `ramp`.
    fn set_parameter(&mut self, effect: Effect, value: f64, ramp: Option<Duration>);

    /// Whether the voice is still sounding. One-shot voices end on their own.
    fn is_playing(&self, voice: VoiceHandle) -> bool;

    /// The engine clock, in seconds.
    fn now(&self) -> f64;
}
