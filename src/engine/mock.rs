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
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::info;

use super::{AudioEngine, PendingLibrary, SampleHandle, SampleLibrary, VoiceHandle};
use crate::chain::{Effect, EffectChainConfig};
use crate::error::GridError;

/// Duration given to samples the mock has not been told about.
pub const DEFAULT_MOCK_SAMPLE_SECONDS: f64 = 1.0;

/// A command the mock engine received.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    LoadSamples {
        keys: Vec<String>,
        base_url: String,
    },
    WireChain(String),
    StartVoice {
        voice: VoiceHandle,
        key: String,
        playback_rate: f64,
        seek_offset_seconds: f64,
        looped: bool,
    },
    StopVoice(VoiceHandle),
    SetParameter {
        effect: Effect,
        value: f64,
        ramp: Option<Duration>,
    },
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::LoadSamples { keys, base_url } => {
                write!(f, "load {} from {}", keys.join(","), base_url)
            }
            EngineCommand::WireChain(chain) => write!(f, "wire {}", chain),
            EngineCommand::StartVoice {
                voice,
                key,
                playback_rate,
                seek_offset_seconds,
                looped,
            } => write!(
                f,
                "start {} {} rate={:.4} offset={:.3}s{}",
                voice,
                key,
                playback_rate,
                seek_offset_seconds,
                if *looped { " loop" } else { "" }
            ),
            EngineCommand::StopVoice(voice) => write!(f, "stop {}", voice),
            EngineCommand::SetParameter { effect, value, ramp } => match ramp {
                Some(ramp) => write!(f, "set {}={:.3} over {:?}", effect, value, ramp),
                None => write!(f, "set {}={:.3}", effect, value),
            },
        }
    }
}

/// A mock engine. Doesn't make any sound; records every command it receives.
pub struct MockEngine {
    name: String,
    clock: f64,
    next_voice: u64,
    playing: HashSet<VoiceHandle>,
    durations: HashMap<String, f64>,
    defer_loads: bool,
    fail_loads: bool,
    pending: Vec<(SampleLibrary, oneshot::Sender<Result<SampleLibrary, GridError>>)>,
    commands: Vec<EngineCommand>,
}

impl MockEngine {
    /// Creates a mock engine whose loads resolve immediately.
    pub fn new(name: &str) -> MockEngine {
        MockEngine {
            name: name.to_string(),
            clock: 0.0,
            next_voice: 1,
            playing: HashSet::new(),
            durations: HashMap::new(),
            defer_loads: false,
            fail_loads: false,
            pending: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Holds loads back until `complete_loads` is called.
    pub fn with_deferred_loads(mut self) -> MockEngine {
        self.defer_loads = true;
        self
    }

    /// Makes every load fail.
    pub fn with_failing_loads(mut self) -> MockEngine {
        self.fail_loads = true;
        self
    }

    /// Sets the duration reported for the sample registered under `key`.
    pub fn with_duration(mut self, key: &str, duration_seconds: f64) -> MockEngine {
        self.durations.insert(key.to_string(), duration_seconds);
        self
    }

    /// Resolves any deferred loads.
    pub fn complete_loads(&mut self) {
        for (library, tx) in self.pending.drain(..) {
            let _ = tx.send(Ok(library));
        }
    }

    pub fn advance(&mut self, seconds: f64) {
        self.clock += seconds;
    }

    /// Lets a voice end as a one-shot sample would.
    pub fn finish_voice(&mut self, voice: VoiceHandle) {
        self.playing.remove(&voice);
    }

    pub fn commands(&self) -> &[EngineCommand] {
        &self.commands
    }

    /// Returns and clears the command log.
    pub fn take_commands(&mut self) -> Vec<EngineCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn active_voices(&self) -> usize {
        self.playing.len()
    }

    fn build_library(&self, urls: &HashMap<String, String>) -> Result<SampleLibrary, GridError> {
        SampleLibrary::from_durations(urls.keys().map(|key| {
            (
                key.as_str(),
                self.durations
                    .get(key)
                    .copied()
                    .unwrap_or(DEFAULT_MOCK_SAMPLE_SECONDS),
            )
        }))
    }
}

impl AudioEngine for MockEngine {
    fn load_samples(&mut self, urls: &HashMap<String, String>, base_url: &str) -> PendingLibrary {
        let mut keys: Vec<String> = urls.keys().cloned().collect();
        keys.sort();
        info!(engine = self.name, samples = keys.len(), base_url, "Loading samples (mock)");
        self.commands.push(EngineCommand::LoadSamples {
            keys,
            base_url: base_url.to_string(),
        });

        let (tx, rx) = oneshot::channel();
        if self.fail_loads {
            let _ = tx.send(Err(GridError::NoSampleAvailable));
            return rx;
        }
        match self.build_library(urls) {
            Ok(library) if self.defer_loads => self.pending.push((library, tx)),
            result => {
                let _ = tx.send(result);
            }
        }
        rx
    }

    fn wire_chain(&mut self, chain: &EffectChainConfig) {
        self.commands.push(EngineCommand::WireChain(chain.to_string()));
    }

    fn start_voice(
        &mut self,
        sample: &SampleHandle,
        playback_rate: f64,
        seek_offset_seconds: f64,
        looped: bool,
    ) -> VoiceHandle {
        let voice = VoiceHandle(self.next_voice);
        self.next_voice += 1;
        self.playing.insert(voice);
        self.commands.push(EngineCommand::StartVoice {
            voice,
            key: sample.key().to_string(),
            playback_rate,
            seek_offset_seconds,
            looped,
        });
        voice
    }

    fn stop_voice(&mut self, voice: VoiceHandle) {
        self.playing.remove(&voice);
        self.commands.push(EngineCommand::StopVoice(voice));
    }

    fn set_parameter(&mut self, effect: Effect, value: f64, ramp: Option<Duration>) {
        self.commands
            .push(EngineCommand::SetParameter { effect, value, ramp });
    }

    fn is_playing(&self, voice: VoiceHandle) -> bool {
        self.playing.contains(&voice)
    }

    fn now(&self) -> f64 {
        self.clock
    }
}

impl fmt::Display for MockEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
