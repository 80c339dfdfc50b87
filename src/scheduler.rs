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

//! Single-voice playback: resolves the nearest sample for a cursor position, replaces
//! the active voice and pushes effect parameters to the engine.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info, span, warn, Level, Span};

use crate::chain::EffectChainConfig;
use crate::config::InstrumentConfig;
use crate::continuity::ContinuityTracker;
use crate::curve::{build_stages, EffectSettings, EffectStage};
use crate::engine::{AudioEngine, PendingLibrary, SampleLibrary, VoiceHandle};
use crate::error::GridError;
use crate::geometry::{GeometryMapper, GridPosition};
use crate::pitch;


/// The voice currently sounding.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveVoice {
    pub handle: VoiceHandle,
    pub sample_pitch: i32,
    pub playback_rate: f64,
    pub start_offset_seconds: f64,
    /// Engine time the voice was started.
    pub started_at: f64,
    pub sample_duration_seconds: f64,
}

/// At most one voice exists at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Voicing(ActiveVoice),
}

/// Where a sample library comes from.
#[derive(Debug, Clone, PartialEq)]
struct SampleSource {
    urls: HashMap<String, String>,
    base_url: String,
}

/// Per-play settings taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlaybackSettings {
    looped: bool,
    use_offsets: bool,
    ramp: Option<Duration>,
}

/// Drives an [`AudioEngine`] from cursor positions.
pub struct PlaybackScheduler<E: AudioEngine> {
    engine: E,
    mapper: GeometryMapper,
    stages: Vec<Box<dyn EffectStage>>,
    chain: EffectChainConfig,
    source: SampleSource,
    settings: PlaybackSettings,
    library: SampleLibrary,
    pending: Option<PendingLibrary>,
    tracker: ContinuityTracker,
    state: PlaybackState,
    span: Span,
}

impl<E: AudioEngine> PlaybackScheduler<E> {
    /// Validates the configuration, wires the effect chain and starts loading samples.
    pub fn new(
        mut engine: E,
        config: &InstrumentConfig,
    ) -> Result<PlaybackScheduler<E>, GridError> {
        config.validate()?;

        let chain = config.chain()?;
        let source = SampleSource {
            urls: config.sound().sampler_urls()?,
            base_url: config.sound().sampler_base_url().to_string(),
        };

        info!(chain = chain.to_string(), "Wiring effect chain");
        engine.wire_chain(&chain);
        let pending = engine.load_samples(&source.urls, &source.base_url);

        Ok(PlaybackScheduler {
            engine,
            mapper: config.mapper()?,
            stages: build_stages(chain.effects(), &config.sound().stage_coefficients()),
            chain,
            source,
            settings: Self::settings_from(config)?,
            library: SampleLibrary::new(),
            pending: Some(pending),
            tracker: ContinuityTracker::new(),
            state: PlaybackState::Idle,
            span: span!(Level::INFO, "scheduler"),
        })
    }

    fn settings_from(config: &InstrumentConfig) -> Result<PlaybackSettings, GridError> {
        Ok(PlaybackSettings {
            looped: config.sound().looped(),
            use_offsets: config.sound().use_offsets(),
            ramp: config.sound().ramp()?,
        })
    }

    /// Installs the sample library if its load has finished. Returns true when a
    /// library is ready.
    pub fn poll_library(&mut self) -> bool {
        if let Some(pending) = self.pending.as_mut() {
            match pending.try_recv() {
                Ok(result) => {
                    self.pending = None;
                    self.install_library(result);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    self.pending = None;
                    warn!("Sample load was abandoned by the engine");
                }
            }
        }
        !self.library.is_empty()
    }

    /// Waits for an in-flight library load to finish.
    pub async fn wait_for_library(&mut self) -> Result<(), GridError> {
        if let Some(pending) = self.pending.take() {
            match pending.await {
                Ok(Ok(library)) => self.install_library(Ok(library)),
                Ok(Err(e)) => return Err(e),
                Err(_) => return Err(GridError::NoSampleAvailable),
            }
        }
        Ok(())
    }

    fn install_library(&mut self, result: Result<SampleLibrary, GridError>) {
        match result {
            Ok(library) => {
                info!(samples = library.len(), "Sample library loaded");
                self.library = library;
            }
            Err(e) => warn!(err = e.to_string(), "Sample library failed to load"),
        }
    }

    /// Plays the note for `position`, replacing any active voice.
    ///
    /// Returns `Ok(None)` without touching the engine when no sample is loaded yet.
    /// Positions outside the note table are configuration errors and are returned.
    pub fn play(&mut self, position: GridPosition) -> Result<Option<VoiceHandle>, GridError> {
        self.play_with_ramp(position, self.settings.ramp)
    }

    /// Like [`PlaybackScheduler::play`], with the parameter ramp chosen by the caller.
    /// `None` sets parameters instantly.
    pub fn play_with_ramp(
        &mut self,
        position: GridPosition,
        ramp: Option<Duration>,
    ) -> Result<Option<VoiceHandle>, GridError> {
        let span = self.span.clone();
        let _enter = span.enter();

        match self.try_play(position, ramp) {
            Ok(voice) => Ok(Some(voice)),
            Err(GridError::NoSampleAvailable) => {
                warn!(%position, "No sample available, staying silent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn try_play(
        &mut self,
        position: GridPosition,
        ramp: Option<Duration>,
    ) -> Result<VoiceHandle, GridError> {
        self.poll_library();

        let reading = self.mapper.read(position)?;
        let effects = EffectSettings::compute(&self.stages, &reading);
        let resolution = pitch::resolve(reading.note.pitch(), self.library.pitches())?;
        let sample = self
            .library
            .get(resolution.chosen_pitch)
            .cloned()
            .ok_or(GridError::NoSampleAvailable)?;

        debug!(
            %position,
            note = reading.note.to_string(),
            distance = reading.distance,
            sample = sample.key(),
            rate = resolution.playback_rate,
            "Resolved note"
        );

        let now = self.engine.now();
        let mut seek_offset = 0.0;
        if let PlaybackState::Voicing(previous) = std::mem::take(&mut self.state) {
            let continuing = self.settings.use_offsets && self.engine.is_playing(previous.handle);
            seek_offset = self.tracker.compute_seek_offset(
                now,
                previous.sample_duration_seconds,
                resolution.playback_rate,
                continuing,
            );
            self.engine.stop_voice(previous.handle);
        }

        let handle = self.engine.start_voice(
            &sample,
            resolution.playback_rate,
            seek_offset,
            self.settings.looped,
        );
        for (effect, value) in effects.enabled() {
            self.engine.set_parameter(effect, value, ramp);
        }

        self.tracker
            .record_start(now, resolution.playback_rate, seek_offset);
        self.state = PlaybackState::Voicing(ActiveVoice {
            handle,
            sample_pitch: resolution.chosen_pitch,
            playback_rate: resolution.playback_rate,
            start_offset_seconds: seek_offset,
            started_at: now,
            sample_duration_seconds: sample.duration_seconds(),
        });

        info!(
            voice = %handle,
            note = reading.note.to_string(),
            sample = sample.key(),
            offset = seek_offset,
            "Voice started"
        );
        Ok(handle)
    }

    /// Stops the active voice. Does nothing when idle.
    pub fn stop(&mut self) {
        if let PlaybackState::Voicing(voice) = std::mem::take(&mut self.state) {
            info!(voice = %voice.handle, "Voice stopped");
            self.engine.stop_voice(voice.handle);
            self.tracker.clear();
        }
    }

    /// Whether a voice is active and the engine still hears it.
    pub fn is_sounding(&self) -> bool {
        match &self.state {
            PlaybackState::Voicing(voice) => self.engine.is_playing(voice.handle),
            PlaybackState::Idle => false,
        }
    }

    /// Applies a new configuration. Invalid configurations are rejected untouched.
    ///
    /// A new sample source stops playback and replaces the library, so no voice can
    /// refer to a pitch resolved against the old one. Turning looping off also stops
    /// playback.
    pub fn reconfigure(&mut self, config: &InstrumentConfig) -> Result<(), GridError> {
        config.validate()?;

        let chain = config.chain()?;
        let mapper = config.mapper()?;
        let settings = Self::settings_from(config)?;
        let source = SampleSource {
            urls: config.sound().sampler_urls()?,
            base_url: config.sound().sampler_base_url().to_string(),
        };

        let source_changed = source != self.source;
        if source_changed || (self.settings.looped && !settings.looped) {
            self.stop();
        }

        if source_changed || chain != self.chain {
            info!(chain = chain.to_string(), "Rewiring effect chain");
            self.engine.wire_chain(&chain);
        }

        if source_changed {
            info!(samples = source.urls.len(), "Reloading sample library");
            self.library = SampleLibrary::new();
            self.pending = Some(self.engine.load_samples(&source.urls, &source.base_url));
            self.source = source;
        }

        self.stages = build_stages(chain.effects(), &config.sound().stage_coefficients());
        self.chain = chain;
        self.mapper = mapper;
        self.settings = settings;
        Ok(())
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn active_voice(&self) -> Option<&ActiveVoice> {
        match &self.state {
            PlaybackState::Voicing(voice) => Some(voice),
            PlaybackState::Idle => None,
        }
    }

    pub fn library(&self) -> &SampleLibrary {
        &self.library
    }

    pub fn chain(&self) -> &EffectChainConfig {
        &self.chain
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}
