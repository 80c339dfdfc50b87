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
//! Standalone sound buttons: a play/stop toggle for one sample, a variant whose pan
//! follows an oscillator, and a picker that cycles through a list of sounds.

use std::collections::HashMap;
use std::f64::consts::TAU;

use tokio::sync::oneshot::error::TryRecvError;
use tracing::{info, warn};

use crate::chain::Effect;
use crate::config::packs::SoundDefinition;
use crate::engine::{AudioEngine, PendingLibrary, SampleHandle, VoiceHandle};
use crate::error::GridError;

/// The note name a button's single sample is registered under. Buttons always play
/// at rate 1, so the key only has to be a valid note; its pitch is never used.
pub const BUTTON_SAMPLE_KEY: &str = "C4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Loading,
    /// The sample failed to load.
    Unavailable,
    Stopped,
    Playing(VoiceHandle),
}

/// Plays and stops a single sample at its natural rate.
pub struct SampleSoundButton<E: AudioEngine> {
    engine: E,
    name: String,
    path: String,
    looped: bool,
    sample: Option<SampleHandle>,
    pending: Option<PendingLibrary>,
    state: ButtonState,
}

impl<E: AudioEngine> SampleSoundButton<E> {
    pub fn new(engine: E, name: &str, path: &str, looped: bool) -> SampleSoundButton<E> {
        let mut button = SampleSoundButton {
            engine,
            name: name.to_string(),
            path: path.to_string(),
            looped,
            sample: None,
            pending: None,
            state: ButtonState::Loading,
        };
        button.load();
        button
    }

    fn load(&mut self) {
        let urls = HashMap::from([(BUTTON_SAMPLE_KEY.to_string(), self.path.clone())]);
        self.pending = Some(self.engine.load_samples(&urls, ""));
        self.sample = None;
        self.state = ButtonState::Loading;
    }

    /// Picks up a finished load and notices voices that ended on their own.
    pub fn sync(&mut self) -> ButtonState {
        if let Some(pending) = self.pending.as_mut() {
            let loaded = match pending.try_recv() {
                Ok(Ok(library)) => library.first().cloned(),
                Ok(Err(e)) => {
                    warn!(path = self.path, err = e.to_string(), "Sound failed to load");
                    None
                }
                Err(TryRecvError::Empty) => return self.state,
                Err(TryRecvError::Closed) => None,
            };
            self.pending = None;
            self.state = if loaded.is_some() {
                ButtonState::Stopped
            } else {
                ButtonState::Unavailable
            };
            self.sample = loaded;
        }

        if let ButtonState::Playing(voice) = self.state {
            if !self.engine.is_playing(voice) {
                self.state = ButtonState::Stopped;
            }
        }
        self.state
    }

    /// Starts the sound if it is stopped and stops it if it is playing.
    pub fn toggle(&mut self) -> ButtonState {
        match (self.sync(), self.sample.clone()) {
            (ButtonState::Stopped, Some(sample)) => {
                let voice = self.engine.start_voice(&sample, 1.0, 0.0, self.looped);
                info!(name = self.name, %voice, "Sound started");
                self.state = ButtonState::Playing(voice);
            }
            (ButtonState::Playing(_), _) => self.stop(),
            (state, _) => warn!(name = self.name, ?state, "Sound is not ready"),
        }
        self.state
    }

    pub fn stop(&mut self) {
        if let ButtonState::Playing(voice) = self.state {
            self.engine.stop_voice(voice);
            self.state = ButtonState::Stopped;
        }
    }

    /// Points the button at a different sound, stopping the current one.
    pub fn set_path(&mut self, name: &str, path: &str) {
        self.stop();
        self.name = name.to_string();
        self.path = path.to_string();
        self.load();
    }

    /// Takes effect the next time the sound starts.
    pub fn set_loop(&mut self, looped: bool) {
        self.looped = looped;
    }

    pub fn label(&self) -> String {
        match self.state {
            ButtonState::Loading => "Loading sound...".to_string(),
            ButtonState::Unavailable => format!("{} is unavailable", self.name),
            ButtonState::Stopped => format!("Play {}", self.name),
            ButtonState::Playing(_) => format!("Stop {}", self.name),
        }
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

/// A low frequency oscillator producing pan values in [-1, 1].
///
/// Every waveform crosses zero rising at phase 0, like a sine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOscillator {
    pub frequency_hz: f64,
    pub waveform: Waveform,
    pub phase_degrees: f64,
}

impl Default for PanOscillator {
    fn default() -> Self {
        PanOscillator {
            frequency_hz: 4.0,
            waveform: Waveform::Sine,
            phase_degrees: 90.0,
        }
    }
}

impl PanOscillator {
    pub fn value_at(&self, seconds: f64) -> f64 {
        let cycle = (seconds * self.frequency_hz + self.phase_degrees / 360.0).rem_euclid(1.0);
        match self.waveform {
            Waveform::Sine => (TAU * cycle).sin(),
            Waveform::Triangle => {
                if cycle < 0.25 {
                    4.0 * cycle
                } else if cycle < 0.75 {
                    2.0 - 4.0 * cycle
                } else {
                    4.0 * cycle - 4.0
                }
            }
            Waveform::Square => {
                if cycle < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * (cycle + 0.5).rem_euclid(1.0) - 1.0,
        }
    }
}

/// A sound button whose pan is swept by an oscillator.
pub struct PanningSoundButton<E: AudioEngine> {
    button: SampleSoundButton<E>,
    oscillator: PanOscillator,
}

impl<E: AudioEngine> PanningSoundButton<E> {
    pub fn new(
        button: SampleSoundButton<E>,
        oscillator: PanOscillator,
        start_pan: f64,
    ) -> PanningSoundButton<E> {
        let mut button = button;
        button
            .engine_mut()
            .set_parameter(Effect::Pan, start_pan.clamp(-1.0, 1.0), None);
        PanningSoundButton { button, oscillator }
    }

    /// Pushes the oscillator's current value to the engine and returns it.
    pub fn tick(&mut self) -> f64 {
        let pan = self.oscillator.value_at(self.button.engine().now());
        self.button
            .engine_mut()
            .set_parameter(Effect::Pan, pan, None);
        pan
    }

    pub fn oscillator(&self) -> &PanOscillator {
        &self.oscillator
    }

    pub fn button(&self) -> &SampleSoundButton<E> {
        &self.button
    }

    pub fn button_mut(&mut self) -> &mut SampleSoundButton<E> {
        &mut self.button
    }
}

/// Cycles a sound button through a fixed list of sounds.
pub struct SoundPicker<E: AudioEngine> {
    sounds: Vec<SoundDefinition>,
    selected: usize,
    button: SampleSoundButton<E>,
}

impl<E: AudioEngine> SoundPicker<E> {
    pub fn new(engine: E, sounds: Vec<SoundDefinition>) -> Result<SoundPicker<E>, GridError> {
        let first = sounds.first().cloned().ok_or_else(|| {
            GridError::MalformedConfig("the sound picker needs at least one sound".to_string())
        })?;
        Ok(SoundPicker {
            button: SampleSoundButton::new(engine, &first.name, &first.path, first.looped),
            sounds,
            selected: 0,
        })
    }

    pub fn next(&mut self) -> &SoundDefinition {
        self.select((self.selected + 1) % self.sounds.len())
    }

    pub fn previous(&mut self) -> &SoundDefinition {
        self.select((self.selected + self.sounds.len() - 1) % self.sounds.len())
    }

    fn select(&mut self, index: usize) -> &SoundDefinition {
        self.selected = index;
        let sound = &self.sounds[index];
        self.button.set_loop(sound.looped);
        self.button.set_path(&sound.name, &sound.path);
        sound
    }

    pub fn selected(&self) -> &SoundDefinition {
        &self.sounds[self.selected]
    }

    pub fn button(&self) -> &SampleSoundButton<E> {
        &self.button
    }

    pub fn button_mut(&mut self) -> &mut SampleSoundButton<E> {
        &mut self.button
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::packs::picker_sounds;
    use crate::engine::mock::{EngineCommand, MockEngine};

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_button_toggle() {
        let mut button = SampleSoundButton::new(MockEngine::new("mock"), "Bongo", "bongo.wav", true);
        assert_eq!(button.sync(), ButtonState::Stopped);
        assert_eq!(button.label(), "Play Bongo");

        let voice = match button.toggle() {
            ButtonState::Playing(voice) => voice,
            other => panic!("unexpected state {:?}", other),
        };
        assert_eq!(button.label(), "Stop Bongo");
        assert!(button.engine().commands().contains(&EngineCommand::StartVoice {
            voice,
            key: BUTTON_SAMPLE_KEY.to_string(),
            playback_rate: 1.0,
            seek_offset_seconds: 0.0,
            looped: true,
        }));

        assert_eq!(button.toggle(), ButtonState::Stopped);
        assert!(!button.engine().is_playing(voice));
    }

    #[test]
    fn test_button_waits_for_load() {
        let engine = MockEngine::new("mock").with_deferred_loads();
        let mut button = SampleSoundButton::new(engine, "Bongo", "bongo.wav", false);

        assert_eq!(button.toggle(), ButtonState::Loading);
        assert_eq!(button.label(), "Loading sound...");
        assert_eq!(button.engine().active_voices(), 0);

        button.engine_mut().complete_loads();
        assert!(matches!(button.toggle(), ButtonState::Playing(_)));
    }

    #[test]
    fn test_button_failed_load() {
        let engine = MockEngine::new("mock").with_failing_loads();
        let mut button = SampleSoundButton::new(engine, "Bongo", "bongo.wav", false);
        assert_eq!(button.toggle(), ButtonState::Unavailable);
        assert_eq!(button.engine().active_voices(), 0);
    }

    #[test]
    fn test_button_notices_finished_voice() {
        let mut button = SampleSoundButton::new(MockEngine::new("mock"), "Bongo", "bongo.wav", false);
        let voice = match button.toggle() {
            ButtonState::Playing(voice) => voice,
            other => panic!("unexpected state {:?}", other),
        };
        button.engine_mut().finish_voice(voice);
        assert_eq!(button.sync(), ButtonState::Stopped);

        // Toggling after the sample ended starts it again.
        assert!(matches!(button.toggle(), ButtonState::Playing(_)));
    }

    #[test]
    fn test_set_path_stops_and_reloads() {
        let mut button = SampleSoundButton::new(MockEngine::new("mock"), "Bongo", "bongo.wav", false);
        button.toggle();
        button.engine_mut().take_commands();

        button.set_path("Kalimba", "kalimba.wav");
        let commands = button.engine_mut().take_commands();
        assert!(matches!(commands[0], EngineCommand::StopVoice(_)));
        assert!(matches!(commands[1], EngineCommand::LoadSamples { .. }));
        assert_eq!(button.state(), ButtonState::Loading);
        assert_eq!(button.sync(), ButtonState::Stopped);
        assert_eq!(button.name(), "Kalimba");
    }

    #[test]
    fn test_oscillator_waveforms() {
        let mut oscillator = PanOscillator {
            frequency_hz: 1.0,
            waveform: Waveform::Sine,
            phase_degrees: 0.0,
        };
        assert!(oscillator.value_at(0.0).abs() < EPSILON);
        assert!((oscillator.value_at(0.25) - 1.0).abs() < EPSILON);

        oscillator.waveform = Waveform::Triangle;
        assert!((oscillator.value_at(0.125) - 0.5).abs() < EPSILON);
        assert!((oscillator.value_at(0.5)).abs() < EPSILON);
        assert!((oscillator.value_at(0.75) + 1.0).abs() < EPSILON);

        oscillator.waveform = Waveform::Square;
        assert_eq!(oscillator.value_at(0.1), 1.0);
        assert_eq!(oscillator.value_at(0.6), -1.0);

        oscillator.waveform = Waveform::Sawtooth;
        assert!(oscillator.value_at(0.0).abs() < EPSILON);
        assert!((oscillator.value_at(0.25) - 0.5).abs() < EPSILON);
        assert!((oscillator.value_at(0.75) + 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_oscillator_phase() {
        // The default starts hard right.
        let oscillator = PanOscillator::default();
        assert!((oscillator.value_at(0.0) - 1.0).abs() < EPSILON);
        // Four cycles per second.
        assert!((oscillator.value_at(0.125) + 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_panning_button_tick() {
        let button = SampleSoundButton::new(MockEngine::new("mock"), "Bongo", "bongo.wav", true);
        let oscillator = PanOscillator {
            frequency_hz: 1.0,
            waveform: Waveform::Square,
            phase_degrees: 0.0,
        };
        let mut panning = PanningSoundButton::new(button, oscillator, 0.0);

        assert_eq!(panning.tick(), 1.0);
        panning.button_mut().engine_mut().advance(0.5);
        assert_eq!(panning.tick(), -1.0);

        let pans: Vec<f64> = panning
            .button()
            .engine()
            .commands()
            .iter()
            .filter_map(|command| match command {
                EngineCommand::SetParameter {
                    effect: Effect::Pan,
                    value,
                    ..
                } => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(pans, vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn test_picker_wraps() {
        let sounds = picker_sounds("./sounds/");
        let count = sounds.len();
        let mut picker = SoundPicker::new(MockEngine::new("mock"), sounds).unwrap();
        assert_eq!(picker.selected().name, "Along the Trail");

        assert_eq!(picker.previous().name, "Toy Box (Falling)");
        assert!(picker.button().looped());
        for _ in 0..count {
            picker.next();
        }
        assert_eq!(picker.selected().name, "Toy Box (Falling)");
        assert_eq!(picker.next().name, "Along the Trail");
    }

    #[test]
    fn test_picker_switch_stops_sound() {
        let sounds = picker_sounds("./sounds/");
        let mut picker = SoundPicker::new(MockEngine::new("mock"), sounds).unwrap();
        picker.button_mut().toggle();
        assert_eq!(picker.button().engine().active_voices(), 1);

        assert_eq!(picker.next().name, "Bass Drone");
        assert_eq!(picker.button().engine().active_voices(), 0);
        assert_eq!(picker.button().name(), "Bass Drone");
    }

    #[test]
    fn test_empty_picker() {
        assert!(SoundPicker::new(MockEngine::new("mock"), Vec::new()).is_err());
    }
}
