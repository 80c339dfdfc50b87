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
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::InstrumentConfig;
use crate::engine::{AudioEngine, VoiceHandle};
use crate::error::GridError;
use crate::geometry::GridPosition;
use crate::scheduler::PlaybackScheduler;

/// A key the instrument responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Enter,
}

impl Key {
    /// Column and row step for an arrow key.
    fn step(self) -> Option<(i32, i32)> {
        match self {
            Key::Left => Some((-1, 0)),
            Key::Right => Some((1, 0)),
            Key::Up => Some((0, -1)),
            Key::Down => Some((0, 1)),
            Key::Enter => None,
        }
    }
}

impl FromStr for Key {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "arrowleft" => Ok(Key::Left),
            "right" | "arrowright" => Ok(Key::Right),
            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            "enter" => Ok(Key::Enter),
            other => Err(GridError::MalformedConfig(format!("unknown key '{}'", other))),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Left => "left",
            Key::Right => "right",
            Key::Up => "up",
            Key::Down => "down",
            Key::Enter => "enter",
        };
        write!(f, "{}", name)
    }
}

/// What a key press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The cursor moved and the new position was played. `voice` is `None` when
    /// no sample was ready.
    Moved {
        position: GridPosition,
        voice: Option<VoiceHandle>,
    },
    /// The move would have left the cursor range.
    Blocked,
    Stopped,
    Replayed { voice: Option<VoiceHandle> },
}

/// A keyboard-driven grid instrument.
pub struct GridStrument<E: AudioEngine> {
    config: InstrumentConfig,
    cursor: GridPosition,
    scheduler: PlaybackScheduler<E>,
}

impl<E: AudioEngine> GridStrument<E> {
    pub fn new(engine: E, config: InstrumentConfig) -> Result<GridStrument<E>, GridError> {
        let scheduler = PlaybackScheduler::new(engine, &config)?;
        Ok(GridStrument {
            cursor: config.grid().start(),
            config,
            scheduler,
        })
    }

    pub fn handle_key(&mut self, key: Key) -> Result<KeyOutcome, GridError> {
        debug!(%key, cursor = %self.cursor, "Key pressed");
        match key.step() {
            Some((cols, rows)) => {
                let target = GridPosition::new(self.cursor.col + cols, self.cursor.row + rows);
                if !self.config.grid().reachable(target) {
                    return Ok(KeyOutcome::Blocked);
                }
                self.cursor = target;
                let voice = self.scheduler.play(target)?;
                Ok(KeyOutcome::Moved {
                    position: target,
                    voice,
                })
            }
            None if self.scheduler.is_sounding() => {
                self.scheduler.stop();
                Ok(KeyOutcome::Stopped)
            }
            None => Ok(KeyOutcome::Replayed {
                voice: self.scheduler.play(self.cursor)?,
            }),
        }
    }

    /// Swaps in a new configuration. On error nothing changes.
    pub fn reconfigure(&mut self, config: InstrumentConfig) -> Result<(), GridError> {
        self.scheduler.reconfigure(&config)?;
        if !config.grid().reachable(self.cursor) {
            info!(cursor = %self.cursor, "Cursor outside new bounds, resetting");
            self.cursor = config.grid().start();
        }
        self.config = config;
        Ok(())
    }

    pub fn cursor(&self) -> GridPosition {
        self.cursor
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &PlaybackScheduler<E> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut PlaybackScheduler<E> {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::grid::GridConfig;
    use crate::config::sound::{Layout, SoundConfig};
    use crate::engine::mock::{EngineCommand, MockEngine};

    fn instrument() -> GridStrument<MockEngine> {
        let config = InstrumentConfig::new(
            GridConfig::default(),
            SoundConfig::default().with_layout(Layout::Pan),
        );
        GridStrument::new(MockEngine::new("mock"), config).unwrap()
    }

    #[test]
    fn test_parse_keys() {
        assert_eq!("Left".parse::<Key>().unwrap(), Key::Left);
        assert_eq!("ArrowDown".parse::<Key>().unwrap(), Key::Down);
        assert_eq!(" enter ".parse::<Key>().unwrap(), Key::Enter);
        assert!("space".parse::<Key>().is_err());
    }

    #[test]
    fn test_moves_play() {
        let mut instrument = instrument();
        assert_eq!(instrument.cursor(), GridPosition::new(2, 2));

        match instrument.handle_key(Key::Up).unwrap() {
            KeyOutcome::Moved { position, voice } => {
                assert_eq!(position, GridPosition::new(2, 1));
                assert!(voice.is_some());
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        // F2 from the E2 sample.
        assert_eq!(
            instrument.scheduler().active_voice().unwrap().sample_pitch,
            40
        );
    }

    #[test]
    fn test_moves_stop_at_cursor_range() {
        let mut instrument = instrument();
        for _ in 0..4 {
            instrument.handle_key(Key::Left).unwrap();
        }
        assert_eq!(instrument.cursor(), GridPosition::new(-2, 2));

        instrument.scheduler_mut().engine_mut().take_commands();
        assert_eq!(instrument.handle_key(Key::Left).unwrap(), KeyOutcome::Blocked);
        assert_eq!(instrument.cursor(), GridPosition::new(-2, 2));
        assert!(instrument.scheduler().engine().commands().is_empty());
    }

    #[test]
    fn test_enter_toggles() {
        let mut instrument = instrument();

        assert!(matches!(
            instrument.handle_key(Key::Enter).unwrap(),
            KeyOutcome::Replayed { voice: Some(_) }
        ));
        assert_eq!(instrument.handle_key(Key::Enter).unwrap(), KeyOutcome::Stopped);
        assert!(!instrument.scheduler().is_sounding());
    }

    #[test]
    fn test_enter_replays_finished_voice() {
        let mut instrument = instrument();
        let voice = match instrument.handle_key(Key::Enter).unwrap() {
            KeyOutcome::Replayed { voice: Some(voice) } => voice,
            other => panic!("unexpected outcome {:?}", other),
        };
        instrument.scheduler_mut().engine_mut().finish_voice(voice);

        assert!(matches!(
            instrument.handle_key(Key::Enter).unwrap(),
            KeyOutcome::Replayed { voice: Some(_) }
        ));
        assert!(instrument
            .scheduler()
            .engine()
            .commands()
            .contains(&EngineCommand::StopVoice(voice)));
    }

    #[test]
    fn test_reconfigure_resets_cursor() {
        let mut instrument = instrument();
        for _ in 0..3 {
            instrument.handle_key(Key::Right).unwrap();
        }
        assert_eq!(instrument.cursor(), GridPosition::new(5, 2));

        let narrower = GridConfig {
            min_col: -3,
            max_col: 4,
            ..GridConfig::default()
        };
        instrument
            .reconfigure(InstrumentConfig::new(
                narrower,
                SoundConfig::default().with_layout(Layout::Pan),
            ))
            .unwrap();
        assert_eq!(instrument.cursor(), GridPosition::new(2, 2));
    }

    #[test]
    fn test_reconfigure_rejects_invalid() {
        let mut instrument = instrument();
        instrument.handle_key(Key::Down).unwrap();

        // The row layout needs nine columns.
        let invalid = InstrumentConfig::new(
            GridConfig {
                max_col: 3,
                ..GridConfig::default()
            },
            SoundConfig::default(),
        );
        assert!(instrument.reconfigure(invalid).is_err());
        assert_eq!(instrument.cursor(), GridPosition::new(2, 3));
        assert_eq!(instrument.config().sound().layout(), Layout::Pan);
    }
}
