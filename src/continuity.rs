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

//! Seek offsets that let a new voice pick up roughly where the previous one was.
//!
//! This is an approximation. The previous position is derived from wall-clock time
//! modulo the sample length, so looped samples drift in phase over long holds and
//! samples of different lengths are not realigned at their loop points.

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
struct VoiceStart {
    /// Engine time the voice would have started at had it played from zero.
    started_at: f64,
    playback_rate: f64,
}

/// Tracks when the active voice started and how fast it plays.
#[derive(Debug, Clone, Default)]
pub struct ContinuityTracker {
    current: Option<VoiceStart>,
}

impl ContinuityTracker {
    pub fn new() -> ContinuityTracker {
        ContinuityTracker::default()
    }

    /// Records a voice that started at `now`, already `seek_offset_seconds` into its sample.
    pub fn record_start(&mut self, now: f64, playback_rate: f64, seek_offset_seconds: f64) {
        self.current = Some(VoiceStart {
            started_at: now - seek_offset_seconds,
            playback_rate,
        });
    }

    /// Forgets the active voice.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.current.is_some()
    }

    /// Where the next voice should start so it lines up with the one being replaced.
    ///
    /// `sample_duration_seconds` is the duration of the sample the previous voice is
    /// playing. Returns zero when continuity is disabled, nothing was playing, or the
    /// recorded values cannot produce a meaningful offset.
    pub fn compute_seek_offset(
        &self,
        now: f64,
        sample_duration_seconds: f64,
        new_playback_rate: f64,
        continuity_enabled: bool,
    ) -> f64 {
        let previous = match (continuity_enabled, self.current) {
            (true, Some(previous)) => previous,
            _ => return 0.0,
        };

        if !sample_duration_seconds.is_finite() || sample_duration_seconds <= 0.0 {
            warn!(
                duration = sample_duration_seconds,
                "Sample has no usable duration, starting from the beginning"
            );
            return 0.0;
        }
        if !previous.playback_rate.is_finite() || previous.playback_rate <= 0.0 {
            warn!(
                rate = previous.playback_rate,
                "Previous voice had no usable playback rate, starting from the beginning"
            );
            return 0.0;
        }

        let elapsed = (now - previous.started_at).max(0.0);
        let offset_in_old_sample = elapsed % sample_duration_seconds;
        let offset_real_time = offset_in_old_sample / previous.playback_rate;
        let offset = offset_real_time * new_playback_rate;

        if offset.is_finite() && offset >= 0.0 {
            offset
        } else {
            0.0
        }
    }
}
