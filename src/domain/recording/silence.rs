//! Trailing-silence detection
//!
//! The tracker is a small state machine fed once per captured chunk with the
//! chunk's RMS level and the stream position at the end of that chunk. It
//! never looks at a clock itself, so the same logic runs against the live
//! audio clock and against scripted input in tests.

use std::time::Duration as StdDuration;

use super::signal::DEFAULT_GAIN;

/// RMS level (16-bit scale) below which a chunk counts as silent
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 500.0;

/// How long a run of silent chunks must last before capture stops
pub const DEFAULT_SILENCE_HOLD_MS: u64 = 2000;

/// Tuning for the gain stage and silence auto-stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceSettings {
    /// Chunks with RMS strictly below this are silent
    pub threshold: f32,
    /// Silent run length that triggers auto-stop
    pub hold: StdDuration,
    /// Multiplier applied before clipping
    pub gain: f32,
    /// Only arm the silence timer after the first loud chunk
    pub require_speech: bool,
}

impl Default for SilenceSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SILENCE_THRESHOLD,
            hold: StdDuration::from_millis(DEFAULT_SILENCE_HOLD_MS),
            gain: DEFAULT_GAIN,
            require_speech: false,
        }
    }
}

impl SilenceSettings {
    pub fn is_silent(&self, rms: f32) -> bool {
        rms < self.threshold
    }
}

/// Decision after observing one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceVerdict {
    Continue,
    Stop,
}

/// Silence timer for a single capture session.
#[derive(Debug, Clone)]
pub struct SilenceTracker {
    settings: SilenceSettings,
    silence_started: Option<StdDuration>,
    heard_speech: bool,
}

impl SilenceTracker {
    pub fn new(settings: SilenceSettings) -> Self {
        Self {
            settings,
            silence_started: None,
            heard_speech: false,
        }
    }

    /// Feed one chunk. `at` is the stream position when the chunk ended.
    pub fn observe(&mut self, rms: f32, at: StdDuration) -> SilenceVerdict {
        if !self.settings.is_silent(rms) {
            self.silence_started = None;
            self.heard_speech = true;
            return SilenceVerdict::Continue;
        }

        if self.settings.require_speech && !self.heard_speech {
            return SilenceVerdict::Continue;
        }

        match self.silence_started {
            None => {
                self.silence_started = Some(at);
                SilenceVerdict::Continue
            }
            Some(started) if at.saturating_sub(started) >= self.settings.hold => {
                SilenceVerdict::Stop
            }
            Some(_) => SilenceVerdict::Continue,
        }
    }

    /// Whether a silent run is currently being timed
    pub fn is_timing(&self) -> bool {
        self.silence_started.is_some()
    }

    pub fn heard_speech(&self) -> bool {
        self.heard_speech
    }
}
