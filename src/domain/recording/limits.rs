//! Post-capture validation of a finished recording

use std::time::Duration as StdDuration;

use crate::domain::error::RecorderError;

use super::duration::Duration;

/// Largest file handed to transcription (6 MiB)
pub const DEFAULT_MAX_FILE_BYTES: u64 = 6 * 1024 * 1024;

/// What a finalized PCM file looks like on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingStats {
    /// Frames per channel
    pub frames: u32,
    pub sample_rate: u32,
    pub channels: u16,
    pub size_bytes: u64,
}

impl RecordingStats {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }

    pub fn duration(&self) -> StdDuration {
        StdDuration::from_secs_f64(self.duration_secs())
    }
}

/// Bounds a recording must satisfy before it is transcribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingLimits {
    /// Inclusive lower bound
    pub min_duration: Duration,
    /// Inclusive upper bound, also the live capture ceiling
    pub max_duration: Duration,
    /// Inclusive upper bound on file size
    pub max_file_bytes: u64,
}

impl Default for RecordingLimits {
    fn default() -> Self {
        Self {
            min_duration: Duration::default_min_duration(),
            max_duration: Duration::default_max_duration(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl RecordingLimits {
    /// Check emptiness, then duration, then size.
    pub fn validate(&self, stats: &RecordingStats) -> Result<(), RecorderError> {
        if stats.frames == 0 {
            return Err(RecorderError::EmptyRecording);
        }

        let recorded_secs = stats.duration_secs();

        if recorded_secs > self.max_duration.as_secs_f64() {
            return Err(RecorderError::TooLong {
                recorded_secs: Some(recorded_secs),
                max: self.max_duration,
            });
        }

        if recorded_secs < self.min_duration.as_secs_f64() {
            return Err(RecorderError::TooShort {
                recorded_secs,
                min: self.min_duration,
            });
        }

        if stats.size_bytes > self.max_file_bytes {
            return Err(RecorderError::OversizeFile {
                size_bytes: stats.size_bytes,
                max_bytes: self.max_file_bytes,
            });
        }

        Ok(())
    }
}
