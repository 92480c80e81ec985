//! Recording domain module

mod duration;
mod limits;
pub mod signal;
mod silence;

pub use duration::{Duration, DEFAULT_MAX_DURATION_SECS, DEFAULT_MIN_DURATION_SECS};
pub use limits::{RecordingLimits, RecordingStats, DEFAULT_MAX_FILE_BYTES};
pub use silence::{
    SilenceSettings, SilenceTracker, SilenceVerdict, DEFAULT_SILENCE_HOLD_MS,
    DEFAULT_SILENCE_THRESHOLD,
};
