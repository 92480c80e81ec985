//! Domain layer - Core business logic
//!
//! Contains value objects, the silence state machine, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod transcription;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{Duration, RecordingLimits, RecordingStats, SilenceSettings};
pub use transcription::Language;
