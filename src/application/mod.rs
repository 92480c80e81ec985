//! Application layer - Use cases and port interfaces
//!
//! Contains the core recording workflow and trait definitions
//! for external system interactions.

pub mod capture;
pub mod ports;
pub mod record;

// Re-export use cases
pub use capture::StopCause;
pub use record::{
    BoundedRecorder, CapturedRecording, RecordCallbacks, RecorderOptions, DEFAULT_POLL_INTERVAL,
};
