//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio_input;
pub mod config;
pub mod recording_store;
pub mod transcriber;

// Re-export common types
pub use audio_input::{AudioInput, CaptureStream, ChunkSink, ErrorSink, InputDeviceInfo};
pub use config::ConfigStore;
pub use recording_store::{FrameWriter, PcmFormat, RecordingStore};
pub use transcriber::{Transcriber, TranscriptionError};
