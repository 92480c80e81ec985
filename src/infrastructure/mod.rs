//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the audio host, the filesystem and the Whisper API.

pub mod config;
pub mod recording;
pub mod transcription;

// Re-export adapters
pub use config::XdgConfigStore;
pub use recording::{CpalInput, WavStore};
pub use transcription::WhisperTranscriber;
