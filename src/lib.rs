//! memo-recorder - bounded voice memo capture with speech-to-text
//!
//! This crate records one short utterance from the default microphone,
//! stops on trailing silence, an external request or a hard time ceiling,
//! validates the resulting WAV file and hands it to a Whisper-compatible
//! transcription API.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the silence state machine, limits and errors
//! - **Application**: The bounded recorder use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, hound, Whisper API, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
