//! Transcription domain module

mod language;

pub use language::Language;
