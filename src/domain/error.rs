//! Domain error types

use thiserror::Error;

use crate::domain::recording::Duration;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>s, <number>m, <number>m<number>s or <number>ms (e.g., 30s, 1m, 2m30s, 2500ms)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when an unknown language code is provided
#[derive(Debug, Clone, Error)]
#[error("Invalid language: \"{input}\". Valid languages are: en, lt (english, lithuanian)")]
pub struct InvalidLanguageError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Prefix for every recorder failure shown to the user
pub const USER_ERROR_PREFIX: &str = "Klaida įrašymo metu";

/// Closed set of recorder failure kinds for programmatic dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecorderErrorKind {
    DeviceError,
    EmptyRecording,
    TooShort,
    TooLong,
    OversizeFile,
    Other,
}

/// Everything that can end a `record()` call without a transcript.
///
/// Messages are Lithuanian because they are shown verbatim to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecorderError {
    /// No usable input device or no input channels
    #[error("Mikrofono klaida: {0}")]
    DeviceError(String),

    /// The finished file holds zero frames
    #[error("Audio failas tuščias. Įrašymo klaida!")]
    EmptyRecording,

    #[error("Įrašymas per trumpas: ({recorded_secs:.2} s). Min {min}.")]
    TooShort { recorded_secs: f64, min: Duration },

    /// `recorded_secs` is `None` when the live ceiling fired before the file was closed
    #[error("{}", too_long_message(.recorded_secs, .max))]
    TooLong {
        recorded_secs: Option<f64>,
        max: Duration,
    },

    #[error("Failo dydis per didelis: ({:.2} KB). Max leidžiamas dydis – {}.", kilobytes(.size_bytes), format_megabytes(.max_bytes))]
    OversizeFile { size_bytes: u64, max_bytes: u64 },

    #[error("{0}")]
    Other(String),
}

impl RecorderError {
    pub fn kind(&self) -> RecorderErrorKind {
        match self {
            Self::DeviceError(_) => RecorderErrorKind::DeviceError,
            Self::EmptyRecording => RecorderErrorKind::EmptyRecording,
            Self::TooShort { .. } => RecorderErrorKind::TooShort,
            Self::TooLong { .. } => RecorderErrorKind::TooLong,
            Self::OversizeFile { .. } => RecorderErrorKind::OversizeFile,
            Self::Other(_) => RecorderErrorKind::Other,
        }
    }

    /// Full message for display, e.g. "Klaida įrašymo metu: Mikrofono klaida: ..."
    pub fn user_message(&self) -> String {
        format!("{}: {}", USER_ERROR_PREFIX, self)
    }
}

fn too_long_message(recorded_secs: &Option<f64>, max: &Duration) -> String {
    match *recorded_secs {
        Some(secs) => format!("Įrašymas per ilgas: ({:.2} s). Max {}.", secs, max),
        None => format!("Įrašymas per ilgas (max {})", max),
    }
}

fn kilobytes(bytes: &u64) -> f64 {
    *bytes as f64 / 1024.0
}

fn format_megabytes(bytes: &u64) -> String {
    let mb = *bytes as f64 / (1024.0 * 1024.0);
    if mb.fract() == 0.0 {
        format!("{} MB", mb as u64)
    } else {
        format!("{:.2} MB", mb)
    }
}
