//! Transcription port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::RecorderError;
use crate::domain::transcription::Language;

/// Transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Missing API key. Set GROQ_API_KEY or run 'memo-recorder config set api_key <key>'")]
    MissingApiKey,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Failed to read audio file: {0}")]
    ReadFailed(String),

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("API error: {0}")]
    ApiError(String),
}

impl From<TranscriptionError> for RecorderError {
    fn from(err: TranscriptionError) -> Self {
        RecorderError::Other(format!("Klaida transkribuojant: {}", err))
    }
}

/// Port for speech-to-text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a finished recording.
    ///
    /// # Arguments
    /// * `audio_path` - A validated WAV file
    /// * `language` - The spoken language
    ///
    /// # Returns
    /// The transcript text or an error
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Language,
    ) -> Result<String, TranscriptionError>;
}
