//! OpenAI-compatible Whisper transcriber adapter (Groq by default)

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::application::ports::{Transcriber, TranscriptionError};
use crate::domain::config::{DEFAULT_API_BASE_URL, DEFAULT_MODEL};
use crate::domain::transcription::Language;

// Response types for the transcription endpoint

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Speech-to-text over `POST {base_url}/audio/transcriptions`
pub struct WhisperTranscriber {
    api_key: Option<String>,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperTranscriber {
    /// Create a transcriber against the default Groq endpoint.
    ///
    /// A missing key is reported when a transcription is attempted, so a
    /// recording can still be captured and checked without one.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at a different OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn api_url(&self) -> String {
        format!("{}/audio/transcriptions", self.base_url.trim_end_matches('/'))
    }

    fn error_message(body: &str) -> String {
        serde_json::from_str::<ApiErrorResponse>(body)
            .map(|r| r.error.message)
            .unwrap_or_else(|_| body.to_string())
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        language: Language,
    ) -> Result<String, TranscriptionError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(TranscriptionError::MissingApiKey)?;

        let bytes = tokio::fs::read(audio_path)
            .await
            .map_err(|e| TranscriptionError::ReadFailed(e.to_string()))?;

        let filename = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        info!(file = %filename, bytes = bytes.len(), language = %language, model = %self.model, "sending transcription request");

        let file_part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("language", language.code())
            .part("file", file_part);

        let response = self
            .client
            .post(self.api_url())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let status = response.status();

        // Handle HTTP errors
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TranscriptionError::InvalidApiKey);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranscriptionError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = Self::error_message(&body);
            warn!(status = status.as_u16(), %message, "transcription API error");
            return Err(TranscriptionError::ApiError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                message
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;
        let parsed: VerboseTranscription = serde_json::from_str(&body)
            .map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

        debug!(audio_secs = ?parsed.duration, "transcription response parsed");

        Ok(parsed.text.trim().to_string())
    }
}
