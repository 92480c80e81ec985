//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::{
    Duration, RecordingLimits, SilenceSettings, DEFAULT_MAX_FILE_BYTES,
};
use crate::domain::transcription::Language;

/// Default OpenAI-compatible endpoint (Groq)
pub const DEFAULT_API_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default speech-to-text model
pub const DEFAULT_MODEL: &str = "whisper-large-v3-turbo";

/// Silence detection section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SilenceConfig {
    pub threshold: Option<f32>,
    pub duration: Option<String>,
    pub gain: Option<f32>,
    pub require_speech: Option<bool>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub model: Option<String>,
    pub language: Option<String>,
    pub output: Option<String>,
    pub min_duration: Option<String>,
    pub max_duration: Option<String>,
    pub max_file_size_kb: Option<u64>,
    pub silence: Option<SilenceConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        let silence = SilenceSettings::default();
        Self {
            api_key: None,
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            model: Some(DEFAULT_MODEL.to_string()),
            language: Some(Language::default().code().to_string()),
            output: None,
            min_duration: Some(Duration::default_min_duration().to_string()),
            max_duration: Some(Duration::default_max_duration().to_string()),
            max_file_size_kb: Some(DEFAULT_MAX_FILE_BYTES / 1024),
            silence: Some(SilenceConfig {
                threshold: Some(silence.threshold),
                duration: Some(Duration::from(silence.hold).to_string()),
                gain: Some(silence.gain),
                require_speech: Some(silence.require_speech),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            api_base_url: other.api_base_url.or(self.api_base_url),
            model: other.model.or(self.model),
            language: other.language.or(self.language),
            output: other.output.or(self.output),
            min_duration: other.min_duration.or(self.min_duration),
            max_duration: other.max_duration.or(self.max_duration),
            max_file_size_kb: other.max_file_size_kb.or(self.max_file_size_kb),
            silence: Self::merge_silence_config(self.silence, other.silence),
        }
    }

    fn merge_silence_config(
        base: Option<SilenceConfig>,
        other: Option<SilenceConfig>,
    ) -> Option<SilenceConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(SilenceConfig {
                threshold: o.threshold.or(b.threshold),
                duration: o.duration.or(b.duration),
                gain: o.gain.or(b.gain),
                require_speech: o.require_speech.or(b.require_speech),
            }),
        }
    }

    /// Get language as parsed Language, or English if not set/invalid
    pub fn language_or_default(&self) -> Language {
        self.language
            .as_deref()
            .map(Language::from_label_or_default)
            .unwrap_or_default()
    }

    pub fn api_base_url_or_default(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Build recording limits, substituting defaults for unset/invalid fields
    pub fn limits_or_default(&self) -> RecordingLimits {
        let defaults = RecordingLimits::default();
        RecordingLimits {
            min_duration: parse_or(&self.min_duration, defaults.min_duration),
            max_duration: parse_or(&self.max_duration, defaults.max_duration),
            max_file_bytes: self
                .max_file_size_kb
                .map(|kb| kb.saturating_mul(1024))
                .unwrap_or(defaults.max_file_bytes),
        }
    }

    /// Build silence settings, substituting defaults for unset/invalid fields
    pub fn silence_or_default(&self) -> SilenceSettings {
        let defaults = SilenceSettings::default();
        let Some(silence) = self.silence.as_ref() else {
            return defaults;
        };

        SilenceSettings {
            threshold: positive_or(silence.threshold, defaults.threshold),
            hold: silence
                .duration
                .as_ref()
                .and_then(|s| s.parse::<Duration>().ok())
                .map(|d| d.as_std())
                .unwrap_or(defaults.hold),
            gain: positive_or(silence.gain, defaults.gain),
            require_speech: silence.require_speech.unwrap_or(defaults.require_speech),
        }
    }
}

fn positive_or(value: Option<f32>, fallback: f32) -> f32 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(fallback)
}

fn parse_or(value: &Option<String>, fallback: Duration) -> Duration {
    value
        .as_ref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}
