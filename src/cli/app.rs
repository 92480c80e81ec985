//! Main app runners for recording and checking files

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::application::ports::{ConfigStore, RecordingStore, TranscriptionError};
use crate::application::{BoundedRecorder, CapturedRecording, RecordCallbacks, RecorderOptions};
use crate::domain::config::AppConfig;
use crate::domain::error::RecorderError;
use crate::domain::recording::{Duration, RecordingLimits, SilenceSettings};
use crate::domain::transcription::Language;
use crate::infrastructure::config::default_output_path;
use crate::infrastructure::{CpalInput, WavStore, WhisperTranscriber, XdgConfigStore};

use super::presenter::Presenter;
use super::signals::{stop_on_interrupt, stop_recording_on};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable holding the transcription API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Everything a recording run needs, resolved from merged config
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub output: PathBuf,
    pub language: Language,
    pub limits: RecordingLimits,
    pub silence: SilenceSettings,
    pub transcribe: bool,
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub model: String,
}

impl RecordOptions {
    /// Resolve options from a merged config.
    ///
    /// Durations are parsed strictly here so a bad flag or config value is
    /// reported instead of silently replaced by a default.
    pub fn from_config(config: &AppConfig, transcribe: bool) -> Result<Self, String> {
        let mut limits = config.limits_or_default();
        if let Some(ref s) = config.min_duration {
            limits.min_duration = parse_duration("min-duration", s)?;
        }
        if let Some(ref s) = config.max_duration {
            limits.max_duration = parse_duration("max-duration", s)?;
        }
        if limits.min_duration > limits.max_duration {
            return Err(format!(
                "min-duration ({}) must not exceed max-duration ({})",
                limits.min_duration, limits.max_duration
            ));
        }

        Ok(Self {
            output: config
                .output
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(default_output_path),
            language: config.language_or_default(),
            limits,
            silence: config.silence_or_default(),
            transcribe,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            api_base_url: config.api_base_url_or_default().to_string(),
            model: config.model_or_default().to_string(),
        })
    }
}

fn parse_duration(name: &str, value: &str) -> Result<Duration, String> {
    let duration: Duration = value
        .parse()
        .map_err(|e| format!("Invalid {}: {}", name, e))?;
    if duration.as_millis() == 0 {
        return Err(format!("Invalid {}: must be greater than zero", name));
    }
    Ok(duration)
}

/// Install the stderr tracing subscriber. `RUST_LOG` overrides the default.
pub fn init_tracing(verbose: bool) {
    let default = if verbose {
        "memo_recorder=info"
    } else {
        "memo_recorder=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Record one memo and print the transcript (or the file path)
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    if options.transcribe && options.api_key.is_none() {
        presenter.error(&TranscriptionError::MissingApiKey.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let transcriber = WhisperTranscriber::new(options.api_key.clone())
        .with_base_url(options.api_base_url.clone())
        .with_model(options.model.clone());

    let recorder_options = RecorderOptions {
        language: options.language,
        limits: options.limits,
        silence: options.silence,
        ..RecorderOptions::new(options.output.clone())
    };
    debug!(?recorder_options, "recorder configured");

    let recorder = BoundedRecorder::new(CpalInput::new(), WavStore::new(), transcriber, recorder_options);

    stop_on_interrupt(stop_recording_on(recorder.stop_flag()));

    presenter.start_spinner("Opening microphone...");
    let callbacks = spinner_callbacks(&presenter, options.limits.max_duration);

    if !options.transcribe {
        return match recorder.capture(&callbacks).await {
            Ok(recording) => {
                let summary = presenter.format_stats(&recording.stats);
                presenter.spinner_success(&format!("Recording saved ({})", summary));
                presenter.output(&recording.path.display().to_string());
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => fail(&mut presenter, &e),
        };
    }

    let (tx, rx) = tokio::sync::oneshot::channel();
    recorder.record(callbacks, move |outcome| {
        let _ = tx.send(outcome);
    });
    let outcome = rx
        .await
        .unwrap_or_else(|_| Err(RecorderError::Other("Įrašymas nutrauktas".to_string())));

    match outcome {
        Ok(text) => {
            presenter.spinner_success("Transcription complete");
            presenter.output(&text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => fail(&mut presenter, &e),
    }
}

fn fail(presenter: &mut Presenter, err: &RecorderError) -> ExitCode {
    presenter.spinner_fail("Recording failed");
    presenter.recorder_error(err);
    ExitCode::from(EXIT_ERROR)
}

fn spinner_callbacks(presenter: &Presenter, max: Duration) -> RecordCallbacks {
    let on_start = presenter.spinner_handle();
    let on_end = presenter.spinner_handle();
    let on_transcribe = presenter.spinner_handle();

    RecordCallbacks {
        on_recording_start: Some(Box::new(move || {
            if let Some(ref spinner) = on_start {
                spinner.set_message(format!(
                    "Recording... stops after a pause or at {} (Ctrl+C to finish)",
                    max
                ));
            }
        })),
        on_recording_end: Some(Box::new(move |recording: &CapturedRecording| {
            if let Some(ref spinner) = on_end {
                spinner.set_message(format!(
                    "Recorded {:.2} s",
                    recording.stats.duration_secs()
                ));
            }
        })),
        on_transcribing_start: Some(Box::new(move || {
            if let Some(ref spinner) = on_transcribe {
                spinner.set_message("Transcribing...");
            }
        })),
    }
}

/// Validate an existing WAV file against the configured limits
pub fn run_check(path: &Path, limits: &RecordingLimits) -> ExitCode {
    let presenter = Presenter::new();
    let store = WavStore::new();

    let result = store
        .inspect(path)
        .and_then(|stats| limits.validate(&stats).map(|_| stats));

    match result {
        Ok(stats) => {
            presenter.success(&format!("{} ({})", path.display(), presenter.format_stats(&stats)));
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            presenter.recorder_error(&e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config<S: ConfigStore>(store: &S, cli_config: AppConfig) -> AppConfig {
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, path = %store.path().display(), "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        api_key: env::var(API_KEY_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Merged config using the default XDG store
pub async fn load_default_config(cli_config: AppConfig) -> AppConfig {
    load_merged_config(&XdgConfigStore::new(), cli_config).await
}
