//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::transcription::Language;

/// memo-recorder - record a short voice memo and transcribe it
#[derive(Parser, Debug)]
#[command(name = "memo-recorder")]
#[command(version)]
#[command(about = "Record a voice memo until you stop talking, then transcribe it")]
#[command(long_about = None)]
pub struct Cli {
    /// Where to write the WAV file (overwritten on every run)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Spoken language
    #[arg(short = 'l', long, value_name = "LANGUAGE")]
    pub language: Option<LanguageArg>,

    /// Hard ceiling on recording length (e.g., 30s, 1m)
    #[arg(long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Shortest recording accepted (e.g., 3s, 2500ms)
    #[arg(long, value_name = "TIME")]
    pub min_duration: Option<String>,

    /// Validate the recording and print its path instead of transcribing
    #[arg(long)]
    pub no_transcribe: bool,

    /// Log recorder events to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Validate an existing WAV file against the recording limits
    Check {
        /// WAV file to inspect
        file: PathBuf,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Language argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    #[value(alias = "en")]
    English,
    #[value(alias = "lt")]
    Lithuanian,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::English => Language::English,
            LanguageArg::Lithuanian => Language::Lithuanian,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "api_base_url",
    "model",
    "language",
    "output",
    "min_duration",
    "max_duration",
    "max_file_size_kb",
    "silence.threshold",
    "silence.duration",
    "silence.gain",
    "silence.require_speech",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
