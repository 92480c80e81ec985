//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, SilenceConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;
use crate::domain::transcription::Language;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_valid_key(key)?;

    let config = store.load().await?;
    presenter.output(&display_value(&config, key).unwrap_or_else(|| NOT_SET.to_string()));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(
            key,
            &display_value(&config, key).unwrap_or_else(|| NOT_SET.to_string()),
        );
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_valid_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Validate `value` for `key` and store it in `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "api_key" => config.api_key = Some(value.to_string()),
        "api_base_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(key, "Value must be an http(s) URL"));
            }
            config.api_base_url = Some(value.to_string());
        }
        "model" => config.model = Some(value.to_string()),
        "language" => {
            let language = value
                .parse::<Language>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.language = Some(language.code().to_string());
        }
        "output" => config.output = Some(value.to_string()),
        "min_duration" | "max_duration" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            if duration.as_millis() == 0 {
                return Err(invalid(key, "Duration must be greater than zero"));
            }
            if key == "min_duration" {
                config.min_duration = Some(value.to_string());
            } else {
                config.max_duration = Some(value.to_string());
            }
        }
        "max_file_size_kb" => {
            let kb = value
                .parse::<u64>()
                .ok()
                .filter(|kb| *kb > 0)
                .ok_or_else(|| invalid(key, "Value must be a positive whole number of kilobytes"))?;
            config.max_file_size_kb = Some(kb);
        }
        "silence.threshold" | "silence.gain" => {
            let number = parse_positive_f32(value)
                .ok_or_else(|| invalid(key, "Value must be a positive number"))?;
            let silence = config.silence.get_or_insert_with(SilenceConfig::default);
            if key == "silence.threshold" {
                silence.threshold = Some(number);
            } else {
                silence.gain = Some(number);
            }
        }
        "silence.duration" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config
                .silence
                .get_or_insert_with(SilenceConfig::default)
                .duration = Some(value.to_string());
        }
        "silence.require_speech" => {
            let flag = parse_bool(value)
                .map_err(|_| invalid(key, "Value must be 'true' or 'false'"))?;
            config
                .silence
                .get_or_insert_with(SilenceConfig::default)
                .require_speech = Some(flag);
        }
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

/// Current value of `key` as shown by `get` and `list`
fn display_value(config: &AppConfig, key: &str) -> Option<String> {
    let silence = config.silence.as_ref();
    match key {
        "api_key" => config.api_key.as_deref().map(mask_api_key),
        "api_base_url" => config.api_base_url.clone(),
        "model" => config.model.clone(),
        "language" => config.language.clone(),
        "output" => config.output.clone(),
        "min_duration" => config.min_duration.clone(),
        "max_duration" => config.max_duration.clone(),
        "max_file_size_kb" => config.max_file_size_kb.map(|kb| kb.to_string()),
        "silence.threshold" => silence.and_then(|s| s.threshold).map(|v| v.to_string()),
        "silence.duration" => silence.and_then(|s| s.duration.clone()),
        "silence.gain" => silence.and_then(|s| s.gain).map(|v| v.to_string()),
        "silence.require_speech" => silence.and_then(|s| s.require_speech).map(|b| b.to_string()),
        _ => None,
    }
}

fn parse_positive_f32(value: &str) -> Option<f32> {
    value
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}

/// Mask API key for display (show first 4 and last 4 chars)
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}
