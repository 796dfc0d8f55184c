//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::capture::CaptureLimit;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::inference::Language;

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
    let path = store.init().await?;
    presenter.success(&format!("Config file created at: {}", path.display()));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    let config = store.load().await?;
    let value = get_value(&config, key);
    presenter.output(value.as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, get_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(unknown_key(key))
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    }
}

fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim().to_string();
    match key {
        "api_key" => config.api_key = Some(value),
        "language" => config.language = Some(value),
        "max_duration" => config.max_duration = Some(value),
        "model_fast" => config.model_fast = Some(value),
        "model_reasoning" => config.model_reasoning = Some(value),
        "endpoint" => config.endpoint = Some(value),
        "precursors" => config.precursors = Some(parse_list(&value)),
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

/// Display value for a key; the API key is masked
fn get_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "api_key" => config.api_key.as_deref().map(mask_api_key),
        "language" => config.language.clone(),
        "max_duration" => config.max_duration.clone(),
        "model_fast" => config.model_fast.clone(),
        "model_reasoning" => config.model_reasoning.clone(),
        "endpoint" => config.endpoint.clone(),
        "precursors" => config.precursors.as_ref().map(|list| list.join(", ")),
        _ => None,
    }
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "language" => {
            value
                .parse::<Language>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "max_duration" => {
            value
                .parse::<CaptureLimit>()
                .map_err(|e| invalid(e.to_string()))?;
        }
        "model_fast" | "model_reasoning" | "api_key" => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
        }
        "endpoint" => {
            if !(value.starts_with("https://") || value.starts_with("http://")) {
                return Err(invalid("Value must be an http(s) URL".to_string()));
            }
        }
        "precursors" => {
            if parse_list(value).is_empty() {
                return Err(invalid(
                    "Value must be a comma-separated list of precursor names".to_string(),
                ));
            }
        }
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}

/// Split a comma-separated list, dropping blanks
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;
    use tempfile::TempDir;

    #[test]
    fn mask_api_key_long() {
        assert_eq!(mask_api_key("abcdefghijklmnop"), "abcd...mnop");
    }

    #[test]
    fn mask_api_key_short() {
        assert_eq!(mask_api_key("short"), "*****");
    }

    #[test]
    fn validate_language() {
        assert!(validate_config_value("language", "en").is_ok());
        assert!(validate_config_value("language", "zh").is_ok());
        assert!(validate_config_value("language", "fr").is_err());
    }

    #[test]
    fn validate_max_duration() {
        assert!(validate_config_value("max_duration", "30s").is_ok());
        assert!(validate_config_value("max_duration", "2m30s").is_ok());
        assert!(validate_config_value("max_duration", "soon").is_err());
        assert!(validate_config_value("max_duration", "90m").is_err());
    }

    #[test]
    fn validate_endpoint() {
        assert!(validate_config_value("endpoint", "http://localhost:8080").is_ok());
        assert!(validate_config_value("endpoint", "localhost").is_err());
    }

    #[test]
    fn validate_precursors() {
        assert!(validate_config_value("precursors", "TMA, TiCl4").is_ok());
        assert!(validate_config_value("precursors", " , ").is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(validate_config_value("duration", "30s").is_err());
        assert!(check_key("domain").is_err());
    }

    #[test]
    fn precursors_round_trip_through_list() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "precursors", "TMA,  TiCl4 ,,DEZ").unwrap();
        assert_eq!(
            config.precursors,
            Some(vec!["TMA".to_string(), "TiCl4".to_string(), "DEZ".to_string()])
        );
        assert_eq!(
            get_value(&config, "precursors").as_deref(),
            Some("TMA, TiCl4, DEZ")
        );
    }

    #[tokio::test]
    async fn set_persists_to_store() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        handle_config_command(
            ConfigAction::Set {
                key: "language".into(),
                value: "en".into(),
            },
            &store,
            &presenter,
        )
        .await
        .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn invalid_set_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        let result = handle_config_command(
            ConfigAction::Set {
                key: "max_duration".into(),
                value: "forever".into(),
            },
            &store,
            &presenter,
        )
        .await;

        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
        assert!(!store.exists());
    }
}
