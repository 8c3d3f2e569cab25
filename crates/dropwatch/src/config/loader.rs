use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| format!("{} at {}", e, e.instance_path()))
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.max_concurrent_jobs == 0 {
        return Err(ConfigError::Validation {
            message: "max_concurrent_jobs must be at least 1".to_string(),
        });
    }

    if config.stability.checks == 0 || config.stability.interval_secs == 0 {
        return Err(ConfigError::Validation {
            message: "stability checks and interval must be at least 1".to_string(),
        });
    }

    if config.folder.enabled && config.folder.handler.is_none() {
        return Err(ConfigError::Validation {
            message: "folder detection is enabled but no folder handler is configured".to_string(),
        });
    }

    if config.clipboard.youtube.enabled && config.clipboard.youtube.handler.is_none() {
        return Err(ConfigError::Validation {
            message: "clipboard.youtube is enabled but no handler is configured".to_string(),
        });
    }

    if config.clipboard.magnet.enabled && config.clipboard.magnet.handler.is_none() {
        return Err(ConfigError::Validation {
            message: "clipboard.magnet is enabled but no handler is configured".to_string(),
        });
    }

    Ok(())
}
