use std::fs;
use tracing::{debug, error, info, warn};

use crate::types::server_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

/// Like [`load_config`], but a missing file falls back to the built-in
/// defaults (still validated, so the secret key must come from the
/// environment in that case).
pub fn load_or_default(path: &str) -> Result<AppConfig, ConfigError> {
    if std::path::Path::new(path).exists() {
        load_config(path)
    } else {
        warn!("Config file {} not found, using built-in defaults", path);
        let config = AppConfig::default();
        validate_config(&config)?;
        Ok(config)
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.bind.is_empty() {
        return Err(ConfigError::InvalidConfig("bind cannot be empty".into()));
    }

    if config.server.port == 0 {
        return Err(ConfigError::InvalidConfig(
            "port must be greater than 0".into(),
        ));
    }

    if config.server.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    if config.auth.session_expiry_minutes == 0 {
        return Err(ConfigError::InvalidConfig(
            "session_expiry_minutes must be greater than 0".into(),
        ));
    }

    if config.auth.activation_expiry_secs <= 0 {
        return Err(ConfigError::InvalidConfig(
            "activation_expiry_secs must be greater than 0".into(),
        ));
    }

    if config.auth.max_login_failures == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_login_failures must be greater than 0".into(),
        ));
    }

    if config.auth.failure_window_secs <= 0 {
        return Err(ConfigError::InvalidConfig(
            "failure_window_secs must be greater than 0".into(),
        ));
    }

    if config.storage.db_path.is_empty() {
        return Err(ConfigError::InvalidConfig("db_path cannot be empty".into()));
    }

    if config.mail.admin_email.is_empty() || config.mail.base_url.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "admin_email and base_url cannot be empty".into(),
        ));
    }

    // The sealing key must resolve (env var or config field) and carry at
    // least 32 bytes of material.
    match config.auth.resolved_secret_key() {
        None => {
            return Err(ConfigError::InvalidConfig(
                "secret_key must be set via the REVIEW_SECRET_KEY env var or auth.secret_key config field"
                    .into(),
            ));
        }
        Some(secret) if secret.len() < 32 => {
            return Err(ConfigError::InvalidConfig(
                "secret_key must be at least 32 characters long".into(),
            ));
        }
        _ => {}
    }

    Ok(())
}
