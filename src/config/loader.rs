//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", format_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Listening port from the `PORT` environment variable, if set and numeric.
pub fn port_from_env() -> Option<u16> {
    std::env::var("PORT").ok()?.parse().ok()
}

/// Replace the port portion of the configured bind address.
pub fn override_port(config: &mut GatewayConfig, port: u16) {
    let host = config
        .listener
        .bind_address
        .rsplit_once(':')
        .map(|(host, _)| host)
        .unwrap_or("0.0.0.0");
    config.listener.bind_address = format!("{host}:{port}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_port() {
        let mut config = GatewayConfig::default();
        override_port(&mut config, 8123);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8123");

        config.listener.bind_address = "127.0.0.1:5000".to_string();
        override_port(&mut config, 9000);
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_minimal_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [[routes]]
            prefix = "/user"
            target = "http://localhost:4000/user"
            requires_auth = true
            "#,
        )
        .unwrap();
        assert_eq!(config.routes.len(), 1);
        assert!(config.routes[0].requires_auth);
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
        assert!(validate_config(&config).is_ok());
    }
}
