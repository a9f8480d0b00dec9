//! Configuration management for the itinerary generator
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings. The API key is
//! not read here; see [`crate::credentials`].

use crate::AppError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "ITINERAI_CONFIG";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Generative-language API settings
    pub generation: GenerationConfig,
    /// HTTP server settings
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Generative-language API settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model identifier
    pub model: String,
    /// Base URL of the API, without the `/models/...` suffix
    pub base_url: String,
    /// Name of the secret holding the API key
    pub api_key_name: String,
    /// API key fallback when the secret is not in the environment
    pub api_key: Option<String>,
    /// Transport timeout; unset means the HTTP client default
    pub timeout_seconds: Option<u64>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body
    pub max_body_bytes: usize,
    /// Serve HTTPS when set (requires the `tls` feature)
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_name() -> String {
    "GOOGLE_API_KEY".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_name: default_api_key_name(),
            api_key: None,
            timeout_seconds: None,
        }
    }
}

// api_key is redacted
impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key_name", &self.api_key_name)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            tls: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from_path(path)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // ITINERAI_SERVER__PORT=9000 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix("ITINERAI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("itinerai").join("config.toml"))
    }

    /// Replace blank strings with their defaults
    pub fn apply_defaults(&mut self) {
        if self.generation.model.is_empty() {
            self.generation.model = default_model();
        }
        if self.generation.base_url.is_empty() {
            self.generation.base_url = default_base_url();
        }
        if self.generation.api_key_name.is_empty() {
            self.generation.api_key_name = default_api_key_name();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_generation()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_generation(&self) -> Result<()> {
        let generation = &self.generation;

        if !generation.base_url.starts_with("http://") && !generation.base_url.starts_with("https://")
        {
            return Err(AppError::general(
                "Generation API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if generation.model.contains('/') || generation.model.contains(char::is_whitespace) {
            return Err(AppError::general(format!(
                "Invalid model identifier '{}'",
                generation.model
            ))
            .into());
        }

        if let Some(api_key) = &generation.api_key {
            if api_key.trim().is_empty() {
                return Err(AppError::general(
                    "generation.api_key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if let Some(timeout) = self.generation.timeout_seconds {
            if timeout == 0 || timeout > 600 {
                return Err(AppError::general(
                    "Generation timeout must be between 1 and 600 seconds",
                )
                .into());
            }
        }

        if self.server.port == 0 {
            return Err(AppError::general("Server port cannot be 0").into());
        }

        if self.server.max_body_bytes > 10 * 1024 * 1024 {
            return Err(AppError::general("Request body limit cannot exceed 10 MB").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AppError::general(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AppError::general(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.generation.model, "gemini-2.5-flash-lite");
        assert_eq!(
            config.generation.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.generation.api_key_name, "GOOGLE_API_KEY");
        assert!(config.generation.api_key.is_none());
        assert!(config.generation.timeout_seconds.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_invalid_base_url() {
        let mut config = AppConfig::default();
        config.generation.base_url = "generativelanguage.googleapis.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("HTTP or HTTPS"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AppConfig::default();
        config.generation.timeout_seconds = Some(0);
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn test_config_validation_empty_api_key() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = AppConfig::default();
        config.generation.model.clear();
        config.logging.format.clear();
        config.apply_defaults();
        assert_eq!(config.generation.model, "gemini-2.5-flash-lite");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mut config = AppConfig::default();
        config.generation.api_key = Some("very-secret-key".to_string());
        assert!(!format!("{config:?}").contains("very-secret-key"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!("itinerai-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[generation]\nmodel = \"gemini-test\"\n\n[server]\nport = 9191\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let config = AppConfig::load_from_path(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.generation.model, "gemini-test");
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.logging.format, "json");
        // untouched sections keep their defaults
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.generation.api_key_name, "GOOGLE_API_KEY");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AppConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("itinerai"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
