//! Configuration management for Bookshelf server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

/// Shortest accepted length for generated book ids
pub const MIN_ID_LENGTH: usize = 8;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BooksConfig {
    /// Length of generated book ids
    pub id_length: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub books: BooksConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. BOOKSHELF_BOOKS__ID_LENGTH
            .add_source(
                Environment::with_prefix("BOOKSHELF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.books.id_length < MIN_ID_LENGTH {
            return Err(ConfigError::Message(format!(
                "books.id_length must be at least {}, got {}",
                MIN_ID_LENGTH, self.books.id_length
            )));
        }
        Ok(())
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self { id_length: 16 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.books.id_length, 16);
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_id_length_rejected() {
        for length in [0, 1, MIN_ID_LENGTH - 1] {
            let config: AppConfig = Config::builder()
                .set_override("books.id_length", length as i64)
                .unwrap()
                .build()
                .unwrap()
                .try_deserialize()
                .unwrap();

            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("books.id_length"));
        }

        let config = AppConfig {
            books: BooksConfig {
                id_length: MIN_ID_LENGTH,
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("server.host", "127.0.0.1")
            .unwrap()
            .set_override("server.port", 8081)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.books.id_length, 16);
    }
}
