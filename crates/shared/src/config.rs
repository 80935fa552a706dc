//! Configuration management for the scraper.
//!
//! This module handles loading and parsing configuration from YAML files,
//! with sensible defaults for all settings. The config can supply default
//! MAL IDs and an output path when none are given on the command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default MAL IDs to scrape when none are given on the command line
    pub mal_ids: Vec<u32>,

    /// Output settings
    pub output: OutputConfig,

    /// Scraper settings
    pub scraper: ScraperConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file path
    pub path: String,

    /// Output format: "jsonl" (streaming) or "json" (whole array)
    pub format: String,
}

/// Scraper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,

    /// Maximum retries for transient failures
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds
    pub retry_delay_ms: u64,

    /// Maximum concurrent fetches
    pub concurrency: usize,

    /// Checkpoint settings
    pub checkpoint: CheckpointConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: f64,

    /// Maximum requests per minute
    pub requests_per_minute: u32,
}

/// Checkpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Checkpoint file path (None disables checkpointing)
    pub path: Option<String>,

    /// Save the checkpoint after every N successful records
    pub save_interval: usize,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mal_ids: Vec::new(),
            output: OutputConfig::default(),
            scraper: ScraperConfig::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "output/data.jsonl".to_string(),
            format: "jsonl".to_string(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            rate_limit: RateLimitConfig::default(),
            max_retries: 3,
            retry_delay_ms: 1000,
            concurrency: 5,
            checkpoint: CheckpointConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 2.0,
            requests_per_minute: 50,
        }
    }
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            path: None,
            save_interval: 10,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// If the file doesn't exist, returns the default configuration. A file
    /// that exists but fails to parse is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.mal_ids.is_empty());
        assert_eq!(config.output.path, "output/data.jsonl");
        assert_eq!(config.output.format, "jsonl");
        assert_eq!(config.scraper.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.scraper.rate_limit.requests_per_second, 2.0);
        assert_eq!(config.scraper.max_retries, 3);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");

        let mut original_config = Config::default();
        original_config.mal_ids = vec![52034, 58259];
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.mal_ids, vec![52034, 58259]);
        assert_eq!(
            loaded_config.scraper.base_url,
            original_config.scraper.base_url
        );

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.yaml").unwrap();
        // Should return default config without error
        assert!(config.mal_ids.is_empty());
    }

    #[test]
    fn test_partial_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(
            &config_path,
            "mal_ids: [1, 2, 3]\noutput:\n  path: custom/out.jsonl\n",
        )?;

        let config = Config::from_file(&config_path)?;
        assert_eq!(config.mal_ids, vec![1, 2, 3]);
        assert_eq!(config.output.path, "custom/out.jsonl");
        // Unspecified sections fall back to defaults
        assert_eq!(config.scraper.max_retries, 3);

        Ok(())
    }

    #[test]
    fn test_malformed_config_is_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "mal_ids: [not_a_number\n")?;

        assert!(Config::from_file(&config_path).is_err());

        Ok(())
    }
}
