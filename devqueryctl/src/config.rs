//! CLI configuration management
//!
//! Handles loading the optional configuration file and layering environment
//! variables and command-line flags over it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding the server URL
pub const ENV_URL: &str = "DEVQUERY_URL";
/// Environment variable overriding the login name
pub const ENV_USER: &str = "DEVQUERY_USER";
/// Environment variable overriding the password
pub const ENV_PASSWORD: &str = "DEVQUERY_PASSWORD";
/// Environment variable overriding the request timeout in seconds
pub const ENV_TIMEOUT: &str = "DEVQUERY_TIMEOUT";
/// Environment variable enabling verbose logging
pub const ENV_VERBOSE: &str = "DEVQUERY_VERBOSE";

/// Largest accepted request timeout in seconds
pub const MAX_TIMEOUT_SECS: u64 = 300;

/// CLI configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Server base URL
    pub server_url: String,

    /// Login name for HTTP Basic authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for HTTP Basic authentication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Enable verbose logging by default
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8889".to_string(),
            username: None,
            password: None,
            timeout: 30,
            verbose: false,
        }
    }
}

impl std::fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliConfig")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl CliConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Get the default configuration file path
    ///
    /// `<config dir>/devquery/config.toml`, e.g. `~/.config/devquery/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("devquery").join("config.toml"))
    }

    /// Request timeout as a duration
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout)
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Apply the layers in that order. File values only fill fields that are
/// still unset; environment and CLI values overwrite.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    server_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout: Option<u64>,
    verbose: Option<bool>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set server URL (with validation)
    pub fn with_server_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        Self::validate_url(&url)?;
        self.server_url = Some(url);
        Ok(self)
    }

    /// Set login name
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set timeout (with validation)
    pub fn with_timeout(mut self, timeout: u64) -> Result<Self> {
        Self::validate_timeout(timeout)?;
        self.timeout = Some(timeout);
        Ok(self)
    }

    /// Load configuration from file
    ///
    /// An explicitly given path must exist and parse. The default path is
    /// optional: a missing or broken default file is skipped.
    pub fn with_config_file(self, explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => CliConfig::load(path)?,
            None => {
                let Some(path) = CliConfig::default_path() else {
                    return Ok(self);
                };
                if !path.exists() {
                    return Ok(self);
                }
                match CliConfig::load(&path) {
                    Ok(config) => config,
                    Err(e) => {
                        debug!("Ignoring default config file: {:#}", e);
                        return Ok(self);
                    }
                }
            }
        };

        Ok(self.merge_file(config))
    }

    // Only use file values if they weren't already set (preserving priority)
    fn merge_file(self, config: CliConfig) -> Self {
        Self {
            server_url: self.server_url.or(Some(config.server_url)),
            username: self.username.or(config.username),
            password: self.password.or(config.password),
            timeout: self.timeout.or(Some(config.timeout)),
            verbose: self.verbose.or(Some(config.verbose)),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Set variables overwrite earlier layers. A URL or timeout that fails
    /// validation is an error naming the variable.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(server_url) = std::env::var(ENV_URL) {
            Self::validate_url(&server_url).with_context(|| format!("Invalid {}", ENV_URL))?;
            self.server_url = Some(server_url);
        }

        if let Ok(username) = std::env::var(ENV_USER) {
            self.username = Some(username);
        }

        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            self.password = Some(password);
        }

        if let Ok(timeout) = std::env::var(ENV_TIMEOUT) {
            let timeout: u64 = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid {}: '{}'", ENV_TIMEOUT, timeout))?;
            Self::validate_timeout(timeout).with_context(|| format!("Invalid {}", ENV_TIMEOUT))?;
            self.timeout = Some(timeout);
        }

        if let Ok(verbose) = std::env::var(ENV_VERBOSE) {
            self.verbose = Some(verbose.to_lowercase() == "true" || verbose == "1");
        }

        Ok(self)
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let server_url = self.server_url.unwrap_or(defaults.server_url);
        let timeout = self.timeout.unwrap_or(defaults.timeout);

        // Validate final values
        Self::validate_url(&server_url)?;
        Self::validate_timeout(timeout)?;

        Ok(CliConfig {
            server_url,
            username: self.username,
            password: self.password,
            timeout,
            verbose: self.verbose.unwrap_or(defaults.verbose),
        })
    }

    /// Validate URL format
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(anyhow::anyhow!("Server URL cannot be empty"));
        }

        crate::client::parse_base_url(url)?;

        Ok(())
    }

    /// Validate timeout value
    fn validate_timeout(timeout: u64) -> Result<()> {
        if timeout == 0 {
            return Err(anyhow::anyhow!("Timeout must be greater than 0"));
        }

        if timeout > MAX_TIMEOUT_SECS {
            return Err(anyhow::anyhow!(
                "Timeout must be less than or equal to {} seconds",
                MAX_TIMEOUT_SECS
            ));
        }

        Ok(())
    }
}
