//! Configuration management for RAX chat server
//!
//! Settings are layered: built-in defaults, then an optional `config.toml`,
//! then environment variables prefixed with `RAX_CHAT` (e.g. `RAX_CHAT_PORT`).

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// IP address the chat listener binds to
    pub bind_address: String,

    /// TCP port for client connections (0 picks an ephemeral port)
    pub port: u16,

    /// Maximum concurrent connections held in the registry
    pub max_clients: usize,

    /// Longest accepted command line in bytes
    pub max_line_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 2323,
            max_clients: 64,
            max_line_length: 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the named file (extension optional) with environment overrides.
    /// A missing file is not an error; defaults fill every key it does not set.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address.as_str())?
            .set_default("port", i64::from(defaults.port))?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("max_line_length", defaults.max_line_length as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("RAX_CHAT"))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::Message("bind_address cannot be empty".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_line_length == 0 {
            return Err(ConfigError::Message(
                "max_line_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
