use std::{env, net::SocketAddr};

use thiserror::Error;

use crate::protocol::SpecVersion;

#[derive(Debug, Clone)]
pub struct Config {
    pub spec_version: SpecVersion,
    pub bind_addr: String,
    pub bind_port: u16,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSONRPC_SPEC_VERSION must be 1.0 or 2.0")]
    InvalidSpecVersion,
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spec_version: SpecVersion::V2,
            bind_addr: "127.0.0.1".to_string(),
            bind_port: 8080,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let spec_version = env::var("JSONRPC_SPEC_VERSION")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<SpecVersion>()
                    .map_err(|_| ConfigError::InvalidSpecVersion)
            })
            .transpose()?
            .unwrap_or(defaults.spec_version);
        let bind_addr = env::var("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let bind_port = env::var("BIND_PORT")
            .ok()
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(defaults.bind_port);

        let config = Self {
            spec_version,
            bind_addr,
            bind_port,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}
