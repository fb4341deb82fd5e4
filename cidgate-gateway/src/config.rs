//! Gateway configuration
//!
//! Supports loading from TOML files and environment variables, with CLI
//! overrides applied last.

use cidgate_core::{DEFAULT_CACHE_CAPACITY, DEFAULT_CHUNK_SIZE};
use cidgate_naming::{Address, TxnAuth};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Development signing address used when none is configured
const DEV_SIGNER_ADDRESS: &str = "0x2da1b24f24b2a0633d57a4c5e8a09e795d0d1d5e";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    /// Size in bytes of content chunks
    pub chunk_size: usize,

    /// Capacity in entries of the name resolution cache
    pub cache_capacity: usize,

    /// Path to the block store directory
    pub block_store_path: PathBuf,

    /// HTTP listen address
    pub http_addr: String,

    /// Chain identifier for naming transactions
    pub chain_id: u64,

    /// Hex address the gateway publishes names as
    pub signer_address: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            block_store_path: PathBuf::from("./data/blocks"),
            http_addr: "0.0.0.0:8080".to_string(),
            chain_id: 1337,
            signer_address: DEV_SIGNER_ADDRESS.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<usize>("CIDGATE_CHUNK_SIZE") {
            self.chunk_size = v;
        }
        if let Some(v) = env_parse::<usize>("CIDGATE_CACHE_CAPACITY") {
            self.cache_capacity = v;
        }
        if let Ok(v) = std::env::var("CIDGATE_BLOCK_STORE_PATH") {
            self.block_store_path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("CIDGATE_HTTP_ADDR") {
            self.http_addr = v;
        }
        if let Some(v) = env_parse::<u64>("CIDGATE_CHAIN_ID") {
            self.chain_id = v;
        }
        if let Ok(v) = std::env::var("CIDGATE_SIGNER_ADDRESS") {
            self.signer_address = v;
        }
        self
    }

    /// Override config with CLI arguments
    pub fn with_overrides(
        mut self,
        block_store_path: Option<PathBuf>,
        http_addr: Option<String>,
    ) -> Self {
        if let Some(path) = block_store_path {
            self.block_store_path = path;
        }
        if let Some(addr) = http_addr {
            self.http_addr = addr;
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "chunk_size must be positive".to_string(),
            ));
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "cache_capacity must be positive".to_string(),
            ));
        }
        self.signer()?;
        Ok(())
    }

    /// The transaction authorization the gateway signs publishes with
    pub fn signer(&self) -> Result<TxnAuth, ConfigError> {
        let address = Address::from_hex(&self.signer_address).map_err(|e| {
            ConfigError::ValidationError(format!("invalid signer_address: {}", e))
        })?;
        if address.is_zero() {
            return Err(ConfigError::ValidationError(
                "signer_address cannot be the zero address".to_string(),
            ));
        }
        Ok(TxnAuth::new(address, self.chain_id))
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
