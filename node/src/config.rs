//! Governor configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use quorum_types::{Address, GovernorParams, TokenAmount};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a governance node.
///
/// Loaded from a TOML file via [`GovernorConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Everything but `owner` has a default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Initial token owner (the only account allowed to mint).
    pub owner: Address,

    /// Account allowed to cancel any pending or active proposal.
    #[serde(default)]
    pub guardian: Option<Address>,

    /// Governance parameters.
    #[serde(default)]
    pub params: GovernorParams,

    /// Address of the treasury that pays out executed proposals.
    #[serde(default = "default_treasury")]
    pub treasury: Address,

    /// Native value the treasury starts with.
    #[serde(default)]
    pub treasury_funds: TokenAmount,

    /// Addresses at which parameter-store contracts are deployed.
    #[serde(default)]
    pub parameter_stores: Vec<Address>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Capacity of the request queue in front of the engine.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Events a slow subscriber may fall behind before it starts missing some.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_treasury() -> Address {
    Address::from_low_u64(0x7ea5)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_command_buffer() -> usize {
    256
}

fn default_event_buffer() -> usize {
    1024
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GovernorConfig {
    /// A configuration with every default and the given owner.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            guardian: None,
            params: GovernorParams::default(),
            treasury: default_treasury(),
            treasury_funds: TokenAmount::ZERO,
            parameter_stores: Vec::new(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            command_buffer: default_command_buffer(),
            event_buffer: default_event_buffer(),
        }
    }

    /// Load and validate configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        self.params
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        if self.owner.is_zero() {
            return Err(NodeError::Config("owner must not be the zero address".into()));
        }
        if self.command_buffer == 0 || self.event_buffer == 0 {
            return Err(NodeError::Config("channel buffers must be non-zero".into()));
        }
        Ok(())
    }
}
