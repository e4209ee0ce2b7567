//! Configuration for the Transaction Submission Subsystem

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Collect timeout must be greater than zero")]
    ZeroCollectTimeout,

    #[error("Quorum percentage must be within 1..=100, got {0}")]
    InvalidQuorumPercent(u8),
}

/// Quorum rule applied to collected endorsements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum QuorumConfig {
    /// Every endorsement must succeed
    #[default]
    Unanimous,
    /// At least `min_percent` of endorsements must succeed
    Threshold { min_percent: u8 },
}

/// How the broadcaster picks an orderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrdererSelection {
    #[default]
    Random,
    RoundRobin,
    FirstHealthy,
}

impl OrdererSelection {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "round_robin" | "round-robin" => Some(Self::RoundRobin),
            "first_healthy" | "first-healthy" => Some(Self::FirstHealthy),
            _ => None,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Submission configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Bound on the wait for endorsements (milliseconds)
    pub collect_timeout_ms: u64,
    pub quorum: QuorumConfig,
    pub orderer_selection: OrdererSelection,
    pub logging: LoggingConfig,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            collect_timeout_ms: 15_000,
            quorum: QuorumConfig::Unanimous,
            orderer_selection: OrdererSelection::Random,
            logging: LoggingConfig::default(),
        }
    }
}

impl SubmissionConfig {
    /// Defaults overridden by `QC_*` environment variables, then validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self::overridden(lookup);
        config.validate()?;
        Ok(config)
    }

    fn overridden(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("QC_COLLECT_TIMEOUT_MS") {
            match value.parse() {
                Ok(ms) => config.collect_timeout_ms = ms,
                Err(_) => warn!(%value, "Ignoring invalid QC_COLLECT_TIMEOUT_MS"),
            }
        }
        if let Some(value) = lookup("QC_QUORUM_MIN_PERCENT") {
            match value.parse() {
                Ok(min_percent) => config.quorum = QuorumConfig::Threshold { min_percent },
                Err(_) => warn!(%value, "Ignoring invalid QC_QUORUM_MIN_PERCENT"),
            }
        }
        if let Some(value) = lookup("QC_ORDERER_SELECTION") {
            match OrdererSelection::parse(&value) {
                Some(selection) => config.orderer_selection = selection,
                None => warn!(%value, "Ignoring unknown QC_ORDERER_SELECTION"),
            }
        }
        if let Some(level) = lookup("QC_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(value) = lookup("QC_LOG_JSON") {
            config.logging.json = matches!(value.as_str(), "1" | "true" | "yes");
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collect_timeout_ms == 0 {
            return Err(ConfigError::ZeroCollectTimeout);
        }
        if let QuorumConfig::Threshold { min_percent } = self.quorum {
            if min_percent == 0 || min_percent > 100 {
                return Err(ConfigError::InvalidQuorumPercent(min_percent));
            }
        }
        Ok(())
    }

    pub fn collect_timeout(&self) -> Duration {
        Duration::from_millis(self.collect_timeout_ms)
    }
}
