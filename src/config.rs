use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

use crate::transfer::SettlementPolicy;
use crate::wallet::balance::DEFAULT_MAX_CONFLICT_RETRIES;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    /// "never" | "hourly" | "daily"
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; in-memory store when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default)]
    pub settlement: SettlementConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Transfer settlement rules
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SettlementConfig {
    /// Reject status updates on DENIED transfers
    #[serde(default = "default_denied_is_terminal")]
    pub denied_is_terminal: bool,
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,
}

fn default_denied_is_terminal() -> bool {
    true
}

fn default_max_conflict_retries() -> u32 {
    DEFAULT_MAX_CONFLICT_RETRIES
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            denied_is_terminal: default_denied_is_terminal(),
            max_conflict_retries: default_max_conflict_retries(),
        }
    }
}

impl SettlementConfig {
    pub fn policy(&self) -> SettlementPolicy {
        SettlementPolicy {
            denied_is_terminal: self.denied_is_terminal,
            max_conflict_retries: self.max_conflict_retries,
        }
    }
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", config_path))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: wallets.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
"#;

    #[test]
    fn test_settlement_defaults() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert!(config.postgres_url.is_none());
        assert!(config.settlement.denied_is_terminal);
        assert_eq!(config.settlement.max_conflict_retries, 3);
        assert_eq!(config.settlement.policy(), SettlementPolicy::default());
    }

    #[test]
    fn test_settlement_overrides() {
        let yaml = format!(
            "{MINIMAL}postgres_url: postgresql://localhost/wallets\nsettlement:\n  denied_is_terminal: false\n"
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgresql://localhost/wallets")
        );
        let policy = config.settlement.policy();
        assert!(!policy.denied_is_terminal);
        assert_eq!(policy.max_conflict_retries, 3);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(AppConfig::load("no-such-env").is_err());
    }
}
