//! Runtime configuration.
//!
//! Loaded from a JSON file (`config.json` by default), with the
//! wallet-connect project identifier overridable via the
//! `WALLETCONNECT_PROJECT_ID` environment variable. A missing project id is
//! fatal at startup: the wallet-connect integration refuses to initialize
//! without it.

use serde::{ Deserialize, Serialize };
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::errors::{ Error, Result };

pub const PROJECT_ID_ENV: &str = "WALLETCONNECT_PROJECT_ID";

/// Application metadata forwarded to the wallet-connect session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub url: String,
    pub icon: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Swapdesk SDK Example".to_string(),
            description: "Swap SDK terminal integration example".to_string(),
            url: "https://swapdesk.example/sdk-demo".to_string(),
            icon: "https://swapdesk.example/sdk-demo/favicon.svg".to_string(),
        }
    }
}

/// Runtime configuration loaded from config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Required wallet-connect project identifier.
    #[serde(default)]
    pub wallet_connect_project_id: String,

    /// Base URL of the swap SDK HTTP API (token lists and route finding).
    #[serde(default = "default_sdk_base_url")]
    pub sdk_base_url: String,

    /// JSON-RPC endpoint of the connected wallet bridge. The bridge holds
    /// the keys; this app only submits `eth_sendTransaction` requests to it.
    #[serde(default = "default_wallet_rpc_url")]
    pub wallet_rpc_url: String,

    /// Per-chain RPC URL overrides (chain id -> url). Chains without an
    /// override use the built-in public endpoint.
    #[serde(default)]
    pub rpc_url_overrides: HashMap<u64, String>,

    #[serde(default)]
    pub metadata: AppMetadata,

    /// HTTP timeout for SDK and RPC calls.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_sdk_base_url() -> String {
    "https://api.swapdesk.example/v1".to_string()
}

fn default_wallet_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet_connect_project_id: String::new(),
            sdk_base_url: default_sdk_base_url(),
            wallet_rpc_url: default_wallet_rpc_url(),
            rpc_url_overrides: HashMap::new(),
            metadata: AppMetadata::default(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Config {
    /// Read the config file, apply environment overrides and validate.
    /// A missing file is tolerated (all defaults + env); a missing project
    /// id is not.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let mut config = if path.as_ref().exists() {
            let data = fs::read_to_string(&path)?;
            serde_json::from_str::<Config>(&data)?
        } else {
            Config::default()
        };

        if let Ok(project_id) = env::var(PROJECT_ID_ENV) {
            if !project_id.trim().is_empty() {
                config.wallet_connect_project_id = project_id.trim().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.wallet_connect_project_id.trim().is_empty() {
            return Err(
                Error::Config(
                    format!(
                        "wallet-connect project id is required (set {} or wallet_connect_project_id in config.json)",
                        PROJECT_ID_ENV
                    )
                )
            );
        }
        url::Url::parse(&self.sdk_base_url).map_err(|e|
            Error::Config(format!("invalid sdk_base_url: {}", e))
        )?;
        url::Url::parse(&self.wallet_rpc_url).map_err(|e|
            Error::Config(format!("invalid wallet_rpc_url: {}", e))
        )?;
        Ok(())
    }

    /// RPC endpoint to use for read calls on the given chain.
    pub fn rpc_url(&self, chain: crate::chains::Chain) -> String {
        self.rpc_url_overrides
            .get(&chain.id())
            .cloned()
            .unwrap_or_else(|| chain.info().rpc_url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::Chain;

    #[test]
    fn test_missing_project_id_is_fatal() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_valid_config() {
        let config = Config {
            wallet_connect_project_id: "abcdef0123456789".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rpc_override() {
        let mut config = Config::default();
        assert_eq!(config.rpc_url(Chain::Polygon), Chain::Polygon.info().rpc_url);

        config.rpc_url_overrides.insert(137, "https://rpc.example/polygon".to_string());
        assert_eq!(config.rpc_url(Chain::Polygon), "https://rpc.example/polygon");
        assert_eq!(config.rpc_url(Chain::Arbitrum), Chain::Arbitrum.info().rpc_url);
    }

    #[test]
    fn test_config_file_parsing() {
        let json = r#"{
            "wallet_connect_project_id": "pid",
            "sdk_base_url": "https://api.example/v1",
            "rpc_url_overrides": { "42161": "https://rpc.example/arb" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.wallet_connect_project_id, "pid");
        assert_eq!(config.sdk_base_url, "https://api.example/v1");
        assert_eq!(config.timeout_seconds, 15);
        assert_eq!(config.rpc_url(Chain::Arbitrum), "https://rpc.example/arb");
    }
}
