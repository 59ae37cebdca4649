//! Configuration.
//!
//! Two layers, resolved once at startup:
//!
//! - **File config** (`config/{env}.yaml`): logging, gateway bind address,
//!   ledger path, wallet backend and transfer defaults. A missing file
//!   falls back to defaults; a malformed file is fatal.
//! - **Environment config**: key material and chain addresses. Every value
//!   the selected backend needs is required; absence or a malformed value
//!   aborts startup before the listener binds.

use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

use crate::money::{self, MoneyError};
use crate::wallet::{TonAddress, WalletKey};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(&'static str),

    #[error("invalid {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("failed to parse config file {path}: {source}")]
    MalformedFile {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config value {name}: {source}")]
    InvalidValue {
        name: &'static str,
        #[source]
        source: MoneyError,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub ledger: LedgerConfig,
    pub wallet: WalletSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
            log_file: "reward-server.log".to_string(),
            use_json: false,
            rotation: "daily".to_string(),
            gateway: GatewayConfig::default(),
            ledger: LedgerConfig::default(),
            wallet: WalletSettings::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LedgerConfig {
    /// Append-only JSON transaction log, created empty at first startup.
    pub path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: "data/transactions.json".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WalletBackend {
    /// In-process deterministic wallet, no network. Dev/test default.
    Simulated,
    /// Real JSON-RPC reads against a toncenter v2 endpoint.
    Toncenter,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct WalletSettings {
    pub backend: WalletBackend,
    /// Gas attached to a jetton transfer, human units.
    pub attached_fee_ton: String,
    /// Coins forwarded to the recipient with the transfer notification.
    pub forward_ton: String,
    /// Token symbol used in transfer comments and client messages.
    pub token_symbol: String,
    /// Starting balance of the simulated backend, human units.
    pub simulated_balance_ton: String,
}

impl Default for WalletSettings {
    fn default() -> Self {
        Self {
            backend: WalletBackend::Simulated,
            attached_fee_ton: "0.05".to_string(),
            forward_ton: "0.02".to_string(),
            token_symbol: "RPG".to_string(),
            simulated_balance_ton: "100".to_string(),
        }
    }
}

impl WalletSettings {
    pub fn fee_nano(&self) -> Result<u64, ConfigError> {
        money::parse_nano(&self.attached_fee_ton).map_err(|source| ConfigError::InvalidValue {
            name: "wallet.attached_fee_ton",
            source,
        })
    }

    pub fn forward_nano(&self) -> Result<u64, ConfigError> {
        money::parse_nano(&self.forward_ton).map_err(|source| ConfigError::InvalidValue {
            name: "wallet.forward_ton",
            source,
        })
    }

    pub fn simulated_balance_nano(&self) -> Result<u128, ConfigError> {
        money::parse_nano(&self.simulated_balance_ton)
            .map(u128::from)
            .map_err(|source| ConfigError::InvalidValue {
                name: "wallet.simulated_balance_ton",
                source,
            })
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`. Missing file → defaults; malformed file →
    /// fatal.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        match fs::read_to_string(&config_path) {
            Ok(content) => {
                serde_yaml::from_str(&content).map_err(|source| ConfigError::MalformedFile {
                    path: config_path,
                    source,
                })
            }
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Environment-provided secrets and chain addresses.
///
/// The deployment contract of the original service, unchanged: the signing
/// seed and the hot wallet address are always required; the RPC endpoint
/// only when the toncenter backend is selected; the pre-resolved jetton
/// wallet only when that backend also has a token master configured.
#[derive(Debug)]
pub struct EnvConfig {
    pub wallet_key: WalletKey,
    pub wallet_address: TonAddress,
    pub rpc_url: Option<String>,
    pub rpc_api_key: Option<String>,
    pub jetton_master: Option<TonAddress>,
    pub jetton_wallet: Option<TonAddress>,
}

impl EnvConfig {
    pub fn from_env(backend: WalletBackend) -> Result<Self, ConfigError> {
        Self::from_vars(backend, &|name| std::env::var(name).ok())
    }

    /// Testable core of [`from_env`]: the lookup is injected so tests need
    /// not mutate process-global state.
    pub fn from_vars(
        backend: WalletBackend,
        var: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let key_b64 = require(var, "TON_PRIVATE_KEY")?;
        let wallet_key =
            WalletKey::from_base64(&key_b64).map_err(|e| ConfigError::InvalidVar {
                name: "TON_PRIVATE_KEY",
                reason: e.to_string(),
            })?;

        let address_text = require(var, "TON_WALLET_ADDRESS")?;
        let wallet_address =
            TonAddress::parse(&address_text).map_err(|e| ConfigError::InvalidVar {
                name: "TON_WALLET_ADDRESS",
                reason: e.to_string(),
            })?;

        let rpc_url = var("TONCENTER_RPC_URL").filter(|v| !v.trim().is_empty());
        if backend == WalletBackend::Toncenter && rpc_url.is_none() {
            return Err(ConfigError::MissingVar("TONCENTER_RPC_URL"));
        }

        let jetton_master = parse_optional_address(var, "JETTON_MASTER_ADDRESS")?;
        let jetton_wallet = parse_optional_address(var, "JETTON_WALLET_ADDRESS")?;

        // The toncenter backend cannot derive the service jetton wallet
        // itself; it must be resolved ahead of time and supplied.
        if backend == WalletBackend::Toncenter
            && jetton_master.is_some()
            && jetton_wallet.is_none()
        {
            return Err(ConfigError::MissingVar("JETTON_WALLET_ADDRESS"));
        }

        Ok(Self {
            wallet_key,
            wallet_address,
            rpc_url,
            rpc_api_key: var("TONCENTER_API_KEY").filter(|v| !v.trim().is_empty()),
            jetton_master,
            jetton_wallet,
        })
    }
}

fn require(
    var: &dyn Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    var(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn parse_optional_address(
    var: &dyn Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<TonAddress>, ConfigError> {
    match var(name).filter(|v| !v.trim().is_empty()) {
        None => Ok(None),
        Some(text) => TonAddress::parse(&text)
            .map(Some)
            .map_err(|e| ConfigError::InvalidVar {
                name,
                reason: e.to_string(),
            }),
    }
}
