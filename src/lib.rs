//! TON Reward Server
//!
//! An HTTP backend that accepts reward requests and forwards token
//! transfers to a TON wallet, recording every attempt in an append-only
//! transaction log.
//!
//! # Modules
//!
//! - [`money`] - human-unit ↔ nano-unit conversion
//! - [`wallet`] - the external wallet capability behind one fixed trait
//! - [`reward`] - Validator → Executor → Ledger flow
//! - [`ledger`] - append-only transfer record store
//! - [`gateway`] - axum HTTP surface
//! - [`config`] - file + environment configuration

pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod reward;
pub mod wallet;

// Convenient re-exports at crate root
pub use config::{AppConfig, ConfigError, EnvConfig, WalletBackend};
pub use ledger::{StorageError, TransferLedger, TransferRecord, TransferStatus};
pub use reward::{
    RawRewardRequest, RewardService, TransferExecutor, TransferOutcome, TransferRequest,
    ValidationError,
};
pub use wallet::{TonAddress, WalletError, WalletHandle, WalletKey, WalletSdk};
