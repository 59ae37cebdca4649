//! Wire types for the HTTP surface.
//!
//! Every response carries an `ok` boolean; failure bodies add a
//! human-readable `error` string and nothing else. Internal error types
//! never serialize past this boundary.

use serde::Serialize;
use utoipa::ToSchema;

/// Liveness payload for `GET /`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub ok: bool,
    /// Service name
    #[schema(example = "ton-reward-server")]
    pub service: String,
    /// Build identifier (git hash at compile time)
    #[schema(example = "a1b2c3d")]
    pub version: String,
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
}

/// `GET /balance` payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Service hot wallet address
    pub address: String,
    /// Formatted balance, e.g. `"12.5 TON"`
    #[schema(example = "12.5 TON")]
    pub balance: String,
}

/// Successful reward response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RewardResponse {
    pub ok: bool,
    /// Broadcast reference. Best-effort: the literal `"sent"` when the
    /// backend yields no verifiable hash.
    #[schema(example = "sent")]
    pub tx: String,
    #[schema(example = "Sent 100 RPG to EQAbc...")]
    pub message: String,
}

/// Uniform failure body for 4xx/5xx responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub ok: bool,
    /// Human-readable description, never raw internals
    #[schema(example = "Invalid TON address format")]
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}
