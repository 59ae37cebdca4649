//! Wallet boundary — the external wallet/Jetton capability.
//!
//! The signing/broadcast SDK is an external collaborator. This module pins
//! it behind one fixed capability interface ([`WalletSdk`]) resolved once at
//! process start, instead of probing SDK surfaces per request:
//!
//! - [`simulated::SimulatedWallet`] — deterministic backend for dev/test
//! - [`toncenter::ToncenterWallet`] — real JSON-RPC reads against toncenter
//!
//! # Safety Invariants
//!
//! 1. One `WalletHandle` per process, created in `main`, never re-created
//! 2. The "fetch seqno → broadcast" critical section is serialized by the
//!    executor, not here; backends stay lock-free
//! 3. Broadcast references are best-effort: `None` when the backend cannot
//!    supply a verifiable hash — never a fabricated one

pub mod address;
pub mod simulated;
pub mod toncenter;

use async_trait::async_trait;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use serde::Serialize;
use thiserror::Error;

pub use address::{AddressParseError, TonAddress};

/// Shared handle to the wallet capability, created once at startup.
pub type WalletHandle = std::sync::Arc<dyn WalletSdk>;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("RPC endpoint rejected the call: {code} {message}")]
    Api { code: i64, message: String },

    #[error("unexpected RPC response: {0}")]
    InvalidResponse(String),

    #[error("jetton wallet address is not configured for this backend")]
    JettonWalletUnresolved,
}

/// Everything the executor hands to the wallet for one transfer.
#[derive(Debug, Clone, Serialize)]
pub struct TransferInstruction {
    /// Where the outgoing message is addressed: the recipient for a plain
    /// coin transfer, the service's own jetton wallet for a token transfer.
    pub destination: String,
    /// Coins attached to the message, nano units (the transfer amount for a
    /// plain transfer, the gas budget for a jetton op).
    pub value_nano: u64,
    /// Text comment carried with the transfer.
    pub comment: String,
    /// Token-specific part; `None` means plain coin transfer.
    pub jetton: Option<JettonTransfer>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JettonTransfer {
    /// Token amount in the token's smallest unit.
    pub amount_nano: u64,
    /// Final token recipient.
    pub recipient: String,
    /// Where excess gas is returned.
    pub response_address: String,
    /// Coins forwarded to the recipient with the notification, nano units.
    pub forward_nano: u64,
}

/// A transfer after the wallet contract signed it, ready to broadcast.
#[derive(Debug, Clone)]
pub struct SignedTransfer {
    pub seqno: u32,
    /// Canonical base64 payload as produced by the signing capability.
    pub payload: String,
    /// Hex ed25519 signature over the payload.
    pub signature: String,
}

/// Broadcast acknowledgement. The reference is best-effort; `None` when the
/// backend yields no verifiable hash.
#[derive(Debug, Clone)]
pub struct BroadcastAck {
    pub tx_reference: Option<String>,
}

/// Fixed capability interface the external wallet collaborator satisfies.
#[async_trait]
pub trait WalletSdk: Send + Sync {
    /// Current wallet-contract sequence number (a network read on real
    /// backends).
    async fn sequence_number(&self) -> Result<u32, WalletError>;

    /// Sign a transfer instruction at the given seqno.
    async fn create_transfer(
        &self,
        instruction: &TransferInstruction,
        seqno: u32,
    ) -> Result<SignedTransfer, WalletError>;

    /// Submit a signed transfer to the network.
    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck, WalletError>;

    /// Service wallet balance in nano units.
    async fn balance(&self) -> Result<u128, WalletError>;

    /// The service's own jetton wallet for the configured token master.
    /// Resolved once at startup, never per request.
    async fn jetton_wallet_address(&self) -> Result<TonAddress, WalletError>;
}

/// Validated ed25519 key material for the service wallet.
///
/// Mirrors the original deployment contract: a 32-byte base64 seed.
#[derive(Clone)]
pub struct WalletKey {
    signing_key: SigningKey,
}

#[derive(Debug, Error, PartialEq)]
pub enum WalletKeyError {
    #[error("key is not valid base64")]
    BadEncoding,
    #[error("key must be a 32-byte seed, got {0} bytes")]
    BadLength(usize),
}

impl WalletKey {
    pub fn from_base64(encoded: &str) -> Result<Self, WalletKeyError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|_| WalletKeyError::BadEncoding)?;
        let seed: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| WalletKeyError::BadLength(bytes.len()))?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
        })
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }
}

impl std::fmt::Debug for WalletKey {
    /// Never prints key material.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKey")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

/// Sign the canonical encoding of an instruction with the service key.
///
/// Both backends route `create_transfer` through here; the payload layout is
/// the service's canonical envelope, not the chain's cell format (that
/// belongs to the external library).
pub(crate) fn sign_instruction(
    key: &WalletKey,
    instruction: &TransferInstruction,
    seqno: u32,
) -> SignedTransfer {
    #[derive(Serialize)]
    struct Envelope<'a> {
        seqno: u32,
        instruction: &'a TransferInstruction,
    }

    let canonical = serde_json::to_vec(&Envelope { seqno, instruction })
        .expect("instruction serialization cannot fail");
    let signature = key.signing_key.sign(&canonical);

    SignedTransfer {
        seqno,
        payload: base64::engine::general_purpose::STANDARD.encode(&canonical),
        signature: hex::encode(signature.to_bytes()),
    }
}
