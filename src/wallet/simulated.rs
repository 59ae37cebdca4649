//! Simulated wallet backend.
//!
//! Complete in-process implementation of [`WalletSdk`] for development and
//! tests: no network, deterministic addresses, real ed25519 signatures with
//! the configured key. The default backend in the dev profile.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tracing::debug;

use super::{
    BroadcastAck, SignedTransfer, TonAddress, TransferInstruction, WalletError, WalletKey,
    WalletSdk, sign_instruction,
};

pub struct SimulatedWallet {
    key: WalletKey,
    balance_nano: u128,
    seqno: AtomicU32,
}

impl SimulatedWallet {
    pub fn new(key: WalletKey, balance_nano: u128) -> Self {
        Self {
            key,
            balance_nano,
            seqno: AtomicU32::new(1),
        }
    }
}

#[async_trait]
impl WalletSdk for SimulatedWallet {
    async fn sequence_number(&self) -> Result<u32, WalletError> {
        Ok(self.seqno.load(Ordering::SeqCst))
    }

    async fn create_transfer(
        &self,
        instruction: &TransferInstruction,
        seqno: u32,
    ) -> Result<SignedTransfer, WalletError> {
        Ok(sign_instruction(&self.key, instruction, seqno))
    }

    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck, WalletError> {
        // Advance the contract seqno the way a real broadcast would.
        self.seqno.fetch_add(1, Ordering::SeqCst);
        debug!(seqno = transfer.seqno, "simulated broadcast accepted");
        // No on-chain hash exists; report none rather than invent one.
        Ok(BroadcastAck { tx_reference: None })
    }

    async fn balance(&self) -> Result<u128, WalletError> {
        Ok(self.balance_nano)
    }

    async fn jetton_wallet_address(&self) -> Result<TonAddress, WalletError> {
        // Deterministic placeholder derived from the key, so restarts agree.
        Ok(TonAddress::from_parts(0, self.key.public_key_bytes()))
    }
}
