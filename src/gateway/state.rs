use std::sync::Arc;

use crate::ledger::TransferLedger;
use crate::reward::RewardService;
use crate::wallet::{TonAddress, WalletHandle};

/// Shared gateway state, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    /// The full reward flow (validate → execute → record)
    pub service: Arc<RewardService>,
    /// Wallet capability, for read-only queries (balance)
    pub wallet: WalletHandle,
    /// Service hot wallet address, echoed in balance responses
    pub wallet_address: TonAddress,
    /// Token symbol used in client-facing messages
    pub token_symbol: String,
}

impl AppState {
    pub fn new(
        service: Arc<RewardService>,
        wallet: WalletHandle,
        wallet_address: TonAddress,
        token_symbol: impl Into<String>,
    ) -> Self {
        Self {
            service,
            wallet,
            wallet_address,
            token_symbol: token_symbol.into(),
        }
    }

    pub fn ledger(&self) -> &Arc<TransferLedger> {
        self.service.ledger()
    }
}
