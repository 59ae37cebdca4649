//! Transfer executor.
//!
//! Owns the only path from a validated request to the wallet capability.
//! The "fetch seqno → sign → broadcast" sequence is a critical section: two
//! transfers racing through it would read the same contract seqno and the
//! chain would reject one of them. A single-flight mutex serializes the
//! section per wallet; concurrent requests queue behind it.
//!
//! `execute` never returns `Err`. Every failure mode (RPC down, rejected
//! call, bad response) is converted into [`TransferOutcome::Failed`] so the
//! caller can log the attempt and answer the client without unwinding.

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::types::{TransferOutcome, TransferRequest};
use crate::wallet::{
    BroadcastAck, JettonTransfer, TonAddress, TransferInstruction, WalletError, WalletHandle,
};

/// Token-transfer context, resolved once at startup when a Jetton master is
/// configured. Absent means plain coin transfers.
#[derive(Debug, Clone)]
pub struct JettonContext {
    /// The service's own jetton wallet (the outgoing message destination).
    pub service_jetton_wallet: TonAddress,
    /// Coins forwarded to the recipient with the transfer notification.
    pub forward_nano: u64,
}

pub struct TransferExecutor {
    wallet: WalletHandle,
    /// Service hot wallet; excess gas from jetton ops returns here.
    service_address: TonAddress,
    jetton: Option<JettonContext>,
    /// Gas attached to a jetton op, nano units.
    fee_nano: u64,
    token_symbol: String,
    /// Guards seqno fetch through broadcast.
    flight: Mutex<()>,
}

impl TransferExecutor {
    pub fn new(
        wallet: WalletHandle,
        service_address: TonAddress,
        jetton: Option<JettonContext>,
        fee_nano: u64,
        token_symbol: impl Into<String>,
    ) -> Self {
        Self {
            wallet,
            service_address,
            jetton,
            fee_nano,
            token_symbol: token_symbol.into(),
            flight: Mutex::new(()),
        }
    }

    /// Run one transfer to completion. Infallible at the type level: the
    /// outcome carries success or the failure detail.
    pub async fn execute(&self, request: &TransferRequest) -> TransferOutcome {
        match self.try_execute(request).await {
            Ok(ack) => {
                info!(
                    recipient = %request.recipient,
                    amount = %request.amount,
                    tx = ack.tx_reference.as_deref().unwrap_or("-"),
                    "transfer broadcast"
                );
                TransferOutcome::Success {
                    tx_reference: ack.tx_reference,
                }
            }
            Err(e) => {
                warn!(
                    recipient = %request.recipient,
                    amount = %request.amount,
                    error = %e,
                    "transfer failed"
                );
                TransferOutcome::Failed {
                    error_detail: e.to_string(),
                }
            }
        }
    }

    async fn try_execute(&self, request: &TransferRequest) -> Result<BroadcastAck, WalletError> {
        let instruction = self.build_instruction(request);

        // Single-flight per wallet: nothing else may fetch a seqno until
        // this broadcast is handed to the network.
        let _flight = self.flight.lock().await;
        let seqno = self.wallet.sequence_number().await?;
        let signed = self.wallet.create_transfer(&instruction, seqno).await?;
        self.wallet.broadcast(&signed).await
    }

    /// Plain mode sends the amount itself to the recipient. Jetton mode
    /// addresses the service's own jetton wallet, attaches the gas budget,
    /// and carries the token amount in the jetton body.
    fn build_instruction(&self, request: &TransferRequest) -> TransferInstruction {
        let comment = format!("Reward {} {}", request.amount, self.token_symbol);

        match &self.jetton {
            None => TransferInstruction {
                destination: request.recipient.to_string(),
                value_nano: request.amount_nano,
                comment,
                jetton: None,
            },
            Some(ctx) => TransferInstruction {
                destination: ctx.service_jetton_wallet.to_string(),
                value_nano: self.fee_nano,
                comment,
                jetton: Some(JettonTransfer {
                    amount_nano: request.amount_nano,
                    recipient: request.recipient.to_string(),
                    response_address: self.service_address.to_string(),
                    forward_nano: ctx.forward_nano,
                }),
            },
        }
    }
}
