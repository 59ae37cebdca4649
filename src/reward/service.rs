//! Reward service — validate, execute, record.
//!
//! One entry point ties the three components together in the order the
//! gateway needs: a request that fails validation never reaches the
//! executor and leaves no ledger trace; a request that reaches the
//! executor is recorded exactly once, success or failure, before the
//! caller can respond.

use std::sync::Arc;

use thiserror::Error;

use super::executor::TransferExecutor;
use super::types::{RawRewardRequest, TransferOutcome, TransferRequest};
use super::validate::{ValidationError, validate};
use crate::ledger::{StorageError, TransferLedger, TransferRecord};

/// Why a reward request produced no transfer record.
#[derive(Debug, Error)]
pub enum RewardError {
    /// Client-caused; the executor was never invoked.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transfer ran but its record could not be written. Losing the
    /// audit trail is worse than a confusing client response, so this
    /// fails the request.
    #[error("failed to record transfer: {0}")]
    Storage(#[from] StorageError),
}

/// A completed attempt: the validated request, what the executor produced,
/// and the ledger record as written.
#[derive(Debug)]
pub struct RewardReceipt {
    pub request: TransferRequest,
    pub outcome: TransferOutcome,
    pub record: TransferRecord,
}

pub struct RewardService {
    executor: TransferExecutor,
    ledger: Arc<TransferLedger>,
}

impl RewardService {
    pub fn new(executor: TransferExecutor, ledger: Arc<TransferLedger>) -> Self {
        Self { executor, ledger }
    }

    pub fn ledger(&self) -> &Arc<TransferLedger> {
        &self.ledger
    }

    /// Run one reward request through the full flow.
    ///
    /// `Ok` means a record was appended; inspect `receipt.outcome` for
    /// whether the transfer itself succeeded.
    pub async fn process(&self, raw: &RawRewardRequest) -> Result<RewardReceipt, RewardError> {
        let request = validate(raw)?;
        let outcome = self.executor.execute(&request).await;

        let (tx_reference, error_detail) = match &outcome {
            TransferOutcome::Success { tx_reference } => (tx_reference.clone(), None),
            TransferOutcome::Failed { error_detail } => (None, Some(error_detail.clone())),
        };

        let record = self
            .ledger
            .append(TransferRecord::new(
                request.recipient.to_string(),
                request.amount.to_string(),
                outcome.status(),
                tx_reference,
                error_detail,
            ))
            .await?;

        Ok(RewardReceipt {
            request,
            outcome,
            record,
        })
    }
}
