//! Request validation.
//!
//! Pure function of the raw body: no network, no logging, no state. A
//! request that fails here never reaches the executor and is never recorded
//! as a transfer attempt.

use thiserror::Error;

use super::types::{RawRewardRequest, TransferRequest};
use crate::money;
use crate::wallet::TonAddress;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing '{0}'")]
    MissingField(&'static str),

    #[error("Invalid TON address format")]
    InvalidAddress,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Check presence and shape of the recipient address and amount.
///
/// The address is format-checked against both textual encodings (friendly
/// base64 and raw `wc:hex`) before rejection; existence on chain is not
/// checked here.
pub fn validate(raw: &RawRewardRequest) -> Result<TransferRequest, ValidationError> {
    let to = raw
        .to
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::MissingField("to"))?;

    let amount_field = raw
        .amount
        .as_ref()
        .ok_or(ValidationError::MissingField("amount"))?;

    let recipient = TonAddress::parse(to).map_err(|_| ValidationError::InvalidAddress)?;

    let amount = amount_field
        .as_decimal()
        .ok_or_else(|| ValidationError::InvalidAmount("not a number".to_string()))?;
    let amount_nano =
        money::to_nano(amount).map_err(|e| ValidationError::InvalidAmount(e.to_string()))?;

    Ok(TransferRequest {
        recipient,
        amount: amount.normalize(),
        amount_nano,
    })
}
