//! Wire and domain types for the reward transfer flow.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::ledger::TransferStatus;
use crate::wallet::TonAddress;

/// Raw reward request body as clients actually send it.
///
/// The deployed frontends disagree on field names (`to` vs `toAddress`,
/// `amount` vs `score`/`amountTon`/`tokens`) and on whether the amount is a
/// JSON number or a string; all observed shapes are accepted here and
/// normalized by the validator.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct RawRewardRequest {
    #[serde(default, alias = "toAddress")]
    pub to: Option<String>,
    #[serde(default, alias = "score", alias = "amountTon", alias = "tokens")]
    pub amount: Option<AmountField>,
}

/// A JSON number or a decimal string.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum AmountField {
    #[schema(value_type = f64)]
    Number(serde_json::Number),
    Text(String),
}

impl AmountField {
    /// Normalize to a `Decimal`, accepting plain and scientific notation.
    pub fn as_decimal(&self) -> Option<Decimal> {
        let text = match self {
            AmountField::Number(n) => n.to_string(),
            AmountField::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}

/// A reward request after validation. Everything downstream of the
/// validator works with this type only.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub recipient: TonAddress,
    /// Human-unit amount as validated.
    pub amount: Decimal,
    /// The same amount in the chain's smallest unit.
    pub amount_nano: u64,
}

/// What one execution attempt produced. The executor never throws past
/// this boundary: every failure mode lands in `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Success { tx_reference: Option<String> },
    Failed { error_detail: String },
}

impl TransferOutcome {
    pub fn status(&self) -> TransferStatus {
        match self {
            TransferOutcome::Success { .. } => TransferStatus::Success,
            TransferOutcome::Failed { .. } => TransferStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success { .. })
    }
}
