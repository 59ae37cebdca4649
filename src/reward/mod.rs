//! Reward transfer flow: Validator → Executor → Ledger.
//!
//! - [`validate`] - pure request validation, nothing downstream sees a bad
//!   request
//! - [`executor`] - single-flight wallet invocation, failures become
//!   outcomes
//! - [`service`] - the full flow as the gateway consumes it

pub mod executor;
pub mod service;
pub mod types;
pub mod validate;

#[cfg(test)]
mod integration_tests;

pub use executor::{JettonContext, TransferExecutor};
pub use service::{RewardError, RewardReceipt, RewardService};
pub use types::{AmountField, RawRewardRequest, TransferOutcome, TransferRequest};
pub use validate::{ValidationError, validate};
