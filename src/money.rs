//! Money Conversion Module
//!
//! Unified conversion between client-facing decimal amounts and the chain's
//! smallest unit (nanoton, 10^-9). All conversions MUST go through this
//! module.
//!
//! ## Design Principles
//! 1. Explicit Error Handling: no silent truncation
//! 2. Internal amounts are `u64` nano units; balances are `u128`

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::str::FromStr;
use thiserror::Error;

/// TON and Jetton amounts both use 9 decimal places in this service.
pub const TON_DECIMALS: u32 = 9;

const NANO_PER_TON: u64 = 1_000_000_000;

/// Money conversion errors
#[derive(Debug, Error, PartialEq)]
pub enum MoneyError {
    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("amount has {provided} decimal places, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("amount too large for the chain representation")]
    Overflow,

    #[error("invalid amount format: {0}")]
    InvalidFormat(String),
}

/// Convert a decimal amount in human units to nano units.
///
/// Rejects zero, negatives, sub-nano precision, and values that do not fit
/// the chain's `u64` coin representation.
pub fn to_nano(amount: Decimal) -> Result<u64, MoneyError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(MoneyError::NotPositive);
    }

    let normalized = amount.normalize();
    if normalized.scale() > TON_DECIMALS {
        return Err(MoneyError::PrecisionOverflow {
            provided: normalized.scale(),
            max: TON_DECIMALS,
        });
    }

    let scaled = normalized
        .checked_mul(Decimal::from(NANO_PER_TON))
        .ok_or(MoneyError::Overflow)?;

    // Scale check above guarantees an integral result
    scaled.to_u64().ok_or(MoneyError::Overflow)
}

/// Parse a client-supplied amount string into nano units.
pub fn parse_nano(amount: &str) -> Result<u64, MoneyError> {
    let trimmed = amount.trim();
    let decimal = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| MoneyError::InvalidFormat(trimmed.to_string()))?;
    to_nano(decimal)
}

/// Format a nano-unit balance as a decimal string, trailing zeros trimmed
/// (`1500000000` → `"1.5"`, `2000000000` → `"2"`).
pub fn format_nano(nano: u128) -> String {
    let whole = nano / NANO_PER_TON as u128;
    let frac = (nano % NANO_PER_TON as u128) as u64;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:09}", frac);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}
