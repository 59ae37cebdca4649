//! HTTP handlers.
//!
//! Error mapping follows the request flow: validation failures are the
//! client's fault (400, no record), executor failures are the external
//! service's fault (500, one failed record), and a ledger write failure
//! also fails the request (500) because an unrecorded transfer is worse
//! than a confusing response.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::error;

use super::state::AppState;
use super::types::{BalanceResponse, ErrorBody, RewardResponse, StatusResponse};
use crate::ledger::TransferRecord;
use crate::money;
use crate::reward::{RawRewardRequest, RewardError, TransferOutcome};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Liveness check
///
/// Always 200 while the process is serving; startup already proved the
/// wallet and the ledger are usable.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is live", body = StatusResponse)
    ),
    tag = "System"
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        ok: true,
        service: "ton-reward-server".to_string(),
        version: env!("GIT_HASH").to_string(),
        timestamp_ms: now_ms(),
    })
}

/// Service wallet balance
#[utoipa::path(
    get,
    path = "/balance",
    responses(
        (status = 200, description = "Current hot wallet balance", body = BalanceResponse),
        (status = 500, description = "Balance lookup failed", body = ErrorBody)
    ),
    tag = "Wallet"
)]
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BalanceResponse>, (StatusCode, Json<ErrorBody>)> {
    match state.wallet.balance().await {
        Ok(nano) => Ok(Json(BalanceResponse {
            address: state.wallet_address.to_string(),
            balance: format!("{} TON", money::format_nano(nano)),
        })),
        Err(e) => {
            error!(error = %e, "balance lookup failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to fetch balance")),
            ))
        }
    }
}

/// Send a reward transfer
///
/// Body: `{to|toAddress, amount|score|amountTon|tokens}`. Amount may be a
/// JSON number or a decimal string.
#[utoipa::path(
    post,
    path = "/api/reward",
    request_body = RawRewardRequest,
    responses(
        (status = 200, description = "Transfer broadcast", body = RewardResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 500, description = "Transfer failed", body = ErrorBody)
    ),
    tag = "Reward"
)]
pub async fn post_reward(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawRewardRequest>, JsonRejection>,
) -> Result<Json<RewardResponse>, (StatusCode, Json<ErrorBody>)> {
    let Json(raw) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(format!("Invalid request body: {}", rejection.body_text()))),
        )
    })?;

    let receipt = state.service.process(&raw).await.map_err(|e| match e {
        RewardError::Validation(v) => (StatusCode::BAD_REQUEST, Json(ErrorBody::new(v.to_string()))),
        RewardError::Storage(s) => {
            error!(error = %s, "ledger append failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to record transfer")),
            )
        }
    })?;

    match receipt.outcome {
        TransferOutcome::Success { tx_reference } => Ok(Json(RewardResponse {
            ok: true,
            // The broadcast may not return a verifiable hash; report the
            // placeholder rather than invent one.
            tx: tx_reference.unwrap_or_else(|| "sent".to_string()),
            message: format!(
                "Sent {} {} to {}",
                receipt.request.amount, state.token_symbol, receipt.request.recipient
            ),
        })),
        TransferOutcome::Failed { error_detail } => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(error_detail)),
        )),
    }
}

/// Transfer history
///
/// The full append-only record, insertion order. Operator inspection only.
#[utoipa::path(
    get,
    path = "/api/transactions",
    responses(
        (status = 200, description = "All transfer records", body = [TransferRecord])
    ),
    tag = "Reward"
)]
pub async fn get_transactions(State(state): State<Arc<AppState>>) -> Json<Vec<TransferRecord>> {
    Json(state.ledger().read_all().await)
}
