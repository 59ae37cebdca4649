//! OpenAPI / Swagger UI documentation.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::types::{BalanceResponse, ErrorBody, RewardResponse, StatusResponse};
use crate::ledger::{TransferRecord, TransferStatus};
use crate::reward::types::{AmountField, RawRewardRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TON Reward Server API",
        version = "1.0.0",
        description = "Accepts reward requests and forwards token transfers to a TON wallet, recording every attempt in an append-only transaction log.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::status,
        crate::gateway::handlers::get_balance,
        crate::gateway::handlers::post_reward,
        crate::gateway::handlers::get_transactions,
    ),
    components(
        schemas(
            StatusResponse,
            BalanceResponse,
            RewardResponse,
            ErrorBody,
            RawRewardRequest,
            AmountField,
            TransferRecord,
            TransferStatus,
        )
    ),
    tags(
        (name = "Reward", description = "Reward transfers and transfer history"),
        (name = "Wallet", description = "Service wallet queries"),
        (name = "System", description = "Liveness and build info")
    )
)]
pub struct ApiDoc;
