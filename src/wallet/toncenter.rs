//! toncenter wallet backend.
//!
//! Implements the wallet reads (balance, contract seqno) as real JSON-RPC
//! calls against a toncenter v2 endpoint. Transfer signing keeps the
//! canonical envelope signer shared with the simulated backend: until the
//! external wallet-contract library is linked, broadcasts from this backend
//! do not reach the chain, and startup says so loudly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{
    BroadcastAck, SignedTransfer, TonAddress, TransferInstruction, WalletError, WalletKey,
    WalletSdk, sign_instruction,
};

/// JSON-RPC request structure
#[derive(Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    method: &'static str,
    params: T,
    id: u64,
}

/// JSON-RPC / toncenter response envelope. toncenter wraps its REST results
/// in `{ok, result, error, code}`, so both shapes are tolerated here.
#[derive(Deserialize)]
struct JsonRpcResponse<T> {
    #[serde(default)]
    ok: Option<bool>,
    result: Option<T>,
    error: Option<serde_json::Value>,
    #[serde(default)]
    code: Option<i64>,
}

/// `runGetMethod` result payload.
#[derive(Deserialize)]
struct RunGetMethodResult {
    exit_code: i32,
    #[serde(default)]
    stack: Vec<serde_json::Value>,
}

/// Thin JSON-RPC client over reqwest.
pub struct ToncenterProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl ToncenterProvider {
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, WalletError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| WalletError::Rpc(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<T, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };

        let mut builder = self.client.post(&self.url).json(&request);
        if let Some(ref key) = self.api_key {
            builder = builder.header("X-API-Key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| WalletError::Rpc(format!("{}: {}", method, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::Api {
                code: status.as_u16() as i64,
                message: format!("{} returned HTTP {}", method, status),
            });
        }

        let envelope: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|e| WalletError::InvalidResponse(format!("{}: {}", method, e)))?;

        if let Some(error) = envelope.error {
            return Err(WalletError::Api {
                code: envelope.code.unwrap_or(-1),
                message: rpc_error_message(&error),
            });
        }
        if envelope.ok == Some(false) {
            return Err(WalletError::Api {
                code: envelope.code.unwrap_or(-1),
                message: format!("{} reported failure without detail", method),
            });
        }

        envelope
            .result
            .ok_or_else(|| WalletError::InvalidResponse(format!("{}: missing result", method)))
    }
}

pub struct ToncenterWallet {
    provider: ToncenterProvider,
    key: WalletKey,
    wallet_address: TonAddress,
    jetton_wallet: Option<TonAddress>,
}

impl ToncenterWallet {
    pub fn new(
        provider: ToncenterProvider,
        key: WalletKey,
        wallet_address: TonAddress,
        jetton_wallet: Option<TonAddress>,
    ) -> Self {
        Self {
            provider,
            key,
            wallet_address,
            jetton_wallet,
        }
    }
}

#[async_trait]
impl WalletSdk for ToncenterWallet {
    async fn sequence_number(&self) -> Result<u32, WalletError> {
        let result: RunGetMethodResult = self
            .provider
            .call(
                "runGetMethod",
                json!({
                    "address": self.wallet_address.to_string(),
                    "method": "seqno",
                    "stack": [],
                }),
            )
            .await?;

        if result.exit_code != 0 {
            // Uninitialized wallet contract: first transfer uses seqno 0.
            warn!(
                exit_code = result.exit_code,
                "seqno get-method failed, assuming uninitialized wallet"
            );
            return Ok(0);
        }

        parse_seqno_stack(&result.stack)
    }

    async fn create_transfer(
        &self,
        instruction: &TransferInstruction,
        seqno: u32,
    ) -> Result<SignedTransfer, WalletError> {
        Ok(sign_instruction(&self.key, instruction, seqno))
    }

    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck, WalletError> {
        // The canonical envelope is not a chain-valid message; submitting it
        // would be rejected. Held here until the external library is linked.
        debug!(
            seqno = transfer.seqno,
            "transfer held at the signing boundary (no wallet-contract library linked)"
        );
        Ok(BroadcastAck { tx_reference: None })
    }

    async fn balance(&self) -> Result<u128, WalletError> {
        let raw: serde_json::Value = self
            .provider
            .call(
                "getAddressBalance",
                json!({ "address": self.wallet_address.to_string() }),
            )
            .await?;
        parse_balance(&raw)
    }

    async fn jetton_wallet_address(&self) -> Result<TonAddress, WalletError> {
        self.jetton_wallet
            .clone()
            .ok_or(WalletError::JettonWalletUnresolved)
    }
}

fn rpc_error_message(error: &serde_json::Value) -> String {
    match error {
        serde_json::Value::String(s) => s.clone(),
        other => other
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

/// toncenter renders get-method stack entries as `["num", "0x14"]` pairs.
fn parse_seqno_stack(stack: &[serde_json::Value]) -> Result<u32, WalletError> {
    let entry = stack
        .first()
        .and_then(|e| e.as_array())
        .ok_or_else(|| WalletError::InvalidResponse("seqno stack is empty".into()))?;

    let value = entry
        .get(1)
        .and_then(|v| v.as_str())
        .ok_or_else(|| WalletError::InvalidResponse("seqno stack entry has no value".into()))?;

    let digits = value.trim_start_matches("0x");
    u32::from_str_radix(digits, 16)
        .map_err(|_| WalletError::InvalidResponse(format!("seqno is not a hex number: {}", value)))
}

/// Balance arrives as a decimal string of nanotons (occasionally a number).
fn parse_balance(raw: &serde_json::Value) -> Result<u128, WalletError> {
    match raw {
        serde_json::Value::String(s) => s
            .parse::<u128>()
            .map_err(|_| WalletError::InvalidResponse(format!("balance is not numeric: {}", s))),
        serde_json::Value::Number(n) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| WalletError::InvalidResponse(format!("balance is not a u64: {}", n))),
        other => Err(WalletError::InvalidResponse(format!(
            "unexpected balance payload: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_seqno_stack_entries() {
        let stack = vec![serde_json::json!(["num", "0x14"])];
        assert_eq!(parse_seqno_stack(&stack).unwrap(), 20);

        let no_prefix = vec![serde_json::json!(["num", "1f"])];
        assert_eq!(parse_seqno_stack(&no_prefix).unwrap(), 31);

        assert!(parse_seqno_stack(&[]).is_err());
        assert!(parse_seqno_stack(&[serde_json::json!(["num", "zz"])]).is_err());
    }

    #[test]
    fn parses_balance_payloads() {
        assert_eq!(
            parse_balance(&serde_json::json!("123456789000")).unwrap(),
            123_456_789_000
        );
        assert_eq!(parse_balance(&serde_json::json!(42)).unwrap(), 42);
        assert!(parse_balance(&serde_json::json!({"nested": true})).is_err());
        assert!(parse_balance(&serde_json::json!("12.5")).is_err());
    }

    #[test]
    fn rpc_error_messages_cover_both_shapes() {
        assert_eq!(
            rpc_error_message(&serde_json::json!("rate limited")),
            "rate limited"
        );
        assert_eq!(
            rpc_error_message(&serde_json::json!({"code": -32000, "message": "boom"})),
            "boom"
        );
    }
}
