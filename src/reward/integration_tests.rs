//! Integration tests for the reward flow.
//!
//! Exercise Validator → Executor → Ledger end to end against mock wallet
//! backends, without HTTP in the way. The gateway-level tests live in
//! `tests/reward_api.rs`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;

use crate::ledger::{TransferLedger, TransferStatus};
use crate::reward::executor::TransferExecutor;
use crate::reward::service::{RewardError, RewardService};
use crate::reward::types::{AmountField, RawRewardRequest};
use crate::wallet::{
    BroadcastAck, SignedTransfer, TonAddress, TransferInstruction, WalletError, WalletKey,
    WalletSdk, simulated::SimulatedWallet,
};

fn test_key() -> WalletKey {
    WalletKey::from_base64(&base64::engine::general_purpose::STANDARD.encode([5u8; 32])).unwrap()
}

fn service_address() -> TonAddress {
    TonAddress::parse(&format!("0:{}", "aa".repeat(32))).unwrap()
}

fn raw_request(to: &str, amount: u64) -> RawRewardRequest {
    RawRewardRequest {
        to: Some(to.to_string()),
        amount: Some(AmountField::Number(serde_json::Number::from(amount))),
    }
}

fn valid_recipient() -> String {
    format!("0:{}", "bc".repeat(32))
}

struct TestHarness {
    service: RewardService,
    ledger: Arc<TransferLedger>,
    _dir: tempfile::TempDir,
}

impl TestHarness {
    fn with_wallet(wallet: Arc<dyn WalletSdk>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(TransferLedger::open(dir.path().join("transactions.json")).unwrap());
        let executor =
            TransferExecutor::new(wallet, service_address(), None, 50_000_000, "RPG");
        Self {
            service: RewardService::new(executor, ledger.clone()),
            ledger,
            _dir: dir,
        }
    }

    fn simulated() -> Self {
        Self::with_wallet(Arc::new(SimulatedWallet::new(test_key(), 100_000_000_000)))
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn valid_request_appends_one_success_record() {
    let harness = TestHarness::simulated();

    let receipt = harness
        .service
        .process(&raw_request(&valid_recipient(), 100))
        .await
        .unwrap();

    assert!(receipt.outcome.is_success());
    assert_eq!(receipt.record.status, TransferStatus::Success);
    assert_eq!(receipt.record.recipient_address, valid_recipient());
    assert_eq!(receipt.record.amount, "100");
    assert!(receipt.record.error_detail.is_none());

    let all = harness.ledger.read_all().await;
    assert_eq!(all, vec![receipt.record]);
}

// ============================================================================
// Failure paths
// ============================================================================

struct OfflineWallet;

#[async_trait]
impl WalletSdk for OfflineWallet {
    async fn sequence_number(&self) -> Result<u32, WalletError> {
        Err(WalletError::Rpc("network unreachable".into()))
    }
    async fn create_transfer(
        &self,
        _instruction: &TransferInstruction,
        _seqno: u32,
    ) -> Result<SignedTransfer, WalletError> {
        Err(WalletError::Rpc("network unreachable".into()))
    }
    async fn broadcast(&self, _transfer: &SignedTransfer) -> Result<BroadcastAck, WalletError> {
        Err(WalletError::Rpc("network unreachable".into()))
    }
    async fn balance(&self) -> Result<u128, WalletError> {
        Err(WalletError::Rpc("network unreachable".into()))
    }
    async fn jetton_wallet_address(&self) -> Result<TonAddress, WalletError> {
        Err(WalletError::JettonWalletUnresolved)
    }
}

#[tokio::test]
async fn wallet_failure_appends_one_failed_record() {
    let harness = TestHarness::with_wallet(Arc::new(OfflineWallet));

    let receipt = harness
        .service
        .process(&raw_request(&valid_recipient(), 10))
        .await
        .unwrap();

    assert!(!receipt.outcome.is_success());
    assert_eq!(receipt.record.status, TransferStatus::Failed);
    let detail = receipt.record.error_detail.as_deref().unwrap();
    assert!(detail.contains("network unreachable"));

    assert_eq!(harness.ledger.len().await, 1);
}

/// Counts how often the executor reaches the wallet at all.
struct CountingWallet {
    inner: SimulatedWallet,
    calls: AtomicUsize,
}

#[async_trait]
impl WalletSdk for CountingWallet {
    async fn sequence_number(&self) -> Result<u32, WalletError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sequence_number().await
    }
    async fn create_transfer(
        &self,
        instruction: &TransferInstruction,
        seqno: u32,
    ) -> Result<SignedTransfer, WalletError> {
        self.inner.create_transfer(instruction, seqno).await
    }
    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck, WalletError> {
        self.inner.broadcast(transfer).await
    }
    async fn balance(&self) -> Result<u128, WalletError> {
        self.inner.balance().await
    }
    async fn jetton_wallet_address(&self) -> Result<TonAddress, WalletError> {
        self.inner.jetton_wallet_address().await
    }
}

#[tokio::test]
async fn invalid_requests_never_reach_the_wallet_or_ledger() {
    let wallet = Arc::new(CountingWallet {
        inner: SimulatedWallet::new(test_key(), 0),
        calls: AtomicUsize::new(0),
    });
    let harness = TestHarness::with_wallet(wallet.clone());

    let cases = vec![
        RawRewardRequest::default(),
        raw_request("not-an-address", 5),
        raw_request(&valid_recipient(), 0),
        RawRewardRequest {
            to: Some(valid_recipient()),
            amount: Some(AmountField::Text("-1".into())),
        },
    ];

    for raw in cases {
        let result = harness.service.process(&raw).await;
        assert!(matches!(result, Err(RewardError::Validation(_))));
    }

    assert_eq!(wallet.calls.load(Ordering::SeqCst), 0);
    assert!(harness.ledger.is_empty().await);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn n_concurrent_requests_produce_exactly_n_records() {
    let harness = Arc::new(TestHarness::simulated());

    let n = 12;
    let handles: Vec<_> = (0..n)
        .map(|i| {
            let harness = harness.clone();
            tokio::spawn(async move {
                harness
                    .service
                    .process(&raw_request(&valid_recipient(), i + 1))
                    .await
                    .unwrap()
            })
        })
        .collect();
    futures::future::join_all(handles).await;

    let all = harness.ledger.read_all().await;
    assert_eq!(all.len() as u64, n);
    assert!(all.iter().all(|r| r.status == TransferStatus::Success));

    // No duplicates
    let mut ids: Vec<u64> = all.iter().map(|r| r.id).collect();
    ids.dedup();
    assert_eq!(ids.len() as u64, n);
}

/// Fails the test if a second execution enters the seqno→broadcast critical
/// section while one is still inside it.
struct GateWallet {
    inner: SimulatedWallet,
    in_section: AtomicU32,
    max_observed: AtomicU32,
}

#[async_trait]
impl WalletSdk for GateWallet {
    async fn sequence_number(&self) -> Result<u32, WalletError> {
        let now = self.in_section.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_observed.fetch_max(now, Ordering::SeqCst);
        // Widen the race window so an unserialized executor would overlap
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        self.inner.sequence_number().await
    }
    async fn create_transfer(
        &self,
        instruction: &TransferInstruction,
        seqno: u32,
    ) -> Result<SignedTransfer, WalletError> {
        self.inner.create_transfer(instruction, seqno).await
    }
    async fn broadcast(&self, transfer: &SignedTransfer) -> Result<BroadcastAck, WalletError> {
        let ack = self.inner.broadcast(transfer).await;
        self.in_section.fetch_sub(1, Ordering::SeqCst);
        ack
    }
    async fn balance(&self) -> Result<u128, WalletError> {
        self.inner.balance().await
    }
    async fn jetton_wallet_address(&self) -> Result<TonAddress, WalletError> {
        self.inner.jetton_wallet_address().await
    }
}

#[tokio::test]
async fn broadcasts_are_single_flight_per_wallet() {
    let wallet = Arc::new(GateWallet {
        inner: SimulatedWallet::new(test_key(), 100_000_000_000),
        in_section: AtomicU32::new(0),
        max_observed: AtomicU32::new(0),
    });
    let harness = Arc::new(TestHarness::with_wallet(wallet.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let harness = harness.clone();
            tokio::spawn(async move {
                harness
                    .service
                    .process(&raw_request(&valid_recipient(), 1))
                    .await
                    .unwrap()
            })
        })
        .collect();
    futures::future::join_all(handles).await;

    assert_eq!(wallet.max_observed.load(Ordering::SeqCst), 1);
    assert_eq!(harness.ledger.len().await, 8);
}
