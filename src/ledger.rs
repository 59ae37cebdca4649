//! Transaction ledger — append-only audit log of transfer attempts.
//!
//! Every attempted transfer, success or failure, is recorded as exactly one
//! entry before the HTTP response completes. The backing store is a JSON
//! array file created empty at first startup; an unreadable store at startup
//! is fatal (the service must not hand out rewards it cannot account for).
//!
//! Appends serialize the read-modify-write of the full file behind a single
//! async mutex and land via temp-file + atomic rename, so two requests
//! finishing at the same time can neither lose nor interleave records.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("ledger I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger file {} is not a JSON record array: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Success,
    Failed,
}

/// One attempted transfer. Append-only; never mutated after `append`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRecord {
    /// Monotonic id, milliseconds-since-epoch based.
    pub id: u64,
    pub recipient_address: String,
    /// Human-unit amount as the client supplied it.
    pub amount: String,
    pub status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_reference: Option<String>,
    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
}

impl TransferRecord {
    /// Stamp a new record with the current time. The final id is assigned by
    /// [`TransferLedger::append`] so concurrent attempts stay unique.
    pub fn new(
        recipient_address: String,
        amount: String,
        status: TransferStatus,
        tx_reference: Option<String>,
        error_detail: Option<String>,
    ) -> Self {
        Self {
            id: now_ms(),
            recipient_address,
            amount,
            status,
            error_detail,
            tx_reference,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

struct LedgerState {
    records: Vec<TransferRecord>,
    last_id: u64,
}

/// Sole owner of the transaction log file.
pub struct TransferLedger {
    path: PathBuf,
    state: Mutex<LedgerState>,
}

impl TransferLedger {
    /// Open the ledger, creating an empty `[]` file if none exists.
    ///
    /// Called once at startup; any failure here must abort the process
    /// before the listener binds.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }

        let records: Vec<TransferRecord> = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
                path: path.clone(),
                source,
            })?
        } else {
            std::fs::write(&path, "[]").map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            Vec::new()
        };

        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);

        Ok(Self {
            path,
            state: Mutex::new(LedgerState { records, last_id }),
        })
    }

    /// Append one record, returning it with its final id.
    pub async fn append(&self, mut record: TransferRecord) -> Result<TransferRecord, StorageError> {
        let mut state = self.state.lock().await;

        // Millisecond timestamps collide under concurrency; bump within the
        // writer lock to keep ids strictly increasing.
        if record.id <= state.last_id {
            record.id = state.last_id + 1;
        }
        state.last_id = record.id;
        state.records.push(record.clone());

        let encoded =
            serde_json::to_vec_pretty(&state.records).map_err(|source| StorageError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &encoded)
            .await
            .map_err(|source| StorageError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })?;

        Ok(record)
    }

    /// All records in insertion order. Operator inspection only.
    pub async fn read_all(&self) -> Vec<TransferRecord> {
        self.state.lock().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(to: &str, status: TransferStatus) -> TransferRecord {
        TransferRecord::new(
            to.to_string(),
            "100".to_string(),
            status,
            None,
            match status {
                TransferStatus::Failed => Some("network error".to_string()),
                TransferStatus::Success => None,
            },
        )
    }

    #[tokio::test]
    async fn creates_empty_file_on_first_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions.json");

        let ledger = TransferLedger::open(&path).unwrap();
        assert!(ledger.is_empty().await);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[tokio::test]
    async fn append_then_read_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TransferLedger::open(dir.path().join("tx.json")).unwrap();

        let written = ledger
            .append(record("EQAbc", TransferStatus::Success))
            .await
            .unwrap();

        let all = ledger.read_all().await;
        assert_eq!(all, vec![written]);
    }

    #[tokio::test]
    async fn read_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = TransferLedger::open(dir.path().join("tx.json")).unwrap();
        ledger
            .append(record("a", TransferStatus::Success))
            .await
            .unwrap();
        ledger
            .append(record("b", TransferStatus::Failed))
            .await
            .unwrap();

        assert_eq!(ledger.read_all().await, ledger.read_all().await);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.json");

        {
            let ledger = TransferLedger::open(&path).unwrap();
            ledger
                .append(record("first", TransferStatus::Success))
                .await
                .unwrap();
            ledger
                .append(record("second", TransferStatus::Failed))
                .await
                .unwrap();
        }

        let reopened = TransferLedger::open(&path).unwrap();
        let all = reopened.read_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].recipient_address, "first");
        assert_eq!(all[1].recipient_address, "second");
        assert_eq!(all[1].error_detail.as_deref(), Some("network error"));
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ledger =
            std::sync::Arc::new(TransferLedger::open(dir.path().join("tx.json")).unwrap());

        let n = 16;
        let handles: Vec<_> = (0..n)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .append(record(&format!("user-{}", i), TransferStatus::Success))
                        .await
                        .unwrap()
                })
            })
            .collect();
        futures::future::join_all(handles).await;

        let all = ledger.read_all().await;
        assert_eq!(all.len(), n);

        // Ids are unique and strictly increasing in insertion order
        for pair in all.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[tokio::test]
    async fn corrupt_file_is_rejected_at_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            TransferLedger::open(&path),
            Err(StorageError::Corrupt { .. })
        ));
    }
}
