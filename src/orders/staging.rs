//! Durable staging slot for the not-yet-submitted order.
//!
//! One checkout is in flight per browsing context, so the store is a single
//! mutable slot under a fixed record name. The file-backed implementation
//! survives process restarts, which is what lets a confirmation step finish
//! after the customer has navigated away and back.

use crate::orders::error::StagingError;
use crate::orders::types::PendingOrder;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Fixed record name for the staged order.
pub const STAGED_ORDER_FILE: &str = "pending_order.json";

const STAGED_RECORD_VERSION: u32 = 1;

#[async_trait]
pub trait PendingOrderStore: Send + Sync {
    /// Stages an order, overwriting any previous one.
    async fn save(&self, order: &PendingOrder) -> Result<(), StagingError>;

    async fn load(&self) -> Result<Option<PendingOrder>, StagingError>;

    async fn clear(&self) -> Result<(), StagingError>;
}

/// On-disk envelope around the staged order.
#[derive(Debug, Serialize, Deserialize)]
struct StagedRecord {
    version: u32,
    staged_at: String,
    order: PendingOrder,
}

pub struct FilePendingOrderStore {
    path: PathBuf,
    // Serializes writers so a save racing a clear cannot interleave.
    lock: Mutex<()>,
}

impl FilePendingOrderStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FilePendingOrderStore {
            path: dir.into().join(STAGED_ORDER_FILE),
            lock: Mutex::new(()),
        }
    }

    fn io_error(context: &str, error: std::io::Error) -> StagingError {
        StagingError::Io {
            message: format!("{}: {}", context, error),
        }
    }
}

#[async_trait]
impl PendingOrderStore for FilePendingOrderStore {
    async fn save(&self, order: &PendingOrder) -> Result<(), StagingError> {
        let record = StagedRecord {
            version: STAGED_RECORD_VERSION,
            staged_at: chrono::Utc::now().to_rfc3339(),
            order: order.clone(),
        };
        let body = serde_json::to_vec_pretty(&record).map_err(|e| StagingError::Corrupt {
            message: format!("could not encode staged order: {}", e),
        })?;

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error("could not create staging directory", e))?;
        }

        // Write-then-rename so a crash mid-write never leaves a truncated
        // staged order behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &body)
            .await
            .map_err(|e| Self::io_error("could not write staged order", e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Self::io_error("could not move staged order into place", e))?;

        debug!(path = %self.path.display(), "order staged");
        Ok(())
    }

    async fn load(&self) -> Result<Option<PendingOrder>, StagingError> {
        let _guard = self.lock.lock().await;
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error("could not read staged order", e)),
        };

        let record: StagedRecord =
            serde_json::from_slice(&bytes).map_err(|e| StagingError::Corrupt {
                message: format!("staged order file is not valid JSON: {}", e),
            })?;
        if record.version != STAGED_RECORD_VERSION {
            warn!(
                version = record.version,
                "staged order written by a different schema version"
            );
        }
        Ok(Some(record.order))
    }

    async fn clear(&self) -> Result<(), StagingError> {
        let _guard = self.lock.lock().await;
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error("could not clear staged order", e)),
        }
    }
}

/// Volatile store for tests and contexts without a durable filesystem.
#[derive(Default)]
pub struct InMemoryPendingOrderStore {
    slot: Mutex<Option<PendingOrder>>,
}

impl InMemoryPendingOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingOrderStore for InMemoryPendingOrderStore {
    async fn save(&self, order: &PendingOrder) -> Result<(), StagingError> {
        *self.slot.lock().await = Some(order.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<PendingOrder>, StagingError> {
        Ok(self.slot.lock().await.clone())
    }

    async fn clear(&self) -> Result<(), StagingError> {
        *self.slot.lock().await = None;
        Ok(())
    }
}
