//! Snapshot persistence
//!
//! A [`Snapshot`] is the full engine state at one instant. Deadlines are
//! absolute epoch milliseconds, so entries and leases that lapse while the
//! server is down are already expired when it comes back.

use crate::ApiState;
use async_trait::async_trait;
use kvq_common::{EpochMillis, KvqError, KvqResult};
use kvq_kv::KvRecord;
use kvq_queue::MessageRecord;
use kvq_tenant::TenantRecord;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Point-in-time copy of every engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// When it was taken
    pub taken_at: EpochMillis,
    /// Token → tenant bindings
    pub tenants: Vec<TenantRecord>,
    /// Live KV entries
    pub kv: Vec<KvRecord>,
    /// Undeleted messages in enqueue order
    pub messages: Vec<MessageRecord>,
}

/// Durable home for snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Latest snapshot, `None` if nothing was saved yet
    async fn load(&self) -> KvqResult<Option<Snapshot>>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &Snapshot) -> KvqResult<()>;
}

/// Pretty JSON file, replaced atomically through a temp file
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Store at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        tmp.into()
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> KvqResult<Option<Snapshot>> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let snapshot = serde_json::from_slice(&content).map_err(|err| {
            KvqError::internal(format!("corrupt snapshot {}: {err}", self.path.display()))
        })?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &Snapshot) -> KvqResult<()> {
        let content = serde_json::to_vec_pretty(snapshot)
            .map_err(|err| KvqError::internal(format!("snapshot encode failed: {err}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    saved: Mutex<Option<Snapshot>>,
}

impl MemorySnapshotStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self) -> KvqResult<Option<Snapshot>> {
        Ok(self.saved.lock().clone())
    }

    async fn save(&self, snapshot: &Snapshot) -> KvqResult<()> {
        *self.saved.lock() = Some(snapshot.clone());
        Ok(())
    }
}

/// Background saver bounding how much a crash can lose
pub struct SnapshotSaver {
    state: Arc<ApiState>,
    store: Arc<dyn SnapshotStore>,
    interval: Duration,
}

impl SnapshotSaver {
    /// Saver writing `state` to `store` every `interval`
    pub fn new(state: Arc<ApiState>, store: Arc<dyn SnapshotStore>, interval: Duration) -> Self {
        Self {
            state,
            store,
            interval,
        }
    }

    /// Take and store one snapshot
    pub async fn save_once(&self) -> KvqResult<()> {
        let snapshot = self.state.snapshot();
        self.store.save(&snapshot).await?;
        tracing::debug!(
            taken_at = snapshot.taken_at,
            kv_entries = snapshot.kv.len(),
            messages = snapshot.messages.len(),
            "saved periodic snapshot"
        );
        Ok(())
    }

    /// Save on a fixed interval until `stop` fires or its sender is dropped
    ///
    /// The first save happens one interval after start. A failed save is
    /// logged and retried on the next tick. A save in progress when `stop`
    /// fires runs to completion before the task ends, so awaiting the handle
    /// leaves no write racing a final save.
    pub fn spawn(self, mut stop: oneshot::Receiver<()>) -> JoinHandle<()> {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "starting snapshot saver");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = self.save_once().await {
                            tracing::error!(error = %err, "periodic snapshot failed");
                        }
                    }
                    _ = &mut stop => break,
                }
            }
            tracing::debug!("snapshot saver stopped");
        })
    }
}
