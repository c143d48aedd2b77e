//! Snapshot store collaborator.
//!
//! The store is the only shared resource in the system: every scheduling
//! decision is derived from what it reports, and creation/destruction are
//! the only mutations this crate performs. Snapshots created by autosnap
//! carry a naming prefix so the pruner never touches manual or third-party
//! snapshots; scoping by that prefix happens here, in the queries.

use crate::error::{AutosnapError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Timestamp layout embedded in snapshot names.
pub const NAME_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// One existing snapshot, as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Full snapshot name, `{volume}@{prefix}_{timestamp}`.
    pub name: String,
    /// Creation instant, second resolution.
    pub created_at: DateTime<Utc>,
}

/// Deterministic name for a new snapshot of `volume` taken at `at`.
pub fn snapshot_name(volume: &str, prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}@{}_{}", volume, prefix, at.format(NAME_TIMESTAMP_FORMAT))
}

/// Whether a snapshot name carries the given creation prefix.
pub fn matches_prefix(name: &str, prefix: &str) -> bool {
    match name.split_once('@') {
        Some((_, suffix)) => {
            suffix.starts_with(prefix) && suffix[prefix.len()..].starts_with('_')
        }
        None => false,
    }
}

/// Trait for the snapshot store backend.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Most recent snapshot on `volume` whose name carries `prefix`.
    async fn latest_matching(&self, volume: &str, prefix: &str)
        -> Result<Option<SnapshotRecord>>;

    /// All snapshots on `volume` carrying `prefix`, newest first.
    async fn all_matching(&self, volume: &str, prefix: &str) -> Result<Vec<SnapshotRecord>>;

    /// Create a snapshot of `volume` named for the instant `at`.
    async fn create(&self, volume: &str, prefix: &str, at: DateTime<Utc>)
        -> Result<SnapshotRecord>;

    /// Destroy a snapshot by its full name.
    async fn destroy(&self, snapshot: &str) -> Result<()>;
}

/// In-memory snapshot store.
///
/// Reference implementation of the store contract, used by unit and
/// integration tests. Supports failure injection so orchestration error
/// paths can be exercised.
pub struct MemorySnapshotStore {
    volumes: RwLock<HashMap<String, Vec<SnapshotRecord>>>,
    failing_creates: RwLock<HashSet<String>>,
    failing_destroys: RwLock<HashSet<String>>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            volumes: RwLock::new(HashMap::new()),
            failing_creates: RwLock::new(HashSet::new()),
            failing_destroys: RwLock::new(HashSet::new()),
        }
    }

    /// Seed an existing snapshot.
    pub async fn insert(&self, volume: &str, record: SnapshotRecord) {
        let mut volumes = self.volumes.write().await;
        volumes.entry(volume.to_string()).or_default().push(record);
    }

    /// Make every `create` on `volume` fail until cleared.
    pub async fn inject_create_failure(&self, volume: &str) {
        self.failing_creates.write().await.insert(volume.to_string());
    }

    /// Make `destroy` of the named snapshot fail.
    pub async fn inject_destroy_failure(&self, snapshot: &str) {
        self.failing_destroys
            .write()
            .await
            .insert(snapshot.to_string());
    }

    /// Names of all snapshots currently held for `volume`, newest first.
    pub async fn snapshot_names(&self, volume: &str) -> Vec<String> {
        let volumes = self.volumes.read().await;
        let mut records = volumes.get(volume).cloned().unwrap_or_default();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.into_iter().map(|r| r.name).collect()
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn latest_matching(
        &self,
        volume: &str,
        prefix: &str,
    ) -> Result<Option<SnapshotRecord>> {
        Ok(self.all_matching(volume, prefix).await?.into_iter().next())
    }

    async fn all_matching(&self, volume: &str, prefix: &str) -> Result<Vec<SnapshotRecord>> {
        let volumes = self.volumes.read().await;
        let mut matching: Vec<SnapshotRecord> = volumes
            .get(volume)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches_prefix(&r.name, prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn create(
        &self,
        volume: &str,
        prefix: &str,
        at: DateTime<Utc>,
    ) -> Result<SnapshotRecord> {
        let at = at.with_nanosecond(0).unwrap_or(at);
        let name = snapshot_name(volume, prefix, at);

        if self.failing_creates.read().await.contains(volume) {
            return Err(AutosnapError::Creation {
                snapshot: name,
                reason: "injected create failure".to_string(),
            });
        }

        let mut volumes = self.volumes.write().await;
        let records = volumes.entry(volume.to_string()).or_default();
        if records.iter().any(|r| r.name == name) {
            return Err(AutosnapError::Creation {
                snapshot: name,
                reason: "snapshot already exists".to_string(),
            });
        }

        let record = SnapshotRecord {
            name,
            created_at: at,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn destroy(&self, snapshot: &str) -> Result<()> {
        if self.failing_destroys.read().await.contains(snapshot) {
            return Err(AutosnapError::Destruction {
                snapshot: snapshot.to_string(),
                reason: "injected destroy failure".to_string(),
            });
        }

        let mut volumes = self.volumes.write().await;
        for records in volumes.values_mut() {
            if let Some(pos) = records.iter().position(|r| r.name == snapshot) {
                records.remove(pos);
                return Ok(());
            }
        }

        Err(AutosnapError::Destruction {
            snapshot: snapshot.to_string(),
            reason: "no such snapshot".to_string(),
        })
    }
}
