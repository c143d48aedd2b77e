//! Snapshot store backed by the `zfs` command.
//!
//! Listing uses `-H -p -S creation -d 1` so output is scripted,
//! machine-precision, newest first, and scoped to the dataset's own
//! snapshots. Prefix filtering happens in-process on the parsed records.

use crate::error::{AutosnapError, Result};
use crate::store::{snapshot_name, SnapshotRecord, SnapshotStore};
use crate::zfs::command::CommandRunner;
use crate::zfs::parse::parse_snapshot_list;
use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};

/// ZFS-backed snapshot store.
pub struct ZfsSnapshotStore {
    runner: CommandRunner,
}

impl ZfsSnapshotStore {
    /// Create a store using the given command runner.
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl SnapshotStore for ZfsSnapshotStore {
    async fn latest_matching(
        &self,
        volume: &str,
        prefix: &str,
    ) -> Result<Option<SnapshotRecord>> {
        Ok(self.all_matching(volume, prefix).await?.into_iter().next())
    }

    async fn all_matching(&self, volume: &str, prefix: &str) -> Result<Vec<SnapshotRecord>> {
        let output = self
            .runner
            .run(&[
                "list",
                "-t",
                "snapshot",
                "-H",
                "-p",
                "-o",
                "name,creation",
                "-S",
                "creation",
                "-d",
                "1",
                volume,
            ])
            .await?;

        Ok(parse_snapshot_list(&output, prefix)?)
    }

    async fn create(
        &self,
        volume: &str,
        prefix: &str,
        at: DateTime<Utc>,
    ) -> Result<SnapshotRecord> {
        let at = at.with_nanosecond(0).unwrap_or(at);
        let name = snapshot_name(volume, prefix, at);

        self.runner
            .run(&["snapshot", &name])
            .await
            .map_err(|e| AutosnapError::Creation {
                snapshot: name.clone(),
                reason: e.to_string(),
            })?;

        Ok(SnapshotRecord {
            name,
            created_at: at,
        })
    }

    async fn destroy(&self, snapshot: &str) -> Result<()> {
        self.runner
            .run(&["destroy", snapshot])
            .await
            .map_err(|e| AutosnapError::Destruction {
                snapshot: snapshot.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
