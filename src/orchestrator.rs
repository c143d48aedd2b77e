//! Single-pass orchestration over all enabled volumes.
//!
//! One pass resolves the enabled schedules, evaluates each volume against
//! the store's current state, creates a snapshot where one is due, and
//! prunes the volume's oldest matching snapshots after a successful
//! creation. Volumes are processed sequentially and independently: any
//! volume's failure is logged and the pass moves on.

use crate::config::SnapshotSettings;
use crate::discovery::Discovery;
use crate::retention::select_for_deletion;
use crate::schedule::{is_due, VolumeSchedule};
use crate::store::SnapshotStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Outcome counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    /// Enabled volumes evaluated.
    pub volumes_evaluated: usize,
    /// Snapshots created this pass.
    pub snapshots_created: usize,
    /// Old snapshots destroyed this pass.
    pub snapshots_destroyed: usize,
    /// Volumes that failed (discovery, creation, or listing).
    pub volumes_failed: usize,
    /// Individual destroy failures; pruning converges on a later pass.
    pub destroy_failures: usize,
    /// Whether schedule discovery itself failed, ending the pass early.
    pub discovery_failed: bool,
}

/// What happened to a single volume within a pass.
#[derive(Debug, Clone, Default)]
struct VolumeOutcome {
    created: bool,
    destroyed: usize,
    destroy_failures: usize,
}

/// Drives one evaluation pass across all enabled volumes.
///
/// Stateless between passes: every decision is derived from what the
/// collaborators report at the time of the call.
pub struct Orchestrator {
    discovery: Arc<dyn Discovery>,
    store: Arc<dyn SnapshotStore>,
    settings: SnapshotSettings,
}

impl Orchestrator {
    /// Create an orchestrator over the two collaborators.
    pub fn new(
        discovery: Arc<dyn Discovery>,
        store: Arc<dyn SnapshotStore>,
        settings: SnapshotSettings,
    ) -> Self {
        Self {
            discovery,
            store,
            settings,
        }
    }

    /// Run one pass at the given instant.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> PassSummary {
        let mut summary = PassSummary::default();

        let schedules = match self.discovery.list_enabled_schedules().await {
            Ok(schedules) => schedules,
            Err(e) => {
                error!(error = %e, "Schedule discovery failed, ending pass");
                summary.discovery_failed = true;
                return summary;
            }
        };

        debug!(volumes = schedules.len(), "Evaluating enabled volumes");

        for schedule in &schedules {
            summary.volumes_evaluated += 1;
            match self.process_volume(schedule, now).await {
                Ok(outcome) => {
                    if outcome.created {
                        summary.snapshots_created += 1;
                    }
                    summary.snapshots_destroyed += outcome.destroyed;
                    summary.destroy_failures += outcome.destroy_failures;
                }
                Err(e) => {
                    error!(volume = %schedule.name, error = %e, "Volume failed this pass");
                    summary.volumes_failed += 1;
                }
            }
        }

        info!(
            volumes = summary.volumes_evaluated,
            created = summary.snapshots_created,
            destroyed = summary.snapshots_destroyed,
            failed = summary.volumes_failed,
            "Pass complete"
        );

        summary
    }

    /// Evaluate, snapshot, and prune one volume.
    ///
    /// Pruning only follows a confirmed new snapshot; a creation failure
    /// returns early so retention never runs against a volume whose
    /// recovery point did not advance.
    async fn process_volume(
        &self,
        schedule: &VolumeSchedule,
        now: DateTime<Utc>,
    ) -> crate::error::Result<VolumeOutcome> {
        let prefix = &self.settings.prefix;
        let mut outcome = VolumeOutcome::default();

        let latest = self.store.latest_matching(&schedule.name, prefix).await?;

        if !is_due(schedule, latest.as_ref(), now) {
            debug!(
                volume = %schedule.name,
                frequency = %schedule.frequency,
                "Not due, skipping"
            );
            return Ok(outcome);
        }

        match &latest {
            Some(last) => info!(
                volume = %schedule.name,
                frequency = %schedule.frequency,
                last = %last.created_at,
                "Snapshot due"
            ),
            None => info!(
                volume = %schedule.name,
                frequency = %schedule.frequency,
                "No previous matching snapshot, taking initial snapshot"
            ),
        }

        let created = self.store.create(&schedule.name, prefix, now).await?;
        info!(volume = %schedule.name, snapshot = %created.name, "Created snapshot");
        outcome.created = true;

        let matching = self.store.all_matching(&schedule.name, prefix).await?;
        for doomed in select_for_deletion(&matching, schedule.keep_count) {
            match self.store.destroy(&doomed.name).await {
                Ok(()) => {
                    info!(volume = %schedule.name, snapshot = %doomed.name, "Pruned snapshot");
                    outcome.destroyed += 1;
                }
                Err(e) => {
                    error!(
                        volume = %schedule.name,
                        snapshot = %doomed.name,
                        error = %e,
                        "Failed to prune snapshot"
                    );
                    outcome.destroy_failures += 1;
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::StaticDiscovery;
    use crate::schedule::Frequency;
    use crate::store::MemorySnapshotStore;
    use chrono::TimeZone;

    fn create_orchestrator(
        schedules: Vec<VolumeSchedule>,
        store: Arc<MemorySnapshotStore>,
    ) -> Orchestrator {
        Orchestrator::new(
            Arc::new(StaticDiscovery::new(schedules)),
            store,
            SnapshotSettings::default(),
        )
    }

    fn at(d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, mi, 0).unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_pass_creates_one_snapshot() {
        let store = Arc::new(MemorySnapshotStore::new());
        let orchestrator = create_orchestrator(
            vec![VolumeSchedule::new("tank/data").with_frequency(Frequency::Hourly)],
            store.clone(),
        );

        let summary = orchestrator.run_pass(at(12, 9, 0)).await;
        assert_eq!(summary.snapshots_created, 1);
        assert_eq!(summary.volumes_failed, 0);
        assert_eq!(store.snapshot_names("tank/data").await.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_passes_in_same_period_create_once() {
        let store = Arc::new(MemorySnapshotStore::new());
        let orchestrator = create_orchestrator(
            vec![VolumeSchedule::new("tank/data").with_frequency(Frequency::Hourly)],
            store.clone(),
        );

        orchestrator.run_pass(at(12, 9, 0)).await;
        // Re-invoked every minute inside the hour.
        for minute in 1..=59 {
            let summary = orchestrator.run_pass(at(12, 9, minute)).await;
            assert_eq!(summary.snapshots_created, 0, "minute {minute}");
        }
        assert_eq!(store.snapshot_names("tank/data").await.len(), 1);

        // Next hour fires again.
        let summary = orchestrator.run_pass(at(12, 10, 0)).await;
        assert_eq!(summary.snapshots_created, 1);
    }

    #[tokio::test]
    async fn test_creation_failure_skips_pruning_and_isolates_volume() {
        let store = Arc::new(MemorySnapshotStore::new());
        // Eight old snapshots that would be pruned after a new creation.
        for hour in 0..8 {
            store
                .create("tank/bad", "autosnap", at(11, hour, 0))
                .await
                .unwrap();
        }
        store.inject_create_failure("tank/bad").await;

        let orchestrator = create_orchestrator(
            vec![
                VolumeSchedule::new("tank/bad")
                    .with_frequency(Frequency::Hourly)
                    .with_keep_count(5),
                VolumeSchedule::new("tank/good").with_frequency(Frequency::Hourly),
            ],
            store.clone(),
        );

        let summary = orchestrator.run_pass(at(12, 12, 0)).await;

        // The failed volume is isolated: no pruning happened there, and the
        // healthy volume still got its snapshot.
        assert_eq!(summary.volumes_failed, 1);
        assert_eq!(summary.snapshots_destroyed, 0);
        assert_eq!(summary.snapshots_created, 1);
        assert_eq!(store.snapshot_names("tank/bad").await.len(), 8);
        assert_eq!(store.snapshot_names("tank/good").await.len(), 1);
    }

    #[tokio::test]
    async fn test_destroy_failure_does_not_block_other_destroys() {
        let store = Arc::new(MemorySnapshotStore::new());
        for hour in 0..8 {
            store
                .create("tank/data", "autosnap", at(11, hour, 0))
                .await
                .unwrap();
        }
        // The oldest snapshot refuses to die.
        let stuck = &store.snapshot_names("tank/data").await[7];
        store.inject_destroy_failure(stuck).await;

        let orchestrator = create_orchestrator(
            vec![VolumeSchedule::new("tank/data")
                .with_frequency(Frequency::Hourly)
                .with_keep_count(5)],
            store.clone(),
        );

        let summary = orchestrator.run_pass(at(12, 12, 0)).await;

        // 9 total after creation, keep 5: 4 selected, 3 destroyed, 1 stuck.
        assert_eq!(summary.snapshots_created, 1);
        assert_eq!(summary.snapshots_destroyed, 3);
        assert_eq!(summary.destroy_failures, 1);
        assert_eq!(summary.volumes_failed, 0);
        assert_eq!(store.snapshot_names("tank/data").await.len(), 6);
    }

    #[tokio::test]
    async fn test_discovery_failure_ends_pass() {
        struct FailingDiscovery;

        #[async_trait::async_trait]
        impl Discovery for FailingDiscovery {
            async fn list_enabled_schedules(
                &self,
            ) -> crate::error::Result<Vec<VolumeSchedule>> {
                Err(crate::error::AutosnapError::Discovery(
                    "property query failed".to_string(),
                ))
            }
        }

        let orchestrator = Orchestrator::new(
            Arc::new(FailingDiscovery),
            Arc::new(MemorySnapshotStore::new()),
            SnapshotSettings::default(),
        );

        let summary = orchestrator.run_pass(at(12, 9, 0)).await;
        assert!(summary.discovery_failed);
        assert_eq!(summary.volumes_evaluated, 0);
    }

    #[tokio::test]
    async fn test_keep_count_zero_never_prunes() {
        let store = Arc::new(MemorySnapshotStore::new());
        for hour in 0..8 {
            store
                .create("tank/data", "autosnap", at(11, hour, 0))
                .await
                .unwrap();
        }

        let orchestrator = create_orchestrator(
            vec![VolumeSchedule::new("tank/data")
                .with_frequency(Frequency::Hourly)
                .with_keep_count(0)],
            store.clone(),
        );

        let summary = orchestrator.run_pass(at(12, 12, 0)).await;
        assert_eq!(summary.snapshots_created, 1);
        assert_eq!(summary.snapshots_destroyed, 0);
        assert_eq!(store.snapshot_names("tank/data").await.len(), 9);
    }
}
