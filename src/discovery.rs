//! Volume schedule discovery collaborator.
//!
//! Discovery resolves which volumes have automatic snapshotting enabled and
//! with what cadence. Schedules are resolved fresh on every pass, so
//! property changes take effect on the next invocation without any restart.

use crate::error::Result;
use crate::schedule::VolumeSchedule;
use async_trait::async_trait;

/// Trait for the per-volume configuration resolver.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Resolve the schedules of all enabled volumes.
    ///
    /// Only enabled volumes are returned; unset properties carry the
    /// defaults (daily, keep 31, 00:00, day 1).
    async fn list_enabled_schedules(&self) -> Result<Vec<VolumeSchedule>>;
}

/// Discovery over a fixed schedule list.
///
/// Used by tests and by deployments that resolve schedules out-of-band.
pub struct StaticDiscovery {
    schedules: Vec<VolumeSchedule>,
}

impl StaticDiscovery {
    /// Wrap a fixed list of schedules.
    pub fn new(schedules: Vec<VolumeSchedule>) -> Self {
        Self { schedules }
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn list_enabled_schedules(&self) -> Result<Vec<VolumeSchedule>> {
        Ok(self
            .schedules
            .iter()
            .filter(|s| s.enabled)
            .cloned()
            .collect())
    }
}
