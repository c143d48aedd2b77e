//! Schedule discovery from ZFS user properties.
//!
//! Volumes opt in by setting `com.sun:auto-snapshot=true`; cadence, keep
//! count, target time and target day come from the companion properties.
//! Unset properties (`-`) take the configured defaults, and malformed
//! values are logged and defaulted rather than dropping the volume.

use crate::config::SnapshotSettings;
use crate::discovery::Discovery;
use crate::error::{AutosnapError, Result};
use crate::schedule::{Frequency, TargetTime, VolumeSchedule};
use crate::zfs::command::CommandRunner;
use crate::zfs::parse::parse_property_line;
use async_trait::async_trait;
use tracing::{error, warn};

/// Property flagging a dataset for automatic snapshots.
pub const PROP_ENABLED: &str = "com.sun:auto-snapshot";
/// Cadence property.
pub const PROP_FREQUENCY: &str = "com.sun:auto-snapshot:frequency";
/// Keep-count property.
pub const PROP_KEEP: &str = "com.sun:auto-snapshot:keep";
/// Target time-of-day property, `HH:MM`.
pub const PROP_TIME: &str = "com.sun:auto-snapshot:time";
/// Target weekday/day-of-month property.
pub const PROP_DAY: &str = "com.sun:auto-snapshot:day";

/// Discovery backed by `zfs get` over user properties.
pub struct ZfsPropertyDiscovery {
    runner: CommandRunner,
    defaults: SnapshotSettings,
}

impl ZfsPropertyDiscovery {
    /// Create a property discovery using the given runner and defaults.
    pub fn new(runner: CommandRunner, defaults: SnapshotSettings) -> Self {
        Self { runner, defaults }
    }

    /// Names of all datasets with automatic snapshots enabled.
    async fn enabled_volumes(&self) -> Result<Vec<String>> {
        let output = self
            .runner
            .run(&[
                "get",
                "-H",
                "-o",
                "name,value",
                "-t",
                "filesystem,volume",
                PROP_ENABLED,
            ])
            .await
            .map_err(|e| AutosnapError::Discovery(e.to_string()))?;

        let mut names = Vec::new();
        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            let (name, value) = parse_property_line(line)?;
            if value == "true" {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Resolve one volume's schedule from its cadence properties.
    async fn resolve_schedule(&self, volume: &str) -> Result<VolumeSchedule> {
        let properties = format!(
            "{},{},{},{}",
            PROP_FREQUENCY, PROP_KEEP, PROP_TIME, PROP_DAY
        );
        let output = self
            .runner
            .run(&["get", "-H", "-o", "property,value", &properties, volume])
            .await?;

        let mut schedule = VolumeSchedule::new(volume)
            .with_frequency(self.defaults.default_frequency)
            .with_keep_count(self.defaults.default_keep);

        for line in output.lines().filter(|l| !l.trim().is_empty()) {
            let (property, value) = parse_property_line(line)?;
            if value == "-" {
                continue;
            }

            match property {
                PROP_FREQUENCY => schedule.frequency = Frequency::parse(value),
                PROP_KEEP => match value.parse::<usize>() {
                    Ok(keep) => schedule.keep_count = keep,
                    Err(_) => warn!(
                        volume,
                        value, "Malformed keep count, using default"
                    ),
                },
                PROP_TIME => match TargetTime::parse(value) {
                    Ok(time) => schedule.target_time = time,
                    Err(_) => warn!(
                        volume,
                        value, "Malformed target time, using default"
                    ),
                },
                PROP_DAY => match value.parse::<u32>() {
                    Ok(day) if day >= 1 => schedule.target_day = day,
                    _ => warn!(volume, value, "Malformed target day, using default"),
                },
                _ => {}
            }
        }

        Ok(schedule)
    }
}

#[async_trait]
impl Discovery for ZfsPropertyDiscovery {
    async fn list_enabled_schedules(&self) -> Result<Vec<VolumeSchedule>> {
        let mut schedules = Vec::new();

        for volume in self.enabled_volumes().await? {
            match self.resolve_schedule(&volume).await {
                Ok(schedule) => schedules.push(schedule),
                Err(e) => {
                    // One volume's property failure must not sink the pass.
                    error!(volume = %volume, error = %e, "Failed to resolve schedule, skipping volume");
                }
            }
        }

        Ok(schedules)
    }
}
