//! Configuration module for autosnap.

use crate::error::{AutosnapError, Result};
use crate::schedule::Frequency;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration for an autosnap run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutosnapConfig {
    /// ZFS command invocation settings.
    #[serde(default)]
    pub zfs: ZfsConfig,
    /// Snapshot naming and scheduling defaults.
    #[serde(default)]
    pub snapshot: SnapshotSettings,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AutosnapConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AutosnapError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| AutosnapError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.snapshot.prefix;
        if prefix.is_empty() {
            return Err(AutosnapError::InvalidConfig {
                field: "snapshot.prefix".to_string(),
                reason: "prefix must be non-empty".to_string(),
            });
        }
        if prefix.contains('@') || prefix.contains('/') || prefix.contains(char::is_whitespace) {
            return Err(AutosnapError::InvalidConfig {
                field: "snapshot.prefix".to_string(),
                reason: "prefix must not contain '@', '/' or whitespace".to_string(),
            });
        }

        if self.zfs.command_timeout.is_zero() {
            return Err(AutosnapError::InvalidConfig {
                field: "zfs.command_timeout".to_string(),
                reason: "timeout must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

/// ZFS command invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZfsConfig {
    /// Path to the zfs binary.
    pub binary: PathBuf,
    /// Deadline applied to every external zfs call.
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
}

impl Default for ZfsConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("zfs"),
            command_timeout: Duration::from_secs(30),
        }
    }
}

/// Snapshot naming and scheduling defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSettings {
    /// Creation prefix embedded in snapshot names.
    pub prefix: String,
    /// Keep count applied when a volume sets none.
    pub default_keep: usize,
    /// Cadence applied when a volume sets none.
    pub default_frequency: Frequency,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            prefix: "autosnap".to_string(),
            default_keep: 31,
            default_frequency: Frequency::Daily,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Serde helper for Duration using humantime format.
pub mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        } else if let Some(s_val) = s.strip_suffix('s') {
            s_val
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string())
        } else if let Some(m) = s.strip_suffix('m') {
            m.parse::<u64>()
                .map(|v| Duration::from_secs(v * 60))
                .map_err(|e| e.to_string())
        } else {
            s.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        }
    }
}
