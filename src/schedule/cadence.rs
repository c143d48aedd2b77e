//! Cadence configuration for scheduled snapshots.
//!
//! A [`VolumeSchedule`] describes one volume's snapshot cadence as resolved
//! by discovery: how often to snapshot, how many to keep, and for calendar
//! cadences the target time of day and day of week/month.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Snapshot cadence.
///
/// Interval cadences fire once a fixed amount of time has elapsed since the
/// last snapshot. Calendar cadences fire at a recurring wall-clock target
/// within a day, week, or month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Every 5 minutes.
    #[serde(rename = "5min")]
    Every5Min,
    /// Every 15 minutes.
    #[serde(rename = "15min")]
    Every15Min,
    /// Every hour.
    #[serde(rename = "hourly")]
    Hourly,
    /// Every day at a target time.
    #[serde(rename = "daily")]
    Daily,
    /// Every week on a target weekday at a target time.
    #[serde(rename = "weekly")]
    Weekly,
    /// Every month on a target day at a target time.
    #[serde(rename = "monthly")]
    Monthly,
}

impl Frequency {
    /// Map a frequency property value to a cadence.
    ///
    /// Unrecognized values fall back to [`Frequency::Daily`] so a typo'd
    /// property never drops the volume out of scheduling.
    pub fn parse(value: &str) -> Self {
        match value {
            "5min" => Frequency::Every5Min,
            "15min" => Frequency::Every15Min,
            "hourly" => Frequency::Hourly,
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            _ => Frequency::Daily,
        }
    }

    /// Elapsed-time threshold for interval cadences, `None` for calendar
    /// cadences.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            Frequency::Every5Min => Some(Duration::from_secs(300)),
            Frequency::Every15Min => Some(Duration::from_secs(900)),
            Frequency::Hourly => Some(Duration::from_secs(3600)),
            Frequency::Daily | Frequency::Weekly | Frequency::Monthly => None,
        }
    }

    /// Whether this cadence is evaluated against a wall-clock target.
    pub fn is_calendar(&self) -> bool {
        self.interval().is_none()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Frequency::Every5Min => "5min",
            Frequency::Every15Min => "15min",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        };
        f.write_str(s)
    }
}

/// Wall-clock time of day for calendar cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTime {
    /// Hour, 0-23.
    pub hour: u32,
    /// Minute, 0-59.
    pub minute: u32,
}

impl TargetTime {
    /// Midnight, the default target.
    pub const MIDNIGHT: TargetTime = TargetTime { hour: 0, minute: 0 };

    /// Parse an `HH:MM` property value.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let malformed = || ParseError::TimeOfDay {
            value: value.to_string(),
        };

        let (hour, minute) = value.split_once(':').ok_or_else(malformed)?;
        let hour: u32 = hour.trim().parse().map_err(|_| malformed())?;
        let minute: u32 = minute.trim().parse().map_err(|_| malformed())?;

        if hour > 23 || minute > 59 {
            return Err(malformed());
        }

        Ok(TargetTime { hour, minute })
    }
}

impl Default for TargetTime {
    fn default() -> Self {
        TargetTime::MIDNIGHT
    }
}

impl fmt::Display for TargetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// One volume's resolved snapshot schedule.
///
/// Rebuilt fresh by discovery on every pass; never persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeSchedule {
    /// Canonical volume name.
    pub name: String,
    /// Only enabled volumes are scheduled.
    pub enabled: bool,
    /// Snapshot cadence.
    pub frequency: Frequency,
    /// How many matching snapshots to retain. 0 disables pruning.
    pub keep_count: usize,
    /// Time of day for calendar cadences.
    pub target_time: TargetTime,
    /// Weekly: ISO weekday 1-7 (Monday=1). Monthly: day of month 1-31,
    /// clamped to the current month's length at evaluation time. Unused by
    /// daily and interval cadences.
    pub target_day: u32,
}

impl VolumeSchedule {
    /// Create a schedule with the discovery defaults: daily at midnight,
    /// keep 31, day 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            frequency: Frequency::Daily,
            keep_count: 31,
            target_time: TargetTime::MIDNIGHT,
            target_day: 1,
        }
    }

    /// Set the cadence.
    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set the keep count.
    pub fn with_keep_count(mut self, keep_count: usize) -> Self {
        self.keep_count = keep_count;
        self
    }

    /// Set the target time of day.
    pub fn with_target_time(mut self, target_time: TargetTime) -> Self {
        self.target_time = target_time;
        self
    }

    /// Set the target weekday or day of month.
    pub fn with_target_day(mut self, target_day: u32) -> Self {
        self.target_day = target_day;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_parse() {
        assert_eq!(Frequency::parse("5min"), Frequency::Every5Min);
        assert_eq!(Frequency::parse("15min"), Frequency::Every15Min);
        assert_eq!(Frequency::parse("hourly"), Frequency::Hourly);
        assert_eq!(Frequency::parse("daily"), Frequency::Daily);
        assert_eq!(Frequency::parse("weekly"), Frequency::Weekly);
        assert_eq!(Frequency::parse("monthly"), Frequency::Monthly);
    }

    #[test]
    fn test_frequency_parse_unknown_falls_back_to_daily() {
        assert_eq!(Frequency::parse("fortnightly"), Frequency::Daily);
        assert_eq!(Frequency::parse(""), Frequency::Daily);
        assert_eq!(Frequency::parse("HOURLY"), Frequency::Daily);
    }

    #[test]
    fn test_frequency_intervals() {
        assert_eq!(
            Frequency::Every5Min.interval(),
            Some(Duration::from_secs(300))
        );
        assert_eq!(
            Frequency::Every15Min.interval(),
            Some(Duration::from_secs(900))
        );
        assert_eq!(Frequency::Hourly.interval(), Some(Duration::from_secs(3600)));
        assert_eq!(Frequency::Daily.interval(), None);
        assert!(Frequency::Weekly.is_calendar());
        assert!(!Frequency::Every5Min.is_calendar());
    }

    #[test]
    fn test_target_time_parse() {
        assert_eq!(
            TargetTime::parse("02:30").unwrap(),
            TargetTime { hour: 2, minute: 30 }
        );
        assert_eq!(TargetTime::parse("00:00").unwrap(), TargetTime::MIDNIGHT);
        assert_eq!(
            TargetTime::parse("23:59").unwrap(),
            TargetTime {
                hour: 23,
                minute: 59
            }
        );
    }

    #[test]
    fn test_target_time_parse_rejects_malformed() {
        assert!(TargetTime::parse("24:00").is_err());
        assert!(TargetTime::parse("12:60").is_err());
        assert!(TargetTime::parse("noon").is_err());
        assert!(TargetTime::parse("12").is_err());
        assert!(TargetTime::parse("").is_err());
    }

    #[test]
    fn test_schedule_defaults() {
        let schedule = VolumeSchedule::new("tank/data");
        assert_eq!(schedule.frequency, Frequency::Daily);
        assert_eq!(schedule.keep_count, 31);
        assert_eq!(schedule.target_time, TargetTime::MIDNIGHT);
        assert_eq!(schedule.target_day, 1);
        assert!(schedule.enabled);
    }

    #[test]
    fn test_schedule_builder() {
        let schedule = VolumeSchedule::new("tank/vm")
            .with_frequency(Frequency::Weekly)
            .with_keep_count(4)
            .with_target_time(TargetTime { hour: 3, minute: 15 })
            .with_target_day(7);

        assert_eq!(schedule.frequency, Frequency::Weekly);
        assert_eq!(schedule.keep_count, 4);
        assert_eq!(schedule.target_day, 7);
    }
}
