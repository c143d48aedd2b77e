//! Due-evaluation for snapshot schedules.
//!
//! Decides whether a volume is due for a snapshot at a given instant, using
//! only the schedule and the most recent matching snapshot. The process
//! keeps no state between invocations, so every decision here must be
//! derivable from those two inputs alone.
//!
//! Interval cadences are memoryless: due once enough time has elapsed since
//! the last snapshot. Calendar cadences compute a single target instant for
//! the current day/week/month; the volume is due when `now` has reached the
//! target and the last snapshot predates it. The second half of that
//! conjunction is what keeps a once-a-minute caller from firing twice in the
//! same period: after a snapshot lands at or past the target, its creation
//! time no longer predates the target until the next period rolls the target
//! forward.
//!
//! If no invocation happens for several periods, the next one fires exactly
//! once. Missed periods are not back-filled.

use crate::schedule::{Frequency, VolumeSchedule};
use crate::store::SnapshotRecord;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Decide whether `schedule` is due for a new snapshot at `now`.
///
/// `latest` is the most recent matching snapshot, if any. A volume with no
/// matching snapshot is always due, whatever its cadence.
pub fn is_due(
    schedule: &VolumeSchedule,
    latest: Option<&SnapshotRecord>,
    now: DateTime<Utc>,
) -> bool {
    let Some(latest) = latest else {
        return true;
    };

    match schedule.frequency.interval() {
        Some(interval) => {
            let elapsed = now.signed_duration_since(latest.created_at);
            elapsed >= Duration::seconds(interval.as_secs() as i64)
        }
        None => {
            let target = target_instant(schedule, now);
            now >= target && latest.created_at < target
        }
    }
}

/// Compute the current period's target instant for a calendar cadence.
///
/// Interval cadences have no target; for uniformity they resolve as daily.
pub fn target_instant(schedule: &VolumeSchedule, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();

    let target_date = match schedule.frequency {
        Frequency::Weekly => {
            let target_day = schedule.target_day.clamp(1, 7);
            let diff_days = target_day as i64 - now.weekday().number_from_monday() as i64;
            today + Duration::days(diff_days)
        }
        Frequency::Monthly => {
            let month_len = days_in_month(today.year(), today.month());
            let effective_day = schedule.target_day.clamp(1, month_len);
            today.with_day(effective_day).unwrap_or(today)
        }
        _ => today,
    };

    target_date
        .and_hms_opt(schedule.target_time.hour, schedule.target_time.minute, 0)
        .unwrap_or_else(|| target_date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
        .and_utc()
}

/// Number of days in the given month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}
