//! Typed parsers for `zfs -H` output.
//!
//! Scripted output mode (`-H`) emits one record per line with tab-separated
//! columns and no headers. Malformed lines fail with a [`ParseError`] so
//! garbled output is never confused with an unavailable store.

use crate::error::ParseError;
use crate::store::{matches_prefix, SnapshotRecord};
use chrono::{DateTime, TimeZone, Utc};

/// Parse one `name<TAB>creation` line from
/// `zfs list -t snapshot -H -p -o name,creation`.
///
/// With `-p`, creation is printed as unix seconds.
pub fn parse_snapshot_line(line: &str) -> Result<SnapshotRecord, ParseError> {
    let malformed = |reason: &str| ParseError::SnapshotLine {
        line: line.to_string(),
        reason: reason.to_string(),
    };

    let (name, creation) = line
        .split_once('\t')
        .ok_or_else(|| malformed("expected two tab-separated columns"))?;

    let name = name.trim();
    if !name.contains('@') {
        return Err(malformed("snapshot name carries no '@'"));
    }

    let seconds: i64 = creation.trim().parse().map_err(|_| ParseError::Timestamp {
        value: creation.trim().to_string(),
        reason: "not an integer unix timestamp".to_string(),
    })?;

    let created_at: DateTime<Utc> =
        Utc.timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| ParseError::Timestamp {
                value: creation.trim().to_string(),
                reason: "out of range".to_string(),
            })?;

    Ok(SnapshotRecord {
        name: name.to_string(),
        created_at,
    })
}

/// Parse a snapshot listing, keeping only records that carry `prefix`.
///
/// Input order is preserved; with `-S creation` the listing is already
/// newest first.
pub fn parse_snapshot_list(output: &str, prefix: &str) -> Result<Vec<SnapshotRecord>, ParseError> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_snapshot_line)
        .filter(|parsed| match parsed {
            Ok(record) => matches_prefix(&record.name, prefix),
            Err(_) => true,
        })
        .collect()
}

/// Parse one `key<TAB>value` line from `zfs get -H -o name,value` or
/// `zfs get -H -o property,value`.
pub fn parse_property_line(line: &str) -> Result<(&str, &str), ParseError> {
    let (key, value) = line.split_once('\t').ok_or_else(|| ParseError::PropertyLine {
        line: line.to_string(),
        reason: "expected two tab-separated columns".to_string(),
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(ParseError::PropertyLine {
            line: line.to_string(),
            reason: "empty key column".to_string(),
        });
    }

    Ok((key, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_line() {
        let record =
            parse_snapshot_line("tank/data@autosnap_2024-06-12_10:00:00\t1718186400").unwrap();
        assert_eq!(record.name, "tank/data@autosnap_2024-06-12_10:00:00");
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2024, 6, 12, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_snapshot_line_rejects_malformed() {
        assert!(matches!(
            parse_snapshot_line("tank/data@snap"),
            Err(ParseError::SnapshotLine { .. })
        ));
        assert!(matches!(
            parse_snapshot_line("tank/data\t1718186400"),
            Err(ParseError::SnapshotLine { .. })
        ));
        assert!(matches!(
            parse_snapshot_line("tank/data@snap\tyesterday"),
            Err(ParseError::Timestamp { .. })
        ));
    }

    #[test]
    fn test_parse_snapshot_list_filters_by_prefix() {
        let output = "tank/data@autosnap_2024-06-12_10:00:00\t1718186400\n\
                      tank/data@manual-backup\t1718190000\n\
                      tank/data@autosnap_2024-06-12_09:00:00\t1718182800\n";

        let records = parse_snapshot_list(output, "autosnap").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "tank/data@autosnap_2024-06-12_10:00:00");
        assert_eq!(records[1].name, "tank/data@autosnap_2024-06-12_09:00:00");
    }

    #[test]
    fn test_parse_snapshot_list_empty_output() {
        assert!(parse_snapshot_list("", "autosnap").unwrap().is_empty());
        assert!(parse_snapshot_list("\n\n", "autosnap").unwrap().is_empty());
    }

    #[test]
    fn test_parse_snapshot_list_propagates_malformed_lines() {
        let output = "tank/data@autosnap_2024-06-12_10:00:00\t1718186400\ngarbage\n";
        assert!(parse_snapshot_list(output, "autosnap").is_err());
    }

    #[test]
    fn test_parse_property_line() {
        let (name, value) =
            parse_property_line("tank/data\ttrue").unwrap();
        assert_eq!(name, "tank/data");
        assert_eq!(value, "true");

        let (property, value) =
            parse_property_line("com.sun:auto-snapshot:frequency\thourly").unwrap();
        assert_eq!(property, "com.sun:auto-snapshot:frequency");
        assert_eq!(value, "hourly");
    }

    #[test]
    fn test_parse_property_line_rejects_malformed() {
        assert!(parse_property_line("no-tabs-here").is_err());
        assert!(parse_property_line("\tvalue").is_err());
    }
}
