//! Retention pruning for automatic snapshots.
//!
//! Keeps the newest `keep_count` matching snapshots and selects the rest for
//! destruction. Which snapshots count as "matching" is decided by the store
//! query (prefix scoping), never here.

use crate::store::SnapshotRecord;

/// Select the snapshots to destroy from a newest-first list.
///
/// Returns the tail beyond `keep_count`: the `len - keep_count` oldest
/// entries. A `keep_count` of 0 disables pruning entirely rather than
/// selecting everything.
pub fn select_for_deletion(matching: &[SnapshotRecord], keep_count: usize) -> &[SnapshotRecord] {
    if keep_count == 0 || matching.len() <= keep_count {
        return &[];
    }
    &matching[keep_count..]
}
