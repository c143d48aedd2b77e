//! autosnap - scheduled ZFS snapshots with retention pruning.
//!
//! autosnap decides, for each volume opted into automatic snapshotting,
//! whether a new snapshot is due at the current instant, and prunes the
//! oldest matching snapshots beyond a configured keep count. It is built to
//! be invoked repeatedly (typically once a minute) by an external periodic
//! trigger: each invocation performs one pass and exits, and running twice
//! inside the same cadence period never produces two snapshots.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                       autosnap                          │
//! ├─────────────────────────────────────────────────────────┤
//! │  Orchestrator: one pass over all enabled volumes        │
//! ├─────────────────────────────────────────────────────────┤
//! │  Schedule: cadence config | due-evaluation              │
//! │  Retention: keep-count pruning                          │
//! ├─────────────────────────────────────────────────────────┤
//! │  Collaborators: Discovery | SnapshotStore               │
//! │  (ZFS user properties / zfs list·snapshot·destroy)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The process holds no state between invocations. Every decision is
//! re-derived from what the collaborators report, so overlapping or missed
//! invocations converge on their own.
//!
//! # Quick Start
//!
//! ```no_run
//! use autosnap::config::AutosnapConfig;
//!
//! #[tokio::main]
//! async fn main() -> autosnap::Result<()> {
//!     let config = AutosnapConfig::default();
//!     autosnap::observability::init(&config.observability)?;
//!     let summary = autosnap::run(config).await?;
//!     println!("created {} snapshots", summary.snapshots_created);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod observability;
pub mod orchestrator;
pub mod retention;
pub mod schedule;
pub mod store;
pub mod zfs;

// Re-exports
pub use error::{AutosnapError, Result};
pub use orchestrator::{Orchestrator, PassSummary};

use chrono::Utc;
use config::AutosnapConfig;
use std::sync::Arc;
use zfs::{CommandRunner, ZfsPropertyDiscovery, ZfsSnapshotStore};

/// Run one evaluation pass with the ZFS-backed collaborators.
pub async fn run(config: AutosnapConfig) -> Result<PassSummary> {
    let runner = CommandRunner::new(config.zfs.binary.clone(), config.zfs.command_timeout);
    let discovery = Arc::new(ZfsPropertyDiscovery::new(
        runner.clone(),
        config.snapshot.clone(),
    ));
    let store = Arc::new(ZfsSnapshotStore::new(runner));

    let orchestrator = Orchestrator::new(discovery, store, config.snapshot);
    Ok(orchestrator.run_pass(Utc::now()).await)
}
