//! ZFS-backed collaborator implementations.
//!
//! The discovery and store traits are implemented here by spawning the
//! `zfs` command, one short-lived invocation per operation, each bounded by
//! the configured deadline.

pub mod command;
pub mod parse;

mod discovery;
mod store;

pub use command::CommandRunner;
pub use discovery::ZfsPropertyDiscovery;
pub use store::ZfsSnapshotStore;
