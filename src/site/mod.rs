//! Site-local storage
//!
//! Each site owns its own multi-version store and its own failure
//! history, and answers snapshot-read requests purely from local state.
//! Cross-site coordination (which sites host a variable, which are up)
//! lives in `replication::SiteManager`, one layer up.

mod data_manager;
mod failure;
mod store;

pub use data_manager::{build_sites, Site, SnapshotReadRefusal};
pub use store::VariableVersion;
