//! ssidb - a deterministic, single-process replicated store implementing
//! Serializable Snapshot Isolation over Available Copies replication.
//!
//! Fixed ten-site, twenty-variable topology (§3); no persistence, no
//! network transport — commands arrive as plain text and the entire
//! process is one in-memory simulation of the protocol.

pub mod cli;
pub mod model;
pub mod observability;
pub mod parser;
pub mod replication;
pub mod site;
pub mod txn;
