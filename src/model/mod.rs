//! Shared value types
//!
//! Pure data and pure rules with no subsystem-owned state: the logical
//! clock, the fixed variable/site topology, and transaction bookkeeping
//! types. Everything here is a PURE TYPE — behavior that needs process
//! state (the site store, the serialization graph) lives in `site`,
//! `replication` and `txn`.

mod clock;
mod transaction;
mod variable;

pub use clock::{LogicalClock, LogicalTime};
pub use transaction::{ReadEntry, Transaction, TransactionId, TransactionStatus, WriteEntry, Writer};
pub use variable::{SiteId, VariableId, SITE_COUNT, VAR_COUNT};
