//! Transaction - in-flight transaction state
//!
//! Per §3: a transaction is identified by an opaque string id and carries
//! a read set, a write set, the sites it has touched, and a status.
//!
//! Per DESIGN NOTES (§9): status is a finite sum type, not a runtime-typed
//! tag or dispatch table.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::clock::LogicalTime;
use super::variable::{SiteId, VariableId};

/// An opaque transaction identifier, e.g. `"T1"`. Ids are assumed unique;
/// re-use by the operator is unspecified (§4.3.2).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies whoever committed a version: the synthetic `"init"` writer
/// at logical time 0, or a real transaction.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Writer {
    Init,
    Transaction(TransactionId),
}

impl fmt::Display for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Writer::Init => write!(f, "init"),
            Writer::Transaction(tid) => write!(f, "{}", tid),
        }
    }
}

/// Per §3: one of four finite transaction states.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransactionStatus {
    Active,
    Waiting,
    Committed,
    Aborted,
}

/// A single read-set entry: the value observed and the site it came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReadEntry {
    pub value: i64,
    pub site: SiteId,
}

/// A single write-set entry: the buffered value and the sites that were up
/// when the write was issued (§4.3.3). At-most-one entry per variable;
/// last write wins within a transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WriteEntry {
    pub value: i64,
    pub sites_at_write_time: HashSet<SiteId>,
}

/// An in-flight or terminal transaction.
///
/// Per §3: all fields below are exactly the transaction's tracked state;
/// nothing here is derived lazily from the serialization graph or commit
/// history, which the Transaction Manager owns separately.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub id: TransactionId,
    pub start_time: LogicalTime,
    pub status: TransactionStatus,
    pub read_set: HashMap<VariableId, ReadEntry>,
    pub write_set: HashMap<VariableId, WriteEntry>,
    pub sites_written: HashSet<SiteId>,
    pub site_write_time: HashMap<SiteId, LogicalTime>,
    pub waiting_for: Option<VariableId>,
}

impl Transaction {
    pub fn new(id: TransactionId, start_time: LogicalTime) -> Self {
        Self {
            id,
            start_time,
            status: TransactionStatus::Active,
            read_set: HashMap::new(),
            write_set: HashMap::new(),
            sites_written: HashSet::new(),
            site_write_time: HashMap::new(),
            waiting_for: None,
        }
    }

    /// True for `Active` or `Waiting` — per §9 Open Question 3, a parked
    /// transaction is treated as concurrent for RW-edge insertion, exactly
    /// like an active one.
    pub fn is_concurrent(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Active | TransactionStatus::Waiting
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction_is_active() {
        let txn = Transaction::new(TransactionId::new("T1"), LogicalTime::new(5));
        assert!(matches!(txn.status, TransactionStatus::Active));
        assert_eq!(txn.start_time, LogicalTime::new(5));
        assert!(txn.read_set.is_empty());
        assert!(txn.write_set.is_empty());
    }

    #[test]
    fn test_concurrency_classification() {
        let mut txn = Transaction::new(TransactionId::new("T1"), LogicalTime::ZERO);
        assert!(txn.is_concurrent());
        txn.status = TransactionStatus::Waiting;
        assert!(txn.is_concurrent());
        txn.status = TransactionStatus::Committed;
        assert!(!txn.is_concurrent());
        txn.status = TransactionStatus::Aborted;
        assert!(!txn.is_concurrent());
    }

    #[test]
    fn test_writer_display() {
        assert_eq!(Writer::Init.to_string(), "init");
        assert_eq!(
            Writer::Transaction(TransactionId::new("T7")).to_string(),
            "T7"
        );
    }
}
