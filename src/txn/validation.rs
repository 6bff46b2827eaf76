//! CycleCheck - the dangerous-cycle validation rule
//!
//! Grounded on the teacher's `mvcc/visibility.rs` pattern: a small struct
//! that borrows whatever state it needs and exposes one pure decision
//! function, with no state of its own. Mirrors
//! `original_source/src/transaction_manager.py`'s
//! `_would_create_dangerous_cycle` / `_can_reach_from_tid` /
//! `_can_reach_via_committed` exactly, per §4.3.6.

use std::collections::{HashMap, HashSet};

use crate::model::{LogicalTime, Transaction, TransactionId, TransactionStatus, VariableId, Writer};
use crate::txn::graph::SerializationGraph;

/// Per-variable commit history: an ordered list of `(commit_time, writer)`
/// for every committed version, independent of per-site version lists.
pub type CommitHistory = HashMap<VariableId, Vec<(LogicalTime, Writer)>>;

/// Per transaction, per variable: the writer identity of the version it
/// snapshot-read, used as the source of inferred WR edges.
pub type SnapshotReads = HashMap<TransactionId, HashMap<VariableId, Writer>>;

/// Borrows the transaction manager's state just long enough to answer
/// "would committing `tid` close a dangerous cycle".
pub struct CycleCheck<'a> {
    pub graph: &'a SerializationGraph,
    pub transactions: &'a HashMap<TransactionId, Transaction>,
    pub commit_history: &'a CommitHistory,
    pub snapshot_reads: &'a SnapshotReads,
}

impl<'a> CycleCheck<'a> {
    fn status_of(&self, tid: &TransactionId) -> Option<TransactionStatus> {
        self.transactions.get(tid).map(|t| t.status)
    }

    fn is_committed(&self, tid: &TransactionId) -> bool {
        self.status_of(tid) == Some(TransactionStatus::Committed)
    }

    pub fn would_create_dangerous_cycle(&self, tid: &TransactionId) -> bool {
        let txn = match self.transactions.get(tid) {
            Some(t) => t,
            None => return false,
        };

        for var in txn.write_set.keys() {
            let history = match self.commit_history.get(var) {
                Some(h) => h,
                None => continue,
            };
            for (_, writer) in history {
                let committed_tid = match writer {
                    Writer::Transaction(w) if w != tid => w,
                    _ => continue,
                };
                if !self.is_committed(committed_tid) {
                    continue;
                }
                if self.graph.reaches(tid, committed_tid) {
                    return true;
                }
            }
        }

        let incoming_rw: Vec<TransactionId> = self
            .graph
            .incoming(tid)
            .into_iter()
            .filter(|from| self.is_committed(from))
            .collect();

        let outgoing_rw: Vec<TransactionId> = self
            .graph
            .outgoing(tid)
            .filter(|to| self.is_committed(to))
            .cloned()
            .collect();

        for in_txn in &incoming_rw {
            for out_txn in &outgoing_rw {
                if self.can_reach_via_committed(out_txn, in_txn, &mut HashSet::new()) {
                    return true;
                }
            }
        }

        let active_incoming_rw: Vec<TransactionId> = self
            .graph
            .incoming(tid)
            .into_iter()
            .filter(|from| self.status_of(from) == Some(TransactionStatus::Active))
            .collect();

        for in_txn in &active_incoming_rw {
            for out_txn in &outgoing_rw {
                if self.can_reach_via_committed(out_txn, in_txn, &mut HashSet::new()) {
                    return true;
                }
            }
        }

        false
    }

    /// DFS that may only step through *committed* transactions, combining
    /// explicit RW edges with inferred WR edges read off `snapshot_reads`.
    fn can_reach_via_committed(
        &self,
        from: &TransactionId,
        to: &TransactionId,
        visited: &mut HashSet<TransactionId>,
    ) -> bool {
        if from == to {
            return true;
        }
        if !visited.insert(from.clone()) {
            return false;
        }
        if !self.transactions.contains_key(from) || !self.transactions.contains_key(to) {
            return false;
        }
        if !self.is_committed(from) {
            return false;
        }

        for next in self.graph.outgoing(from) {
            if self.can_reach_via_committed(next, to, visited) {
                return true;
            }
        }

        if let Some(to_txn) = self.transactions.get(to) {
            for var in to_txn.read_set.keys() {
                if let Some(writer) = self.snapshot_reads.get(to).and_then(|m| m.get(var)) {
                    if matches!(writer, Writer::Transaction(w) if w == from) {
                        return true;
                    }
                }
            }
        }

        false
    }
}
