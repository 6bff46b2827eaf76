//! SerializationGraph - explicit RW edges between concurrent transactions
//!
//! Per §3 and §9: only RW (anti-dependency) edges are tracked explicitly,
//! as an adjacency map keyed by transaction id holding outgoing edges.
//! Inferred WR and WW edges are derived on demand elsewhere (`validation`)
//! from the snapshot-reads map and the commit history; this type owns
//! none of that — it is purely the RW adjacency.

use std::collections::{HashMap, HashSet};

use crate::model::TransactionId;

/// Adjacency map of explicit RW edges: `edges[a]` is the set of
/// transactions `a` has an outgoing `a --RW--> b` edge to.
#[derive(Clone, Debug, Default)]
pub struct SerializationGraph {
    edges: HashMap<TransactionId, HashSet<TransactionId>>,
}

impl SerializationGraph {
    pub fn new() -> Self {
        Self {
            edges: HashMap::new(),
        }
    }

    /// Insert `from --RW--> to`. Idempotent.
    pub fn insert_rw(&mut self, from: TransactionId, to: TransactionId) {
        self.edges.entry(from).or_default().insert(to);
    }

    /// Outgoing RW neighbours of `tid`.
    pub fn outgoing(&self, tid: &TransactionId) -> impl Iterator<Item = &TransactionId> {
        self.edges.get(tid).into_iter().flatten()
    }

    /// Transactions with an outgoing RW edge into `tid`.
    pub fn incoming(&self, tid: &TransactionId) -> Vec<TransactionId> {
        self.edges
            .iter()
            .filter(|(_, targets)| targets.contains(tid))
            .map(|(from, _)| from.clone())
            .collect()
    }

    /// Per §3: on abort, purge every edge to or from `tid`.
    pub fn purge(&mut self, tid: &TransactionId) {
        self.edges.remove(tid);
        for targets in self.edges.values_mut() {
            targets.remove(tid);
        }
    }

    /// DFS reachability over explicit RW edges only, marking visited
    /// nodes so it terminates on cyclic graphs (§4.3.6, §9).
    pub fn reaches(&self, from: &TransactionId, to: &TransactionId) -> bool {
        let mut visited = HashSet::new();
        self.reaches_inner(from, to, &mut visited)
    }

    fn reaches_inner(
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
        self.outgoing(from).any(|next| self.reaches_inner(next, to, visited))
    }
}
