//! TransactionManager - SSI + Available Copies brain
//!
//! Grounded on `original_source/src/transaction_manager.py`'s
//! `TransactionManager`: owns every in-flight transaction, the
//! serialization graph, the commit history, and the waiting queue, and
//! drives the per-command protocol in §4.3. Command handlers return the
//! exact output lines the external interface (§6) specifies; the CLI
//! layer only prints them.

use std::collections::{HashMap, HashSet};

use crate::model::{
    LogicalClock, LogicalTime, ReadEntry, SiteId, Transaction, TransactionId, TransactionStatus,
    VariableId, WriteEntry, Writer,
};
use crate::observability::{self, Event};
use crate::replication::SiteManager;
use crate::txn::errors::{AbortCause, UnknownTransaction};
use crate::txn::graph::SerializationGraph;
use crate::txn::validation::{CommitHistory, CycleCheck, SnapshotReads};
use crate::txn::waiting::{WaitQueue, WaitingOperation};

/// The full per-process database state: sites, transactions, and the
/// bookkeeping SSI validation needs.
pub struct TransactionManager {
    site_manager: SiteManager,
    clock: LogicalClock,
    transactions: HashMap<TransactionId, Transaction>,
    transaction_order: Vec<TransactionId>,
    commit_history: CommitHistory,
    graph: SerializationGraph,
    snapshot_reads: SnapshotReads,
    waiting: WaitQueue,
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionManager {
    pub fn new() -> Self {
        Self {
            site_manager: SiteManager::new(),
            clock: LogicalClock::new(),
            transactions: HashMap::new(),
            transaction_order: Vec::new(),
            commit_history: CommitHistory::new(),
            graph: SerializationGraph::new(),
            snapshot_reads: SnapshotReads::new(),
            waiting: WaitQueue::new(),
        }
    }

    /// Advance the logical clock by one. Per §4.3.1, called once before
    /// every input command, including no-ops.
    pub fn advance(&mut self) -> LogicalTime {
        self.clock.tick()
    }

    pub fn now(&self) -> LogicalTime {
        self.clock.now()
    }

    fn unknown_transaction(tid: &TransactionId) -> Vec<String> {
        vec![UnknownTransaction(tid.to_string()).to_string()]
    }

    // ---- 4.3.2 begin ----

    pub fn begin(&mut self, tid: TransactionId) -> Vec<String> {
        let txn = Transaction::new(tid.clone(), self.now());
        let line = format!("{} begins", tid);
        if !self.transactions.contains_key(&tid) {
            self.transaction_order.push(tid.clone());
        }
        observability::log_event(Event::TransactionBegan, &[("tid", tid.as_str())]);
        self.transactions.insert(tid, txn);
        vec![line]
    }

    // ---- snapshot writer lookup, shared by read and cycle detection ----

    fn snapshot_writer(&self, var: VariableId, start_time: LogicalTime) -> Writer {
        let mut latest_writer = Writer::Init;
        let mut latest_time = LogicalTime::ZERO;
        if let Some(history) = self.commit_history.get(&var) {
            for (commit_time, writer) in history {
                if *commit_time <= start_time && *commit_time > latest_time {
                    latest_time = *commit_time;
                    latest_writer = writer.clone();
                }
            }
        }
        latest_writer
    }

    /// For every other transaction concurrent with `reader`, insert
    /// `reader --RW--> writer` if that transaction has `var` buffered
    /// for write (§4.3.4 step 1).
    fn check_rw_on_read(&mut self, reader: &TransactionId, var: VariableId) {
        let conflicting: Vec<TransactionId> = self
            .transactions
            .iter()
            .filter(|(tid, txn)| *tid != reader && txn.is_concurrent() && txn.write_set.contains_key(&var))
            .map(|(tid, _)| tid.clone())
            .collect();
        for other in conflicting {
            self.graph.insert_rw(reader.clone(), other);
        }
    }

    /// For every other transaction concurrent with `writer`, insert
    /// `reader --RW--> writer` if that transaction has `var` in its
    /// read set (§4.3.3).
    fn check_rw_on_write(&mut self, writer: &TransactionId, var: VariableId) {
        let conflicting: Vec<TransactionId> = self
            .transactions
            .iter()
            .filter(|(tid, txn)| *tid != writer && txn.is_concurrent() && txn.read_set.contains_key(&var))
            .map(|(tid, _)| tid.clone())
            .collect();
        for other in conflicting {
            self.graph.insert_rw(other, writer.clone());
        }
    }

    /// Try to serve `var` from any up host, recording the read if
    /// successful. Shared by the first read attempt and waiting-read
    /// resumption (§4.3.4 step 1, §4.3.8).
    fn attempt_snapshot_read(&mut self, tid: &TransactionId, var: VariableId) -> Option<String> {
        let start_time = self.transactions.get(tid)?.start_time;
        let (site_id, value) = {
            let (site_id, version) = self.site_manager.snapshot_read(var, start_time)?;
            (site_id, version.value)
        };
        let writer = self.snapshot_writer(var, start_time);
        if let Some(txn) = self.transactions.get_mut(tid) {
            txn.read_set.insert(var, ReadEntry { value, site: site_id });
        }
        self.snapshot_reads.entry(tid.clone()).or_default().insert(var, writer);
        self.check_rw_on_read(tid, var);
        Some(format!("{}: {}", var, value))
    }

    // ---- 4.3.4 read ----

    pub fn read(&mut self, tid: &TransactionId, var: VariableId) -> Vec<String> {
        if !self.transactions.contains_key(tid) {
            return Self::unknown_transaction(tid);
        }

        let txn = self.transactions.get(tid).unwrap();
        if txn.status == TransactionStatus::Aborted {
            return Vec::new();
        }
        if let Some(entry) = txn.write_set.get(&var) {
            return vec![format!("{}: {}", var, entry.value)];
        }
        if let Some(entry) = txn.read_set.get(&var) {
            return vec![format!("{}: {}", var, entry.value)];
        }
        let start_time = txn.start_time;

        if let Some(line) = self.attempt_snapshot_read(tid, var) {
            return vec![line];
        }

        if var.is_replicated() && !self.site_manager.has_potential_host(var, start_time) {
            self.abort(tid, AbortCause::NoValidReplica);
            return vec![format!("{} aborts", tid)];
        }

        let txn = self.transactions.get_mut(tid).unwrap();
        txn.status = TransactionStatus::Waiting;
        txn.waiting_for = Some(var);
        let required_sites: HashSet<SiteId> = self.site_manager.sites_hosting(var).into_iter().collect();
        self.waiting.push(WaitingOperation {
            tid: tid.clone(),
            var,
            required_sites,
        });
        vec![format!("{} waiting for {} (no available site)", tid, var)]
    }

    // ---- 4.3.3 write ----

    pub fn write(&mut self, tid: &TransactionId, var: VariableId, value: i64) -> Vec<String> {
        if !self.transactions.contains_key(tid) {
            return Self::unknown_transaction(tid);
        }
        if self.transactions.get(tid).unwrap().status == TransactionStatus::Aborted {
            return Vec::new();
        }

        let now = self.now();
        let up_sites: HashSet<SiteId> = self.site_manager.up_sites_hosting(var).into_iter().collect();

        {
            let txn = self.transactions.get_mut(tid).unwrap();
            txn.write_set.insert(
                var,
                WriteEntry {
                    value,
                    sites_at_write_time: up_sites.clone(),
                },
            );
            txn.sites_written.extend(up_sites.iter().copied());
            for site in &up_sites {
                txn.site_write_time.entry(*site).or_insert(now);
            }
        }

        self.check_rw_on_write(tid, var);

        if up_sites.is_empty() {
            vec![format!("{} writes {}={} (no sites available)", tid, var, value)]
        } else {
            let mut sites: Vec<SiteId> = up_sites.into_iter().collect();
            sites.sort();
            let joined = sites
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            vec![format!("{} writes {}={} to sites: {}", tid, var, value, joined)]
        }
    }

    // ---- 4.3.5 end ----

    pub fn end(&mut self, tid: &TransactionId) -> Vec<String> {
        if !self.transactions.contains_key(tid) {
            return Self::unknown_transaction(tid);
        }

        let status = self.transactions.get(tid).unwrap().status;
        match status {
            TransactionStatus::Aborted => return vec![format!("{} aborts", tid)],
            TransactionStatus::Waiting => {
                self.abort(tid, AbortCause::WaitingAtEnd);
                return vec![format!("{} aborts", tid)];
            }
            _ => {}
        }

        if let Some(cause) = self.validate(tid) {
            self.abort(tid, cause);
            return vec![format!("{} aborts", tid)];
        }

        self.commit(tid);
        observability::log_event(Event::TransactionCommitted, &[("tid", tid.as_str())]);
        vec![format!("{} commits", tid)]
    }

    /// Run the three ordered validation rules in §4.3.5. Returns the
    /// first that fails, if any.
    fn validate(&self, tid: &TransactionId) -> Option<AbortCause> {
        let txn = self.transactions.get(tid)?;

        let mut sites_written: Vec<SiteId> = txn.sites_written.iter().copied().collect();
        sites_written.sort();
        for site in sites_written {
            let write_time = txn.site_write_time.get(&site).copied().unwrap_or(txn.start_time);
            if self.site_manager.failed_after(site, write_time) {
                return Some(AbortCause::SiteFailedAfterWrite);
            }
        }

        for var in txn.write_set.keys() {
            if let Some(history) = self.commit_history.get(var) {
                for (commit_time, writer) in history {
                    let is_other = !matches!(writer, Writer::Transaction(w) if w == tid);
                    if *commit_time > txn.start_time && is_other {
                        return Some(AbortCause::FirstCommitterWins);
                    }
                }
            }
        }

        let check = CycleCheck {
            graph: &self.graph,
            transactions: &self.transactions,
            commit_history: &self.commit_history,
            snapshot_reads: &self.snapshot_reads,
        };
        if check.would_create_dangerous_cycle(tid) {
            return Some(AbortCause::SsiDangerousCycle);
        }

        None
    }

    fn commit(&mut self, tid: &TransactionId) {
        let commit_time = self.now();
        let write_set = self.transactions.get(tid).unwrap().write_set.clone();

        for (var, entry) in &write_set {
            let current_up: HashSet<SiteId> = self.site_manager.up_sites_hosting(*var).into_iter().collect();
            let mut sites_to_write: Vec<SiteId> = entry
                .sites_at_write_time
                .intersection(&current_up)
                .copied()
                .collect();
            sites_to_write.sort();
            self.site_manager.apply_commit_at(
                &sites_to_write,
                *var,
                entry.value,
                commit_time,
                Writer::Transaction(tid.clone()),
            );
            self.commit_history
                .entry(*var)
                .or_default()
                .push((commit_time, Writer::Transaction(tid.clone())));
        }

        self.transactions.get_mut(tid).unwrap().status = TransactionStatus::Committed;
    }

    fn abort(&mut self, tid: &TransactionId, cause: AbortCause) {
        if let Some(txn) = self.transactions.get_mut(tid) {
            txn.status = TransactionStatus::Aborted;
        }
        self.graph.purge(tid);
        self.waiting.drop_transaction(tid);
        observability::log_event(
            Event::TransactionAborted,
            &[("tid", tid.as_str()), ("cause", cause.code())],
        );
    }

    // ---- 4.3.7 / 4.3.8 failure, recovery, resumption ----

    pub fn fail_site(&mut self, site: SiteId) -> Vec<String> {
        let now = self.now();
        self.site_manager.fail(site, now);
        let site_str = site.to_string();
        observability::log_event(Event::SiteFailed, &[("site", site_str.as_str())]);
        vec![format!("Site {} failed", site)]
    }

    pub fn recover_site(&mut self, site: SiteId) -> Vec<String> {
        let now = self.now();
        self.site_manager.recover(site, now);
        let site_str = site.to_string();
        observability::log_event(Event::SiteRecovered, &[("site", site_str.as_str())]);
        let mut lines = vec![format!("Site {} recovered", site)];
        lines.extend(self.process_waiting_operations());
        lines
    }

    fn process_waiting_operations(&mut self) -> Vec<String> {
        let pending: Vec<WaitingOperation> = self.waiting.iter().cloned().collect();
        let mut resumed_lines = Vec::new();
        let mut resumed_tids = Vec::new();

        for op in &pending {
            let still_waiting = self
                .transactions
                .get(&op.tid)
                .map(|t| t.status == TransactionStatus::Waiting)
                .unwrap_or(false);
            if !still_waiting {
                continue;
            }
            if let Some(line) = self.attempt_snapshot_read(&op.tid, op.var) {
                observability::log_event(
                    Event::WaitingReadResumed,
                    &[("tid", op.tid.as_str()), ("var", &op.var.to_string())],
                );
                resumed_lines.push(line);
                resumed_tids.push(op.tid.clone());
            }
        }

        for tid in &resumed_tids {
            if let Some(txn) = self.transactions.get_mut(tid) {
                txn.status = TransactionStatus::Active;
                txn.waiting_for = None;
            }
        }
        self.waiting.retry_all(|op| resumed_tids.contains(&op.tid));

        resumed_lines
    }

    // ---- 4.3.9 dump ----

    pub fn dump(&self) -> Vec<String> {
        self.site_manager
            .dump()
            .into_iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(site, rows)| {
                let body = rows
                    .iter()
                    .map(|(var, value)| format!("{}: {}", var, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("site {} - {}", site, body)
            })
            .collect()
    }

    // ---- querystate (diagnostic, format unconstrained per §6) ----

    pub fn query_state(&self) -> Vec<String> {
        let mut lines = vec![
            String::new(),
            "=== System State ===".to_string(),
            format!("Current time: {}", self.now()),
            String::new(),
            "--- Sites ---".to_string(),
        ];
        for site in SiteId::all() {
            let status = if self.site_manager.is_up(site) { "UP" } else { "DOWN" };
            lines.push(format!("Site {}: {}", site, status));
        }

        lines.push(String::new());
        lines.push("--- Transactions ---".to_string());
        for tid in &self.transaction_order {
            let txn = match self.transactions.get(tid) {
                Some(t) => t,
                None => continue,
            };
            lines.push(format!(
                "{}: status={:?}, start={}",
                tid, txn.status, txn.start_time
            ));
        }

        lines.push(String::new());
        lines.push("--- Waiting Operations ---".to_string());
        for op in self.waiting.iter() {
            lines.push(format!("{} waiting for {}", op.tid, op.var));
        }

        lines.push("===================".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VariableId as Var;

    fn tid(s: &str) -> TransactionId {
        TransactionId::new(s)
    }

    #[test]
    fn test_begin_emits_begins_line() {
        let mut tm = TransactionManager::new();
        tm.advance();
        assert_eq!(tm.begin(tid("T1")), vec!["T1 begins".to_string()]);
    }

    #[test]
    fn test_read_own_buffered_write() {
        let mut tm = TransactionManager::new();
        tm.advance();
        tm.begin(tid("T1"));
        tm.advance();
        tm.write(&tid("T1"), Var::new(1), 101);
        tm.advance();
        assert_eq!(tm.read(&tid("T1"), Var::new(1)), vec!["x1: 101".to_string()]);
    }

    #[test]
    fn test_unknown_transaction_reported() {
        let mut tm = TransactionManager::new();
        tm.advance();
        let out = tm.read(&tid("T9"), Var::new(1));
        assert_eq!(out, vec!["Error: Transaction T9 not found".to_string()]);
    }

    #[test]
    fn test_first_committer_wins_scenario() {
        let mut tm = TransactionManager::new();
        tm.advance();
        tm.begin(tid("T1"));
        tm.advance();
        tm.begin(tid("T2"));
        tm.advance();
        tm.write(&tid("T1"), Var::new(1), 101);
        tm.advance();
        tm.write(&tid("T2"), Var::new(1), 201);
        tm.advance();
        tm.write(&tid("T1"), Var::new(2), 102);
        tm.advance();
        tm.write(&tid("T2"), Var::new(2), 202);
        tm.advance();
        assert_eq!(tm.end(&tid("T2")), vec!["T2 commits".to_string()]);
        tm.advance();
        assert_eq!(tm.end(&tid("T1")), vec!["T1 aborts".to_string()]);

        let dump = tm.dump();
        assert!(dump.iter().any(|l| l.contains("x1: 201")));
        assert!(dump.iter().any(|l| l.contains("x2: 202")));
    }

    #[test]
    fn test_snapshot_isolation_scenario() {
        let mut tm = TransactionManager::new();
        tm.advance();
        tm.begin(tid("T1"));
        tm.advance();
        tm.begin(tid("T2"));
        tm.advance();
        tm.write(&tid("T1"), Var::new(2), 999);
        tm.advance();
        tm.end(&tid("T1"));
        tm.advance();
        assert_eq!(tm.read(&tid("T2"), Var::new(2)), vec!["x2: 20".to_string()]);
        tm.advance();
        assert_eq!(tm.end(&tid("T2")), vec!["T2 commits".to_string()]);
    }

    #[test]
    fn test_available_copies_abort_on_fail_after_write() {
        let mut tm = TransactionManager::new();
        tm.advance();
        tm.begin(tid("T1"));
        tm.advance();
        tm.write(&tid("T1"), Var::new(2), 222);
        tm.advance();
        tm.fail_site(SiteId::new(3));
        tm.advance();
        assert_eq!(tm.end(&tid("T1")), vec!["T1 aborts".to_string()]);
    }

    #[test]
    fn test_read_only_transaction_always_commits() {
        let mut tm = TransactionManager::new();
        tm.advance();
        tm.begin(tid("T1"));
        tm.advance();
        tm.read(&tid("T1"), Var::new(2));
        tm.advance();
        tm.fail_site(SiteId::new(4));
        tm.advance();
        assert_eq!(tm.end(&tid("T1")), vec!["T1 commits".to_string()]);
    }

    #[test]
    fn test_recovery_unblocks_waiting_read() {
        let mut tm = TransactionManager::new();
        tm.advance();
        tm.fail_site(SiteId::new(2));
        tm.advance();
        tm.begin(tid("T1"));
        tm.advance();
        let out = tm.read(&tid("T1"), Var::new(2));
        assert!(out[0].starts_with("x2:"));
    }
}
