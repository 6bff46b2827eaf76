//! Site - one node's store, failure history, and snapshot-read rule
//!
//! Grounded on `original_source/src/site_manager.py`'s `Site` class: each
//! site owns its own copies of the variables it hosts and answers
//! "can I serve a snapshot read of `var` as of `start_time`" purely from
//! its own state, with no knowledge of other sites.

use crate::model::{LogicalTime, VariableId, Writer, SITE_COUNT, VAR_COUNT};
use crate::site::failure::FailureHistory;
use crate::site::store::{VariableStore, VariableVersion};

/// One site in the fixed ten-site topology.
#[derive(Clone, Debug)]
pub struct Site {
    store: VariableStore,
    failures: FailureHistory,
}

/// Why a snapshot read at this site was refused.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SnapshotReadRefusal {
    /// The site is currently down.
    SiteDown,
    /// A transaction starting on or after the last recovery cannot read
    /// a replicated variable until it has been recommitted there.
    NotYetReadable,
    /// No version exists with `commit_time <= start_time`, or the most
    /// recent such version was not visible under a continuously-up window.
    NoVisibleVersion,
}

impl Site {
    /// Build a site and seed it with the variables it hosts per §3:
    /// every even-indexed variable, plus the odd-indexed variable whose
    /// home site this is.
    pub fn new(id: u32) -> Self {
        let mut store = VariableStore::new();
        for var in VariableId::all() {
            if var.is_replicated() || var.home_site().value() == id {
                store.seed(var);
            }
        }
        Self {
            store,
            failures: FailureHistory::new(),
        }
    }

    pub fn hosts(&self, var: VariableId) -> bool {
        self.store.has(var)
    }

    pub fn is_up(&self) -> bool {
        self.failures.is_up()
    }

    pub fn fail(&mut self, at: LogicalTime) {
        self.failures.fail(at);
    }

    pub fn failed_after(&self, at: LogicalTime) -> bool {
        self.failures.failed_after(at)
    }

    /// Per §4.1 `recover(t)`: mark up, clear readability on replicated
    /// variables this site hosts.
    pub fn recover(&mut self, at: LogicalTime) {
        self.failures.recover(at);
        self.store.clear_replicated_readability();
    }

    /// Attempt a snapshot read of `var` as of `start_time`, per §4.1:
    /// - Non-replicated: readable iff a version with
    ///   `commit_time <= start_time` exists.
    /// - Replicated: if the transaction started on or after this site's
    ///   last recovery and the readability flag is still clear, refuse
    ///   outright. Otherwise take the newest version with
    ///   `commit_time <= start_time` and accept it only if the site was
    ///   continuously up across `[commit_time, start_time)` — older
    ///   versions are never consulted as a fallback.
    pub fn snapshot_read(
        &self,
        var: VariableId,
        start_time: LogicalTime,
    ) -> Result<&VariableVersion, SnapshotReadRefusal> {
        if !self.is_up() {
            return Err(SnapshotReadRefusal::SiteDown);
        }
        if var.is_replicated() {
            let last_recovery = self.failures.last_recovery_time();
            let began_after_recovery = last_recovery > LogicalTime::ZERO && start_time >= last_recovery;
            if began_after_recovery && !self.store.is_readable(var) {
                return Err(SnapshotReadRefusal::NotYetReadable);
            }
        }
        let version = self
            .store
            .version_as_of(var, start_time)
            .ok_or(SnapshotReadRefusal::NoVisibleVersion)?;
        if var.is_replicated()
            && !self.failures.continuously_up_since(version.commit_time, start_time)
        {
            return Err(SnapshotReadRefusal::NoVisibleVersion);
        }
        Ok(version)
    }

    /// Could this site ever serve a valid snapshot of `var` as of
    /// `start_time`, regardless of whether it is up *right now*? Used by
    /// the "no valid replica" abort check (§4.3.4 step 2): it considers
    /// every host, not just currently-up ones, because a host that later
    /// failed may still hold a version this transaction could have read.
    /// Ignores the readability flag entirely, matching the reference
    /// site manager's direct version walk.
    pub fn could_ever_serve(&self, var: VariableId, start_time: LogicalTime) -> bool {
        match self.store.version_as_of(var, start_time) {
            Some(version) => self
                .failures
                .continuously_up_since(version.commit_time, start_time),
            None => false,
        }
    }

    /// Apply a committed write to a hosted variable. Per §4.1: prepends
    /// a version and sets the readability flag.
    pub fn apply_commit(&mut self, var: VariableId, value: i64, commit_time: LogicalTime, writer: Writer) {
        self.store.apply_commit(var, value, commit_time, writer);
    }

    /// Every hosted variable's current value, for `dump()` (§4.2, §4.3.9).
    pub fn dump(&self) -> Vec<(VariableId, i64)> {
        let mut rows: Vec<(VariableId, i64)> = self
            .store
            .hosted_vars()
            .filter_map(|v| self.store.latest_value(v).map(|val| (v, val)))
            .collect();
        rows.sort_by_key(|(v, _)| v.index());
        rows
    }
}

/// Build all ten sites with their fixed variable placements.
pub fn build_sites() -> Vec<Site> {
    (1..=SITE_COUNT).map(Site::new).collect()
}
