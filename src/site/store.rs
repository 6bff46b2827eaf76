//! VariableStore - per-site multi-version storage
//!
//! Per §3: a variable version is `(value, commit_time, writer)`. Versions
//! for a single variable form a list ordered strictly by descending
//! commit_time; "value as of T" is the first version with
//! `commit_time <= T`.
//!
//! This is close to a PURE DATA CONTAINER: it stores versions newest-first
//! and exposes the lookup-by-time rule, but the continuous-uptime gating
//! for replicated reads lives one level up in `DataManager::snapshot_read`
//! (it needs the failure history, which the store does not own).

use std::collections::HashMap;

use crate::model::{LogicalTime, VariableId, Writer};

/// A single immutable version of a variable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VariableVersion {
    pub value: i64,
    pub commit_time: LogicalTime,
    pub writer: Writer,
}

/// One variable's full version history plus its readability flag.
///
/// Per §4.1: the readability flag is meaningful only for replicated
/// variables; it is cleared at recovery and set by the next committed
/// write at this site. Non-replicated variables keep it `true` always.
#[derive(Clone, Debug)]
struct VariableEntry {
    versions: Vec<VariableVersion>,
    readable: bool,
}

/// The set of variables hosted at one site, with their version histories.
#[derive(Clone, Debug, Default)]
pub struct VariableStore {
    entries: HashMap<VariableId, VariableEntry>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Seed a hosted variable with its initial version, per §3: value
    /// `10*i`, committed at logical time 0 by `"init"`, immediately
    /// readable.
    pub fn seed(&mut self, var: VariableId) {
        self.entries.insert(
            var,
            VariableEntry {
                versions: vec![VariableVersion {
                    value: var.initial_value(),
                    commit_time: LogicalTime::ZERO,
                    writer: Writer::Init,
                }],
                readable: true,
            },
        );
    }

    pub fn has(&self, var: VariableId) -> bool {
        self.entries.contains_key(&var)
    }

    pub fn hosted_vars(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.entries.keys().copied()
    }

    /// Newest-first version list for a hosted variable.
    pub fn versions(&self, var: VariableId) -> &[VariableVersion] {
        self.entries
            .get(&var)
            .map(|e| e.versions.as_slice())
            .unwrap_or(&[])
    }

    /// First version with `commit_time <= at`, if any.
    pub fn version_as_of(&self, var: VariableId, at: LogicalTime) -> Option<&VariableVersion> {
        self.versions(var).iter().find(|v| v.commit_time <= at)
    }

    /// The latest stored value regardless of readability, for `dump()`
    /// (§4.2, §4.3.9).
    pub fn latest_value(&self, var: VariableId) -> Option<i64> {
        self.versions(var).first().map(|v| v.value)
    }

    pub fn is_readable(&self, var: VariableId) -> bool {
        self.entries.get(&var).map(|e| e.readable).unwrap_or(false)
    }

    /// Per §4.1 `recover(t)`: clear the readability flag for every
    /// replicated variable this store hosts. Non-replicated variables are
    /// left readable — they have no other replicas to reconcile with.
    pub fn clear_replicated_readability(&mut self) {
        for (var, entry) in self.entries.iter_mut() {
            if var.is_replicated() {
                entry.readable = false;
            }
        }
    }

    /// Per §4.1 `apply_commit`: prepend a version and mark readable.
    pub fn apply_commit(&mut self, var: VariableId, value: i64, commit_time: LogicalTime, writer: Writer) {
        if let Some(entry) = self.entries.get_mut(&var) {
            entry.versions.insert(
                0,
                VariableVersion {
                    value,
                    commit_time,
                    writer,
                },
            );
            entry.readable = true;
        }
    }
}
