//! AbortCause - the error taxonomy for transaction aborts
//!
//! Grounded on the teacher's hand-rolled per-subsystem error enum
//! convention (`cli/errors.rs`, `storage/errors.rs`): a plain enum with
//! a stable `code()` and a human `message()`, no `thiserror`.

use std::fmt;

/// Why a transaction was aborted, per §7.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AbortCause {
    NoValidReplica,
    SiteFailedAfterWrite,
    FirstCommitterWins,
    SsiDangerousCycle,
    WaitingAtEnd,
}

impl AbortCause {
    /// A stable machine-readable identifier, matching the taxonomy names
    /// in the error handling design.
    pub fn code(&self) -> &'static str {
        match self {
            AbortCause::NoValidReplica => "no-valid-replica",
            AbortCause::SiteFailedAfterWrite => "site-failed-after-write",
            AbortCause::FirstCommitterWins => "first-committer-wins",
            AbortCause::SsiDangerousCycle => "ssi-dangerous-cycle",
            AbortCause::WaitingAtEnd => "waiting-at-end",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AbortCause::NoValidReplica => {
                "no host was continuously up since the last in-snapshot commit"
            }
            AbortCause::SiteFailedAfterWrite => "a written-to site failed after the write",
            AbortCause::FirstCommitterWins => "a concurrent writer committed this variable first",
            AbortCause::SsiDangerousCycle => {
                "committing would close a cycle with consecutive RW edges"
            }
            AbortCause::WaitingAtEnd => "transaction ended while still parked on a read",
        }
    }
}

impl fmt::Display for AbortCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.message())
    }
}

/// A protocol-level error: the operation references an unregistered
/// transaction id. Reported to the operator without mutating any
/// transaction state (§7).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownTransaction(pub String);

impl fmt::Display for UnknownTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: Transaction {} not found", self.0)
    }
}
