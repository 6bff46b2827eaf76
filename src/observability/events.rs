//! Lifecycle events worth a structured diagnostic log line
//!
//! These are supplementary to the plain-text command output required by
//! the external interface; they go to stderr (`Logger::log_stderr`) so
//! they never interleave with the protocol output on stdout.

use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event {
    TransactionBegan,
    TransactionCommitted,
    TransactionAborted,
    SiteFailed,
    SiteRecovered,
    WaitingReadResumed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::TransactionBegan => "TRANSACTION_BEGAN",
            Event::TransactionCommitted => "TRANSACTION_COMMITTED",
            Event::TransactionAborted => "TRANSACTION_ABORTED",
            Event::SiteFailed => "SITE_FAILED",
            Event::SiteRecovered => "SITE_RECOVERED",
            Event::WaitingReadResumed => "WAITING_READ_RESUMED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
