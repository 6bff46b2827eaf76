//! Structured diagnostic logging
//!
//! The command protocol's required output (§6) is plain text on stdout,
//! produced directly by the CLI driver. This module covers the ambient
//! concern underneath it: structured, deterministic JSON diagnostics on
//! stderr for transaction and site lifecycle events, in the same shape
//! the rest of this codebase's logging uses.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Log a lifecycle event to stderr with the given fields. Aborts log at
/// `Severity::Warn`; everything else logs at `Severity::Info`.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    let severity = match event {
        Event::TransactionAborted => Severity::Warn,
        _ => Severity::Info,
    };
    Logger::log_stderr(severity, event.as_str(), fields);
}
