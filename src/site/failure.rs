//! FailureHistory - per-site up/down interval tracking
//!
//! Per §4.1 and §4.3.8: a site is up or down; `fail`/`recover` toggle it
//! and record the logical time of the transition. The history of
//! down-intervals is what lets a snapshot read decide whether a
//! replicated variable was continuously up across `[commit_time, start_time)`.

use crate::model::LogicalTime;

/// One interval during which a site was down: `[failed_at, recovered_at)`.
/// `recovered_at == None` means the site is still down.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct DownInterval {
    failed_at: LogicalTime,
    recovered_at: Option<LogicalTime>,
}

/// Tracks whether a site is currently up and the full history of its
/// down intervals.
#[derive(Clone, Debug)]
pub struct FailureHistory {
    up: bool,
    intervals: Vec<DownInterval>,
}

impl Default for FailureHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureHistory {
    pub fn new() -> Self {
        Self {
            up: true,
            intervals: Vec::new(),
        }
    }

    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Record a failure at `at`. No-op per §4.3.8 if already down.
    pub fn fail(&mut self, at: LogicalTime) {
        if !self.up {
            return;
        }
        self.up = false;
        self.intervals.push(DownInterval {
            failed_at: at,
            recovered_at: None,
        });
    }

    /// Record a recovery at `at`. No-op per §4.3.8 if already up.
    pub fn recover(&mut self, at: LogicalTime) {
        if self.up {
            return;
        }
        self.up = true;
        if let Some(last) = self.intervals.last_mut() {
            last.recovered_at = Some(at);
        }
    }

    /// The most recent recovery instant, or `LogicalTime::ZERO` if this
    /// site has never recovered (including "currently down"). Gates the
    /// replicated-variable readability check in `Site::snapshot_read`.
    pub fn last_recovery_time(&self) -> LogicalTime {
        self.intervals
            .last()
            .and_then(|i| i.recovered_at)
            .unwrap_or(LogicalTime::ZERO)
    }

    /// Did a failure occur strictly after `at`? Used by the
    /// Available-Copies validation rule: a write survives only if its
    /// target site stayed up from the write through commit.
    pub fn failed_after(&self, at: LogicalTime) -> bool {
        self.intervals.iter().any(|i| i.failed_at > at)
    }

    /// True iff no down interval overlaps `[from_time, to_time)` — a
    /// half-open window, matching the reference site manager exactly:
    /// a failure at `to_time` does not break continuity, but a failure
    /// still ongoing at `from_time` does.
    pub fn continuously_up_since(&self, from_time: LogicalTime, to_time: LogicalTime) -> bool {
        for interval in &self.intervals {
            if interval.failed_at > from_time && interval.failed_at < to_time {
                return false;
            }
            if interval.failed_at <= from_time {
                let still_down_at_from = match interval.recovered_at {
                    None => true,
                    Some(r) => r > from_time,
                };
                if still_down_at_from {
                    return false;
                }
            }
        }
        true
    }
}
