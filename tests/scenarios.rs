//! End-to-end scenarios driving `TransactionManager` directly, covering
//! the six concrete scenarios and boundary behaviours.

use ssidb::model::{SiteId, TransactionId, VariableId};
use ssidb::txn::TransactionManager;

fn tid(s: &str) -> TransactionId {
    TransactionId::new(s)
}

fn var(i: u32) -> VariableId {
    VariableId::new(i)
}

fn site(i: u32) -> SiteId {
    SiteId::new(i)
}

/// Scenario 1: first-committer-wins.
#[test]
fn test_first_committer_wins() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    tm.begin(tid("T2"));
    tm.advance();
    tm.write(&tid("T1"), var(1), 101);
    tm.advance();
    tm.write(&tid("T2"), var(1), 201);
    tm.advance();
    tm.write(&tid("T1"), var(2), 102);
    tm.advance();
    tm.write(&tid("T2"), var(2), 202);
    tm.advance();
    assert_eq!(tm.end(&tid("T2")), vec!["T2 commits".to_string()]);
    tm.advance();
    assert_eq!(tm.end(&tid("T1")), vec!["T1 aborts".to_string()]);

    let dump = tm.dump();
    assert!(dump.iter().any(|l| l.contains("x1: 201")));
    assert!(dump.iter().any(|l| l.contains("x2: 202")));
}

/// Scenario 2: snapshot isolation of reads.
#[test]
fn test_snapshot_isolation_of_reads() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    tm.begin(tid("T2"));
    tm.advance();
    tm.write(&tid("T1"), var(2), 999);
    tm.advance();
    assert_eq!(tm.end(&tid("T1")), vec!["T1 commits".to_string()]);
    tm.advance();
    assert_eq!(tm.read(&tid("T2"), var(2)), vec!["x2: 20".to_string()]);
    tm.advance();
    assert_eq!(tm.end(&tid("T2")), vec!["T2 commits".to_string()]);

    let dump = tm.dump();
    assert!(dump.iter().any(|l| l.contains("x2: 999")));
}

/// Scenario 3: Available-Copies abort when a written-to site fails
/// after the write.
#[test]
fn test_available_copies_abort_on_post_write_failure() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    tm.write(&tid("T1"), var(2), 222);
    tm.advance();
    tm.fail_site(site(3));
    tm.advance();
    assert_eq!(tm.end(&tid("T1")), vec!["T1 aborts".to_string()]);
}

/// Scenario 4 (non-replicated variant): a read of a variable whose sole
/// host is down parks the transaction; recovery of that site resumes
/// the read and the transaction goes on to commit.
#[test]
fn test_recovery_unblocks_waiting_read_on_sole_host() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1")); // x1's home site is 2, still up here
    tm.advance();
    tm.fail_site(site(2));
    tm.advance();
    let out = tm.read(&tid("T1"), var(1));
    assert_eq!(out, vec!["T1 waiting for x1 (no available site)".to_string()]);
    tm.advance();
    let out = tm.recover_site(site(2));
    assert_eq!(out, vec!["Site 2 recovered".to_string(), "x1: 10".to_string()]);
    tm.advance();
    assert_eq!(tm.end(&tid("T1")), vec!["T1 commits".to_string()]);
}

/// Scenario 4 (replicated variant, as spelled out in the scenario note):
/// a replicated variable is served from any other up site immediately,
/// without parking.
#[test]
fn test_replicated_read_survives_single_site_failure() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.fail_site(site(2));
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    let out = tm.read(&tid("T1"), var(8));
    assert_eq!(out, vec!["x8: 80".to_string()]);
}

/// Scenario 5: an SSI pivot transaction aborts at its validation point
/// when committing it would close a cycle of RW edges.
#[test]
fn test_ssi_pivot_aborts_the_cycle_closer() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    tm.begin(tid("T2"));
    tm.advance();
    tm.begin(tid("T3"));
    tm.advance();
    tm.read(&tid("T1"), var(2));
    tm.advance();
    tm.read(&tid("T3"), var(1));
    tm.advance();
    tm.write(&tid("T1"), var(1), 111); // edge T3 --RW--> T1
    tm.advance();
    tm.write(&tid("T2"), var(2), 222); // edge T1 --RW--> T2
    tm.advance();
    tm.read(&tid("T2"), var(4));
    tm.advance();
    tm.write(&tid("T3"), var(4), 444); // edge T2 --RW--> T3, closing the cycle

    tm.advance();
    assert_eq!(tm.end(&tid("T1")), vec!["T1 commits".to_string()]);
    tm.advance();
    assert_eq!(tm.end(&tid("T2")), vec!["T2 commits".to_string()]);
    tm.advance();
    assert_eq!(tm.end(&tid("T3")), vec!["T3 aborts".to_string()]);
}

/// Scenario 6: a read-only transaction always commits.
#[test]
fn test_read_only_transaction_always_commits() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    tm.read(&tid("T1"), var(2));
    tm.advance();
    tm.fail_site(site(4));
    tm.advance();
    tm.fail_site(site(5));
    tm.advance();
    assert_eq!(tm.end(&tid("T1")), vec!["T1 commits".to_string()]);
}

/// Boundary behaviour: a transaction's own buffered write is visible to
/// itself even if every host of the variable later fails.
#[test]
fn test_read_own_write_survives_host_failures() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    tm.write(&tid("T1"), var(1), 500); // x1 hosted only at site 2
    tm.advance();
    tm.fail_site(site(2));
    tm.advance();
    assert_eq!(tm.read(&tid("T1"), var(1)), vec!["x1: 500".to_string()]);
}

/// Boundary behaviour: dump is idempotent.
#[test]
fn test_dump_is_idempotent() {
    let mut tm = TransactionManager::new();
    tm.advance();
    tm.begin(tid("T1"));
    tm.advance();
    tm.write(&tid("T1"), var(4), 40);
    tm.advance();
    tm.end(&tid("T1"));
    tm.advance();
    assert_eq!(tm.dump(), tm.dump());
}

/// Boundary behaviour: fail/recover with no intervening writes leaves
/// values unchanged.
#[test]
fn test_fail_recover_with_no_writes_preserves_values() {
    let mut tm = TransactionManager::new();
    let before = tm.dump();
    tm.advance();
    tm.fail_site(site(6));
    tm.advance();
    tm.recover_site(site(6));
    assert_eq!(tm.dump(), before);
}

/// An operation against an unregistered transaction id is reported and
/// mutates nothing.
#[test]
fn test_unknown_transaction_is_reported() {
    let mut tm = TransactionManager::new();
    tm.advance();
    assert_eq!(
        tm.read(&tid("T9"), var(1)),
        vec!["Error: Transaction T9 not found".to_string()]
    );
    tm.advance();
    assert_eq!(
        tm.end(&tid("T9")),
        vec!["Error: Transaction T9 not found".to_string()]
    );
}
