//! End-to-end CLI tests: feed a command script and assert on stdout.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn script_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_begin_read_end_via_stdin() {
    let mut cmd = Command::cargo_bin("ssidb").unwrap();
    cmd.write_stdin("begin(T1)\nR(T1,x2)\nend(T1)\n");
    cmd.assert()
        .success()
        .stdout("T1 begins\nx2: 20\nT1 commits\n");
}

#[test]
fn test_script_file_argument() {
    let file = script_file("begin(T1)\nW(T1,x2,99)\nend(T1)\ndump()\n");
    let mut cmd = Command::cargo_bin("ssidb").unwrap();
    cmd.arg(file.path());
    cmd.assert().success().stdout(
        predicate::str::contains("T1 begins")
            .and(predicate::str::contains("T1 commits"))
            .and(predicate::str::contains("x2: 99")),
    );
}

#[test]
fn test_comment_and_blank_lines_produce_no_output() {
    let mut cmd = Command::cargo_bin("ssidb").unwrap();
    cmd.write_stdin("// a comment\n\nbegin(T1)\nend(T1)\n");
    cmd.assert().success().stdout("T1 begins\nT1 commits\n");
}

#[test]
fn test_unknown_transaction_is_reported_on_stdout() {
    let mut cmd = Command::cargo_bin("ssidb").unwrap();
    cmd.write_stdin("R(T9,x1)\n");
    cmd.assert()
        .success()
        .stdout("Error: Transaction T9 not found\n");
}

#[test]
fn test_unrecognized_line_is_reported() {
    let mut cmd = Command::cargo_bin("ssidb").unwrap();
    cmd.write_stdin("frobnicate(T1)\n");
    cmd.assert()
        .success()
        .stdout("Error: unrecognized command: frobnicate(T1)\n");
}

#[test]
fn test_fail_and_recover_commands() {
    let mut cmd = Command::cargo_bin("ssidb").unwrap();
    cmd.write_stdin("fail(3)\nrecover(3)\n");
    cmd.assert()
        .success()
        .stdout("Site 3 failed\nSite 3 recovered\n");
}

#[test]
fn test_missing_script_file_is_a_fatal_error() {
    let mut cmd = Command::cargo_bin("ssidb").unwrap();
    cmd.arg("/no/such/path/script.txt");
    cmd.assert().failure();
}
