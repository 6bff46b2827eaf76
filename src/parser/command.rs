//! Command - one parsed input line
//!
//! Grounded on `original_source/src/parser.py`'s `Parser`: one regex per
//! command shape, tried in a fixed order. Blank lines and comments are a
//! no-op; anything else that matches no shape is `Unrecognized` and gets
//! reported to the operator rather than silently swallowed (§7).

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{SiteId, TransactionId, VariableId};

/// One parsed input command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Begin(TransactionId),
    Read(TransactionId, VariableId),
    Write(TransactionId, VariableId, i64),
    End(TransactionId),
    Fail(SiteId),
    Recover(SiteId),
    Dump,
    QueryState,
    /// Blank line, `//` comment, or `===` section marker. Still advances
    /// the clock (§4.3.1) but dispatches to nothing.
    NoOp,
    /// Did not match any known command shape. The clock still advances,
    /// but no transaction manager state is mutated.
    Unrecognized(String),
}

struct Patterns {
    begin: Regex,
    read: Regex,
    write: Regex,
    end: Regex,
    fail: Regex,
    recover: Regex,
    dump: Regex,
    query_state: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        begin: Regex::new(r"(?i)^begin\s*\(\s*(\w+)\s*\)$").unwrap(),
        read: Regex::new(r"(?i)^R\s*\(\s*(\w+)\s*,\s*(\w+)\s*\)$").unwrap(),
        write: Regex::new(r"(?i)^W\s*\(\s*(\w+)\s*,\s*(\w+)\s*,\s*(-?\d+)\s*\)$").unwrap(),
        end: Regex::new(r"(?i)^end\s*\(\s*(\w+)\s*\)$").unwrap(),
        fail: Regex::new(r"(?i)^fail\s*\(\s*(\d+)\s*\)$").unwrap(),
        recover: Regex::new(r"(?i)^recover\s*\(\s*(\d+)\s*\)$").unwrap(),
        dump: Regex::new(r"(?i)^dump\s*\(\s*\)$").unwrap(),
        query_state: Regex::new(r"(?i)^querystate\s*\(\s*\)$").unwrap(),
    })
}

impl Command {
    /// Parse one input line. Never fails: unparseable content becomes
    /// `Command::Unrecognized`, not a parse error.
    pub fn parse_line(line: &str) -> Command {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with("===") {
            return Command::NoOp;
        }

        let p = patterns();

        if let Some(c) = p.begin.captures(trimmed) {
            return Command::Begin(TransactionId::new(c[1].to_string()));
        }
        if let Some(c) = p.read.captures(trimmed) {
            return match VariableId::parse(&c[2]) {
                Some(var) => Command::Read(TransactionId::new(c[1].to_string()), var),
                None => Command::Unrecognized(trimmed.to_string()),
            };
        }
        if let Some(c) = p.write.captures(trimmed) {
            let value: i64 = match c[3].parse() {
                Ok(v) => v,
                Err(_) => return Command::Unrecognized(trimmed.to_string()),
            };
            return match VariableId::parse(&c[2]) {
                Some(var) => Command::Write(TransactionId::new(c[1].to_string()), var, value),
                None => Command::Unrecognized(trimmed.to_string()),
            };
        }
        if let Some(c) = p.end.captures(trimmed) {
            return Command::End(TransactionId::new(c[1].to_string()));
        }
        if let Some(c) = p.fail.captures(trimmed) {
            return match c[1].parse::<u32>() {
                Ok(id) => Command::Fail(SiteId::new(id)),
                Err(_) => Command::Unrecognized(trimmed.to_string()),
            };
        }
        if let Some(c) = p.recover.captures(trimmed) {
            return match c[1].parse::<u32>() {
                Ok(id) => Command::Recover(SiteId::new(id)),
                Err(_) => Command::Unrecognized(trimmed.to_string()),
            };
        }
        if p.dump.is_match(trimmed) {
            return Command::Dump;
        }
        if p.query_state.is_match(trimmed) {
            return Command::QueryState;
        }

        Command::Unrecognized(trimmed.to_string())
    }
}
