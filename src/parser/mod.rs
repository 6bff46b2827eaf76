//! Input command parsing
//!
//! Grounded on `original_source/src/parser.py`: one regex per command
//! shape, matched in a fixed order against a trimmed line.

mod command;

pub use command::Command;
