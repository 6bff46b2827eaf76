//! CLI argument definitions using clap
//!
//! Commands are read from a script file if given, otherwise from stdin.

use std::path::PathBuf;

use clap::Parser;

/// A deterministic, single-process replicated store with Serializable
/// Snapshot Isolation over Available Copies.
#[derive(Parser, Debug)]
#[command(name = "ssidb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a command script. Reads from stdin if omitted.
    pub script: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
