//! ssidb CLI entry point

use std::process;

fn main() {
    if let Err(e) = ssidb::cli::run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}
