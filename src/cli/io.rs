//! Line I/O for the CLI driver
//!
//! Commands come from a script file if one was given on the command
//! line, otherwise from stdin. Either way the driver only needs an
//! iterator of raw lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use super::errors::{CliError, CliResult};

/// Open either the given script path, or stdin if `path` is `None`, as
/// a line iterator.
pub fn open_lines(path: Option<&Path>) -> CliResult<Box<dyn Iterator<Item = io::Result<String>>>> {
    match path {
        Some(p) => {
            let file = File::open(p).map_err(|e| {
                CliError::io_error(format!("failed to open script {}: {}", p.display(), e))
            })?;
            Ok(Box::new(BufReader::new(file).lines()))
        }
        None => Ok(Box::new(io::stdin().lock().lines())),
    }
}

/// Print each output line to stdout, one per line.
pub fn print_lines(lines: &[String]) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for line in lines {
        let _ = writeln!(handle, "{}", line);
    }
}
