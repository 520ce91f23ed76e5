//! JSON I/O handling for CLI
//!
//! - Input: one request line via stdin (query string or JSON body)
//! - Output: one JSON document via stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde::Serialize;

use super::errors::{CliError, CliResult};

/// Read one request line from stdin
pub fn read_params() -> CliResult<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Write a value as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *writer, value).map_err(CliError::from)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
