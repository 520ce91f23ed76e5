//! CLI module for paginate
//!
//! Provides command-line interface for:
//! - query: run one paginated request against a SQLite database
//! - compile: show the SQL predicate a filter expression compiles to

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{compile, query, run, run_command};
pub use errors::{CliError, CliResult};
pub use io::{read_params, write_json};
