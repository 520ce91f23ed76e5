//! paginate CLI entry point
//!
//! Parses arguments, dispatches to a command, prints errors to stderr and
//! exits with non-zero on failure. All logic lives in the CLI module.

use paginate::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}: {}", e.code(), e);
        std::process::exit(1);
    }
}
