//! CLI argument definitions using clap
//!
//! Commands:
//! - paginate query --db <path> --from <expr> [--columns a,b] [--config <path>] [--params <request>]
//! - paginate compile --filters <json> [--operator AND|OR] [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// paginate - request-driven pagination over SQLite
#[derive(Parser, Debug)]
#[command(name = "paginate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log every event, not just warnings and errors
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one paginated request and print the result
    Query {
        /// SQLite database file
        #[arg(long)]
        db: PathBuf,

        /// FROM expression, e.g. "articles JOIN users AS user ON user.id = articles.user_id"
        #[arg(long)]
        from: String,

        /// Default projection, comma separated
        #[arg(long)]
        columns: Option<String>,

        /// Path to paginator configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Query string (page=1&size=5) or JSON body; read from stdin when absent
        #[arg(long)]
        params: Option<String>,
    },

    /// Compile a filter expression and print the predicate
    Compile {
        /// Filter JSON, e.g. '[["id",">",1]]'
        #[arg(long)]
        filters: String,

        /// Connective between top-level clauses
        #[arg(long)]
        operator: Option<String>,

        /// Path to paginator configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let cli = Cli::parse_from([
            "paginate", "query", "--db", "a.db", "--from", "articles", "--params", "page=1",
        ]);
        match cli.command {
            Command::Query { db, from, params, columns, .. } => {
                assert_eq!(db, PathBuf::from("a.db"));
                assert_eq!(from, "articles");
                assert_eq!(params.as_deref(), Some("page=1"));
                assert!(columns.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_compile_verbose() {
        let cli = Cli::parse_from([
            "paginate", "compile", "--filters", "[]", "--operator", "OR", "--verbose",
        ]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Compile { operator: Some(_), .. }));
    }
}
