//! CLI command implementations

use std::io::{self, Write};
use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use serde_json::Value;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_params, write_json};
use crate::compiler::PredicateCompiler;
use crate::config::{Config, Connective};
use crate::filter::{decode_filters, parse_filters, FilterValue};
use crate::observability::{Logger, Severity};
use crate::paginator::Paginator;
use crate::query::SqliteQuery;
use crate::request::RawRequest;
use crate::response::PaginationResult;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }
    let stdout = io::stdout();
    run_command(cli.command, &mut stdout.lock())
}

/// Run the appropriate command based on CLI args
pub fn run_command<W: Write>(cmd: Command, out: &mut W) -> CliResult<()> {
    match cmd {
        Command::Query {
            db,
            from,
            columns,
            config,
            params,
        } => {
            let params = match params {
                Some(params) => params,
                None => read_params()?,
            };
            query(&db, &from, columns.as_deref(), config.as_deref(), &params, out)
        }
        Command::Compile {
            filters,
            operator,
            config,
        } => compile(&filters, operator.as_deref(), config.as_deref(), out),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

/// Run one paginated request against a SQLite database
///
/// `params` is either a query string (`page=1&size=5`) or a JSON body
/// (`{"page": 1}`); the latter is treated as a POST.
pub fn query<W: Write>(
    db: &Path,
    from: &str,
    columns: Option<&str>,
    config: Option<&Path>,
    params: &str,
    out: &mut W,
) -> CliResult<()> {
    let config = load_config(config)?;
    let conn = Connection::open_with_flags(db, OpenFlags::SQLITE_OPEN_READ_ONLY)?;

    let mut base = SqliteQuery::new(&conn, from);
    if let Some(columns) = columns {
        base = base.columns(columns.split(',').map(str::trim).filter(|c| !c.is_empty()));
    }

    let params = params.trim();
    let request = if params.starts_with('{') {
        RawRequest::post(params)
    } else {
        RawRequest::get(params.trim_start_matches('?'))
    };

    let result: PaginationResult<Value> = Paginator::new(config).with(base).request(&request).response();
    write_json(out, &result)
}

#[derive(Debug, Serialize)]
struct CompiledFilter {
    predicate: String,
    params: Vec<FilterValue>,
}

/// Compile a filter expression and print the predicate with its parameters
pub fn compile<W: Write>(
    filters: &str,
    operator: Option<&str>,
    config: Option<&Path>,
    out: &mut W,
) -> CliResult<()> {
    let mut config = load_config(config)?;
    if let Some(operator) = operator {
        config.operator = Connective::parse(operator)
            .ok_or_else(|| CliError::argument(format!("unknown operator: {}", operator)))?;
    }

    let root = match decode_filters(&Value::String(filters.to_string()))? {
        Some(decoded) => parse_filters(&decoded, config.operator)?,
        None => None,
    };

    let compiled = match root {
        Some(root) => {
            let policy = config.column_policy();
            let predicate =
                PredicateCompiler::new(&policy, config.like_as_ilike_disabled).compile(&root)?;
            CompiledFilter {
                predicate: predicate.to_sql(),
                params: predicate.params().to_vec(),
            }
        }
        None => CompiledFilter {
            predicate: String::new(),
            params: Vec::new(),
        },
    };
    write_json(out, &compiled)
}
