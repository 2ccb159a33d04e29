//! FlatDB - CLI shell

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use flatdb::catalog::Row;
use flatdb::{Config, Executor, QueryResult, StatementKind};

/// Interactive shell for FlatDB
#[derive(Debug, ClapParser)]
#[command(name = "flatdb-cli", version)]
struct Args {
    /// Directory holding table files (defaults to $FLATDB_DATA_DIR or ./db)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Do not append executed statements to db.log
    #[arg(long)]
    no_journal: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

/// Print welcome banner
fn print_banner() {
    println!(
        r#"
 FlatDB - a minimal flat-file relational store
 Type '.help' for help, '.exit' to quit

 Example statements:
   CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)
   INSERT INTO users (1, Jan)
   SELECT * FROM users WHERE id >= 1
   DROP TABLE users
"#
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .exit, .quit       Exit FlatDB
  .tables            List all tables
  .schema [table]    Show table schema

Statements:
  CREATE TABLE <name> <col> <INTEGER|BOOLEAN|TEXT> [PRIMARY KEY] [NOT NULL] ...
  INSERT INTO <name> <value> ...
  SELECT <* | col ...> FROM <name> [WHERE col <op> value [AND|OR ...]]
  UPDATE <name> SET <col> = <value> [WHERE ...]
  DELETE FROM <name> [WHERE ...]
  DROP TABLE <name>

Values are upper-cased; commas and parentheses are ignored.
"#
    );
}

/// Format query results as a table
fn format_results(columns: &[String], rows: &[Row]) -> String {
    if rows.is_empty() {
        return "No rows.\n".to_string();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (i, col) in columns.iter().enumerate() {
            let len = row.get(col).map_or(0, |v| v.chars().count());
            widths[i] = widths[i].max(len);
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    let mut output = String::new();
    output.push_str(&separator);
    let header: String = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!(" {:^width$} ", c, width = *w))
        .collect::<Vec<_>>()
        .join("|");
    output.push_str(&format!("|{}|\n", header));
    output.push_str(&separator);

    for row in rows {
        let line: String = columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!(" {:>width$} ", row.get(c).unwrap_or(""), width = *w))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", line));
    }
    output.push_str(&separator);
    output.push_str(&format!("{} row(s) returned\n", rows.len()));
    output
}

fn render(result: &QueryResult) -> String {
    match result.kind {
        StatementKind::CreateTable => format!("Table '{}' created\n", result.table),
        StatementKind::DropTable => format!("Table '{}' dropped\n", result.table),
        StatementKind::Insert => format!("{} row(s) inserted\n", result.affected_rows),
        StatementKind::Update => format!("{} row(s) updated\n", result.affected_rows),
        StatementKind::Delete => format!("{} row(s) deleted\n", result.affected_rows),
        StatementKind::Select => format_results(&result.columns, &result.rows),
    }
}

/// Execute a statement and print the outcome
fn execute_sql(sql: &str, executor: &mut Executor, json: bool) {
    match executor.execute(sql) {
        Ok(result) if json => match serde_json::to_string(&result) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: {}", e),
        },
        Ok(result) => print!("{}", render(&result)),
        Err(e) => eprintln!("Error ({:?}): {}", e.kind(), e),
    }
}

/// Handle special dot commands. Returns false when the shell should stop.
fn handle_special_command(cmd: &str, executor: &Executor) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();

    match parts.first().copied() {
        Some(".help") => print_help(),
        Some(".quit") | Some(".exit") => return false,
        Some(".tables") => match executor.tables() {
            Ok(tables) if tables.is_empty() => println!("No tables found."),
            Ok(tables) => {
                for table in tables {
                    println!("  {}", table);
                }
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        Some(".schema") => {
            let names = match parts.get(1) {
                Some(name) => vec![name.to_uppercase()],
                None => executor.tables().unwrap_or_default(),
            };
            for name in names {
                match executor.describe(&name) {
                    Ok(columns) => {
                        println!("Table: {}", name);
                        for col in columns {
                            let mut flags = Vec::new();
                            if col.primary_key {
                                flags.push("PRIMARY KEY");
                            }
                            if !col.nullable {
                                flags.push("NOT NULL");
                            }
                            println!("  {} {} {}", col.name, col.data_type, flags.join(" "));
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
        }
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Type '.help' for available commands.");
        }
        None => {}
    }
    true
}

fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();
    let mut config = Config::from_env().journal(!args.no_journal);
    if let Some(dir) = args.data_dir {
        config = config.data_dir(dir);
    }

    let mut executor = Executor::open(&config)
        .with_context(|| format!("opening data directory {}", config.data_path().display()))?;
    let mut editor =
        DefaultEditor::new().map_err(|e| anyhow::anyhow!("initialising line editor: {}", e))?;

    print_banner();

    loop {
        let line = match editor.readline("flatdb> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => anyhow::bail!("reading input: {}", e),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(trimmed);

        if trimmed.starts_with('.') {
            if !handle_special_command(trimmed, &executor) {
                break;
            }
            continue;
        }

        execute_sql(trimmed, &mut executor, args.json);
    }

    println!("Goodbye!");
    Ok(())
}
