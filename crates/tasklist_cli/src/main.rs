//! Command-line front end for the task list.
//!
//! # Responsibility
//! - Map one command per invocation onto `TaskStore` operations.
//! - Print the resulting list; keep all list semantics in `tasklist_core`.

use clap::{Parser, Subcommand};
use log::{error, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use tasklist_core::db::open_db;
use tasklist_core::{
    default_log_level, init_logging, LoadStatus, SlotStore, SqliteSlotStore, TaskStore,
    DEFAULT_SLOT_KEY,
};

const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "tasklist", version, about = "Local task list")]
struct Cli {
    /// SQLite database file holding the task slot.
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE_NAME)]
    db: PathBuf,

    /// Slot key inside the database.
    #[arg(long, global = true, default_value = DEFAULT_SLOT_KEY)]
    slot: String,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error. Only meaningful together with `--log-dir`.
    #[arg(long, global = true, requires = "log_dir")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current list.
    List,
    /// Append a new task.
    Add { text: String },
    /// Flip a task between pending and done.
    Toggle { id: String },
    /// Replace the text of a task.
    Rename { id: String, text: String },
    /// Remove a task.
    Delete { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let conn = open_db(&cli.db).map_err(|err| err.to_string())?;
    let slots = SqliteSlotStore::try_new(&conn).map_err(|err| err.to_string())?;
    let mut store =
        TaskStore::load_with_key(slots, cli.slot.as_str()).map_err(|err| err.to_string())?;
    if let LoadStatus::Recovered { reason } = store.load_status() {
        warn!("event=cli_load module=cli status=recovered slot={}", store.slot_key());
        eprintln!("warning: stored task list was unreadable and has been reset ({reason})");
    }

    match cli.command.as_ref().unwrap_or(&Command::List) {
        Command::List => {}
        Command::Add { text } => {
            let task = store.add(text).map_err(|err| err.to_string())?;
            println!("added {}", task.id);
        }
        Command::Toggle { id } => store.toggle(id).map_err(|err| err.to_string())?,
        Command::Rename { id, text } => store.rename(id, text).map_err(|err| err.to_string())?,
        Command::Delete { id } => store.delete(id).map_err(|err| err.to_string())?,
    }

    print_tasks(&store);
    Ok(())
}

fn print_tasks<S: SlotStore>(store: &TaskStore<S>) {
    if store.is_empty() {
        println!("No tasks yet.");
        return;
    }

    for task in store.tasks() {
        let mark = if task.completed { 'x' } else { ' ' };
        println!("[{mark}] {} {}", task.id, task.text);
    }

    let summary = store.summary();
    println!(
        "{} tasks, {} pending, {} done",
        summary.total, summary.pending, summary.done
    );
}
