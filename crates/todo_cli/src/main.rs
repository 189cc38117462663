use clap::{CommandFactory, Parser};
use std::io::{self, BufRead, IsTerminal, Write};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use todo_cli::cli::{Cli, Command, collect_overrides};
use todo_cli::shell::run_shell;
use todo_core::config::{Palette, load_config_with_fallback, merge_overrides};
use todo_core::error::AppError;
use todo_core::model::{StatusFilter, Task};
use todo_core::{ClearOutcome, CompleteOutcome, TaskStore};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CLEAR_PROMPT: &str = "Are you sure you want to clear all tasks?";

struct Session {
    store: TaskStore,
    palette: Palette,
    theme: Option<String>,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self, AppError> {
        let loaded = load_config_with_fallback(cli.config.as_deref());
        if let Some(err) = loaded.error {
            eprintln!("WARNING: {}", err);
        }

        let overrides = collect_overrides(&cli.config_override)?;
        let config = merge_overrides(&loaded.config, &overrides);
        let store = TaskStore::open(config.resolve_store_path(cli.file.as_deref()));

        Ok(Self {
            store,
            palette: config.palette(),
            theme: config.theme,
        })
    }
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Status")]
    glyph: &'static str,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Completed")]
    completed: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            glyph: task.status.glyph(),
            description: task.description.clone(),
            created: task.created_label(),
            completed: task.completed_label().unwrap_or_else(|| "-".to_string()),
        }
    }
}

fn print_tasks_plain(session: &Session, filter: StatusFilter) {
    let tasks = session.store.filter(filter);
    if tasks.is_empty() {
        println!("{}", session.palette.mutedize("No tasks."));
    } else {
        let mut table = Table::new(tasks.into_iter().map(TaskRow::from));
        table.with(Style::rounded());
        println!("{table}");
    }
    println!(
        "{}",
        session.palette.accentize(&session.store.summary().to_string())
    );
}

fn print_tasks_json(session: &Session, filter: StatusFilter) -> Result<(), AppError> {
    let tasks = session.store.filter(filter);
    let json =
        serde_json::to_string(&tasks).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    let json =
        serde_json::to_string(task).map_err(|err| AppError::invalid_data(err.to_string()))?;
    println!("{json}");
    Ok(())
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

/// Asks a yes/no question on stdout and reads the answer from `reader`.
/// End of input counts as "no".
fn read_confirmation<R: BufRead>(reader: &mut R, prompt: &str) -> Result<bool, AppError> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        println!();
        return Ok(false);
    }

    let answer = answer.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn run_command<C>(
    session: &mut Session,
    command: Command,
    json: bool,
    confirm: C,
) -> Result<(), AppError>
where
    C: FnOnce(&str) -> Result<bool, AppError>,
{
    match command {
        Command::Add { description } => {
            let description = match description {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("Task description cannot be empty!")),
            };

            let task = session.store.add(&description)?;
            if json {
                print_task_json(&task)?;
            } else {
                println!("Added task: {} (ID: {})", task.description, task.id);
            }
        }
        Command::Done { id } => {
            let outcome = session.store.complete(id)?;
            if json {
                print_task_json(outcome.task())?;
            } else {
                match outcome {
                    CompleteOutcome::Completed(task) => {
                        println!("Task {} marked as completed!", task.id)
                    }
                    CompleteOutcome::AlreadyCompleted(task) => {
                        println!("Task {} is already completed!", task.id)
                    }
                }
            }
        }
        Command::Delete { id } => {
            let task = session.store.delete(id)?;
            if json {
                print_task_json(&task)?;
            } else {
                println!("Task {} deleted successfully!", task.id);
            }
        }
        Command::Clear { yes } => {
            let outcome = session
                .store
                .clear_all(|| if yes { Ok(true) } else { confirm(CLEAR_PROMPT) })?;
            let message = match outcome {
                ClearOutcome::Cleared(_) => "All tasks have been cleared!",
                ClearOutcome::AlreadyEmpty => "The to-do list is already empty!",
                ClearOutcome::Declined => "Clear cancelled.",
            };
            if json {
                let cleared = match outcome {
                    ClearOutcome::Cleared(count) => count,
                    _ => 0,
                };
                println!("{}", serde_json::json!({ "cleared": cleared, "message": message }));
            } else {
                println!("{message}");
            }
        }
        Command::List { filter } => {
            if json {
                print_tasks_json(session, filter)?;
            } else {
                print_tasks_plain(session, filter);
            }
        }
        Command::Tui => run_shell(&mut session.store, session.theme.as_deref())?,
    }

    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("todo".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        let Some(command) = cli.command else {
            print_help();
            continue;
        };

        let confirm = |prompt: &str| read_confirmation(&mut stdin_lock, prompt);
        if let Err(err) = run_command(session, command, cli.json, confirm) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn init_tracing() {
    // Tracing is opt-in via RUST_LOG; an invalid filter leaves it off.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut session = Session::open(&cli)?;
    match cli.command {
        Some(command) => {
            let confirm = |prompt: &str| read_confirmation(&mut io::stdin().lock(), prompt);
            run_command(&mut session, command, cli.json, confirm)
        }
        None if io::stdin().is_terminal() && io::stdout().is_terminal() => {
            run_shell(&mut session.store, session.theme.as_deref())
        }
        None => run_interactive(&mut session),
    }
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
