use clap::{Parser, Subcommand};
use std::path::PathBuf;
use todo_core::config::ConfigOverrides;
use todo_core::error::AppError;
use todo_core::model::StatusFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Keep a small to-do list in a JSON file", long_about = None)]
pub struct Cli {
    /// Command to run; without one the full-screen list opens
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Task file to use instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    pub file: Option<PathBuf>,

    /// Configuration file to read
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: todo add "Buy milk"
    Add { description: Option<String> },
    /// Mark a task as completed
    ///
    /// Example: todo done 1
    Done { id: u64 },
    /// Delete a task
    ///
    /// Example: todo delete 1
    Delete { id: u64 },
    /// Remove every task
    ///
    /// Example: todo clear
    /// Example: todo clear --yes
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List tasks
    ///
    /// Example: todo list
    /// Example: todo list --filter pending
    List {
        #[arg(short, long, default_value_t = StatusFilter::All, value_name = "all|pending|completed")]
        filter: StatusFilter,
    },
    /// Open the full-screen task list
    Tui,
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    StorePath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field = canonicalize_flag_name(key_raw)
        .ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "theme" => ConfigOverrideTarget::Theme,
        "store_path" | "store" | "file" => ConfigOverrideTarget::StorePath,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{canonical_field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Collects every `--config-override` argument into one set of overrides.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)
            .map_err(|message| AppError::invalid_input(format!("{CONFIG_OVERRIDE_FLAG}: {message}")))?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::StorePath => {
                overrides.store_path = Some(PathBuf::from(parsed.value))
            }
        }
    }
    Ok(overrides)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
