use crate::error::AppError;
use crate::model::Task;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_FILE: &str = "todo_data.json";
const INDENT: &[u8] = b"    ";

pub fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_FILE)
}

/// Loads the task list, treating a missing or unreadable store as empty.
pub fn load_tasks(path: &Path) -> Vec<Task> {
    match read_tasks(path) {
        Ok(tasks) => tasks,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable task store");
            Vec::new()
        }
    }
}

pub fn read_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let tasks: Vec<Task> =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    let mut ids = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        task.validate()?;
        if !ids.insert(task.id) {
            tracing::debug!(id = task.id, "store contains a duplicate task id");
        }
    }

    Ok(tasks)
}

pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let content = render_tasks(tasks)?;
    let temp = temp_sibling(path);
    {
        let mut file =
            std::fs::File::create(&temp).map_err(|err| AppError::io(err.to_string()))?;
        file.write_all(&content)
            .and_then(|_| file.sync_all())
            .map_err(|err| {
                std::fs::remove_file(&temp).ok();
                AppError::io(err.to_string())
            })?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&temp, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    std::fs::rename(&temp, path).map_err(|err| {
        std::fs::remove_file(&temp).ok();
        AppError::io(err.to_string())
    })?;

    tracing::debug!(path = %path.display(), count = tasks.len(), "saved task store");
    Ok(())
}

fn render_tasks(tasks: &[Task]) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(INDENT));
    tasks
        .serialize(&mut serializer)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    buffer.push(b'\n');
    Ok(buffer)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| DEFAULT_STORE_FILE.into());
    name.push(".tmp");
    path.with_file_name(name)
}
