//! The in-memory task list and its file mirror.
//!
//! Every mutating operation rewrites the whole store file. When the write
//! fails the in-memory change is kept and the `Io` error is returned so the
//! caller can warn the user without losing what they did.

use crate::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::model::{StatusFilter, Summary, Task, TaskStatus};
use crate::storage::json_store;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompleteOutcome {
    Completed(Task),
    AlreadyCompleted(Task),
}

impl CompleteOutcome {
    pub fn task(&self) -> &Task {
        match self {
            Self::Completed(task) | Self::AlreadyCompleted(task) => task,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared(usize),
    AlreadyEmpty,
    Declined,
}

pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for TaskStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskStore")
            .field("path", &self.path)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl TaskStore {
    /// Opens the store at `path`. A missing or corrupt file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tasks = json_store::load_tasks(&path);
        tracing::debug!(path = %path.display(), count = tasks.len(), "opened task store");
        Self {
            path,
            tasks,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.tasks)
    }

    pub fn filter(&self, filter: StatusFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    pub fn add(&mut self, description: &str) -> Result<Task, AppError> {
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("Task description cannot be empty!"));
        }

        let task = Task::new(self.next_id()?, trimmed, self.clock.now());
        self.tasks.push(task.clone());
        tracing::debug!(id = task.id, "added task");
        self.persist()?;

        Ok(task)
    }

    pub fn complete(&mut self, id: u64) -> Result<CompleteOutcome, AppError> {
        let now = self.clock.now();
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| AppError::task_not_found(id))?;

        if task.status == TaskStatus::Completed {
            return Ok(CompleteOutcome::AlreadyCompleted(task.clone()));
        }

        task.status = TaskStatus::Completed;
        task.completed_at = Some(now.max(task.created_at));
        let updated = task.clone();
        tracing::debug!(id, "completed task");
        self.persist()?;

        Ok(CompleteOutcome::Completed(updated))
    }

    pub fn delete(&mut self, id: u64) -> Result<Task, AppError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::task_not_found(id))?;

        let removed = self.tasks.remove(index);
        tracing::debug!(id, "deleted task");
        self.persist()?;

        Ok(removed)
    }

    /// Empties the store once `confirm` agrees. `confirm` is not called when
    /// there is nothing to clear.
    pub fn clear_all<F>(&mut self, confirm: F) -> Result<ClearOutcome, AppError>
    where
        F: FnOnce() -> Result<bool, AppError>,
    {
        if self.tasks.is_empty() {
            return Ok(ClearOutcome::AlreadyEmpty);
        }

        if !confirm()? {
            return Ok(ClearOutcome::Declined);
        }

        let count = self.tasks.len();
        self.tasks.clear();
        tracing::debug!(count, "cleared all tasks");
        self.persist()?;

        Ok(ClearOutcome::Cleared(count))
    }

    fn next_id(&self) -> Result<u64, AppError> {
        self.tasks
            .iter()
            .map(|task| task.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| AppError::invalid_data("task id space exhausted"))
    }

    fn persist(&self) -> Result<(), AppError> {
        json_store::save_tasks(&self.path, &self.tasks).inspect_err(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to save task store");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ClearOutcome, CompleteOutcome, TaskStore};
    use crate::clock::FixedClock;
    use crate::model::{StatusFilter, TaskStatus};
    use crate::storage::json_store;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::macros::datetime;

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todo-{nanos}-{file_name}"))
    }

    fn fixed_store(path: &PathBuf) -> TaskStore {
        TaskStore::open(path).with_clock(FixedClock(datetime!(2025-12-20 09:30)))
    }

    #[test]
    fn add_appends_pending_tasks() {
        let path = temp_path("add.json");
        let mut store = fixed_store(&path);

        for description in ["one", "two", "three"] {
            store.add(description).unwrap();
        }
        let persisted = json_store::read_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(store.tasks().len(), 3);
        assert!(
            store
                .tasks()
                .iter()
                .all(|task| task.status == TaskStatus::Pending && task.completed_at.is_none())
        );
        assert_eq!(persisted, store.tasks());
    }

    #[test]
    fn add_trims_description() {
        let path = temp_path("add-trim.json");
        let mut store = fixed_store(&path);

        let task = store.add("  Buy milk \n").unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(task.description, "Buy milk");
        assert_eq!(task.created_at, datetime!(2025-12-20 09:30));
    }

    #[test]
    fn add_rejects_blank_description() {
        let path = temp_path("add-blank.json");
        let mut store = fixed_store(&path);

        let empty = store.add("").unwrap_err();
        let blank = store.add(" \t ").unwrap_err();

        assert_eq!(empty.code(), "invalid_input");
        assert_eq!(blank.code(), "invalid_input");
        assert!(store.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn complete_stamps_once_and_is_idempotent() {
        let path = temp_path("complete.json");
        let mut store = TaskStore::open(&path).with_clock(FixedClock(datetime!(2025-12-20 09:00)));
        let task = store.add("demo").unwrap();

        let mut store = store.with_clock(FixedClock(datetime!(2025-12-20 17:15)));
        let first = store.complete(task.id).unwrap();
        let before_second = fs::read_to_string(&path).unwrap();

        let mut store = store.with_clock(FixedClock(datetime!(2025-12-21 08:00)));
        let second = store.complete(task.id).unwrap();
        let after_second = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        let completed = first.task().clone();
        assert!(matches!(first, CompleteOutcome::Completed(_)));
        assert_eq!(completed.status, TaskStatus::Completed);
        assert_eq!(completed.completed_at, Some(datetime!(2025-12-20 17:15)));
        assert!(completed.completed_at.unwrap() >= completed.created_at);

        assert_eq!(second, CompleteOutcome::AlreadyCompleted(completed));
        assert_eq!(before_second, after_second);
    }

    #[test]
    fn complete_never_stamps_before_creation() {
        let path = temp_path("complete-skew.json");
        let mut store = TaskStore::open(&path).with_clock(FixedClock(datetime!(2025-12-20 09:00)));
        let task = store.add("demo").unwrap();

        let mut store = store.with_clock(FixedClock(datetime!(2025-12-19 23:00)));
        let outcome = store.complete(task.id).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(outcome.task().completed_at, Some(datetime!(2025-12-20 09:00)));
    }

    #[test]
    fn complete_rejects_unknown_id() {
        let path = temp_path("complete-missing.json");
        let mut store = fixed_store(&path);
        store.add("demo").unwrap();

        let err = store.complete(42).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "not_found");
        assert_eq!(store.tasks()[0].status, TaskStatus::Pending);
    }

    #[test]
    fn delete_removes_exactly_one() {
        let path = temp_path("delete.json");
        let mut store = fixed_store(&path);
        store.add("a").unwrap();
        let b = store.add("b").unwrap();
        store.add("c").unwrap();

        let removed = store.delete(b.id).unwrap();
        let persisted = json_store::read_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(removed.description, "b");
        let remaining: Vec<_> = store.tasks().iter().map(|task| task.id).collect();
        assert_eq!(remaining, vec![1, 3]);
        assert_eq!(persisted.len(), 2);
    }

    #[test]
    fn delete_rejects_unknown_id() {
        let path = temp_path("delete-missing.json");
        let mut store = fixed_store(&path);
        store.add("a").unwrap();

        let err = store.delete(7).unwrap_err();
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "not_found");
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn ids_do_not_collide_after_delete() {
        let path = temp_path("ids.json");
        let mut store = fixed_store(&path);
        store.add("a").unwrap();
        store.add("b").unwrap();
        store.delete(1).unwrap();

        let c = store.add("c").unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(c.id, 3);
    }

    #[test]
    fn clear_all_asks_only_when_needed() {
        let path = temp_path("clear.json");
        let mut store = fixed_store(&path);

        let mut asked = false;
        let empty = store
            .clear_all(|| {
                asked = true;
                Ok(true)
            })
            .unwrap();
        assert_eq!(empty, ClearOutcome::AlreadyEmpty);
        assert!(!asked);

        store.add("a").unwrap();
        store.add("b").unwrap();

        let declined = store.clear_all(|| Ok(false)).unwrap();
        assert_eq!(declined, ClearOutcome::Declined);
        assert_eq!(store.tasks().len(), 2);

        let cleared = store.clear_all(|| Ok(true)).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(cleared, ClearOutcome::Cleared(2));
        assert!(store.is_empty());
        assert_eq!(content.trim(), "[]");
    }

    #[test]
    fn filters_partition_the_store_in_order() {
        let path = temp_path("filter.json");
        let mut store = fixed_store(&path);
        for description in ["a", "b", "c", "d", "e"] {
            store.add(description).unwrap();
        }
        store.complete(2).unwrap();
        store.complete(4).unwrap();
        fs::remove_file(&path).ok();

        let pending: Vec<_> = store.filter(StatusFilter::Pending).iter().map(|t| t.id).collect();
        let completed: Vec<_> = store
            .filter(StatusFilter::Completed)
            .iter()
            .map(|t| t.id)
            .collect();
        let all: Vec<_> = store.filter(StatusFilter::All).iter().map(|t| t.id).collect();
        let merged: Vec<_> = all
            .iter()
            .copied()
            .filter(|id| pending.contains(id) != completed.contains(id))
            .collect();

        assert_eq!(pending, vec![1, 3, 5]);
        assert_eq!(completed, vec![2, 4]);
        assert_eq!(pending.len() + completed.len(), all.len());
        assert_eq!(merged, all);
        assert_eq!(store.summary().total, 5);
    }

    #[test]
    fn reopen_sees_persisted_state() {
        let path = temp_path("reopen.json");
        let mut store = fixed_store(&path);
        store.add("keep me").unwrap();
        store.complete(1).unwrap();

        let reopened = TaskStore::open(&path);
        fs::remove_file(&path).ok();

        assert_eq!(reopened.tasks(), store.tasks());
    }

    #[test]
    fn open_corrupt_file_starts_empty() {
        let path = temp_path("corrupt.json");
        fs::write(&path, "not json at all").unwrap();

        let mut store = fixed_store(&path);
        let task = store.add("fresh").unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(task.id, 1);
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let dir = temp_path("write-failure");
        fs::create_dir_all(&dir).unwrap();
        // The store path is an existing directory, so the final rename fails.
        let mut store = TaskStore::open(&dir).with_clock(FixedClock(datetime!(2025-12-20 09:30)));

        let err = store.add("survives").unwrap_err();
        fs::remove_dir_all(&dir).ok();

        assert_eq!(err.code(), "io_error");
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].description, "survives");
    }

    #[test]
    fn add_refuses_to_wrap_past_largest_id() {
        let path = temp_path("max-id.json");
        let content = serde_json::json!([
            {
                "id": u64::MAX,
                "description": "last one",
                "status": "Pending",
                "created_at": "2025-12-20 09:00",
                "completed_at": null
            }
        ]);
        fs::write(&path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut store = fixed_store(&path);
        let err = store.add("new").unwrap_err();
        let after = fs::read_to_string(&path).unwrap();
        let reloaded = json_store::load_tasks(&path);
        fs::remove_file(&path).ok();

        assert_eq!(err.code(), "invalid_data");
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(before, after);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].id, u64::MAX);
    }

    #[test]
    fn documented_scenario() {
        let path = temp_path("scenario.json");
        let mut store = fixed_store(&path);

        let milk = store.add("Buy milk").unwrap();
        assert_eq!((milk.id, milk.status), (1, TaskStatus::Pending));

        let done = store.complete(1).unwrap();
        assert!(done.task().completed_at.is_some());

        let dog = store.add("Walk dog").unwrap();
        assert_eq!((dog.id, dog.status), (2, TaskStatus::Pending));

        let pending: Vec<_> = store.filter(StatusFilter::Pending).iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![2]);

        store.delete(1).unwrap();
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);

        store.clear_all(|| Ok(true)).unwrap();
        let persisted = json_store::read_tasks(&path).unwrap();
        fs::remove_file(&path).ok();

        assert!(store.is_empty());
        assert!(persisted.is_empty());
    }
}
