pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod task_store;

pub use task_store::{ClearOutcome, CompleteOutcome, TaskStore};
