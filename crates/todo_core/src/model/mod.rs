mod filter;
mod task;

pub use filter::{StatusFilter, Summary};
pub use task::{STAMP_FORMAT, Task, TaskStatus, format_stamp, parse_stamp};
