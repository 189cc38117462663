//! Full-screen task list drawn with ratatui.

mod app;
mod run;
mod view;

pub use app::{Dialog, Focus, ShellApp};
pub use run::run_shell;
pub use view::render;
