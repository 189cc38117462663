use std::io::{self, Write};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use todo_core::TaskStore;
use todo_core::error::AppError;

use super::app::ShellApp;
use super::view;

/// Runs the full-screen list until the user quits.
pub fn run_shell(store: &mut TaskStore, theme: Option<&str>) -> Result<(), AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    enter_alternate_screen(&mut stdout)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = ShellApp::new(store).with_theme(theme);
    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::debug!(path = %store.path().display(), "closed shell");
    result
}

/// Switches `out` to the alternate screen, leaving raw mode again if that fails.
fn enter_alternate_screen<W: Write>(out: &mut W) -> Result<(), AppError> {
    if let Err(err) = execute!(out, EnterAlternateScreen) {
        disable_raw_mode().ok();
        return Err(err.into());
    }
    Ok(())
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, app: &mut ShellApp<'_>) -> Result<(), AppError> {
    loop {
        terminal.draw(|frame| view::render(frame, app))?;

        // Blocks until the next input event; each key is handled to completion.
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            _ => {}
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
