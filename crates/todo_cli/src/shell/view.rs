use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap};
use todo_core::config::canonical_theme_name;
use todo_core::model::{StatusFilter, Task, TaskStatus};

use super::app::{Dialog, Focus, ShellApp};

const PLACEHOLDER: &str = "-";
const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_ACCENT_NOIR: Color = Color::Rgb(255, 135, 0);
const COLOR_ACCENT_SOLARIZED: Color = Color::Rgb(135, 175, 135);

pub fn render(frame: &mut Frame, app: &ShellApp<'_>) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let accent = accent_color(app.theme.as_deref());

    let title = Paragraph::new(Line::from(Span::styled(
        "To-Do List",
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    render_input(frame, app, chunks[1], accent);
    render_tasks(frame, app, chunks[2], accent);
    render_filter(frame, app, chunks[3], accent);
    render_status(frame, app, chunks[4]);

    if let Some(dialog) = app.dialog.as_ref() {
        render_dialog(frame, area, dialog);
    }
}

fn accent_color(theme: Option<&str>) -> Color {
    match theme.and_then(canonical_theme_name).as_deref() {
        Some("noir") => COLOR_ACCENT_NOIR,
        Some("solarized") => COLOR_ACCENT_SOLARIZED,
        _ => COLOR_ACCENT,
    }
}

fn border_style(active: bool, accent: Color) -> Style {
    if active {
        Style::default().fg(accent)
    } else {
        Style::default().fg(COLOR_MUTED)
    }
}

fn render_input(frame: &mut Frame, app: &ShellApp<'_>, area: Rect, accent: Color) {
    let active = app.focus == Focus::Input;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(active, accent))
        .title(" New Task (Enter to add, Esc for list) ");
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(COLOR_TEXT))
        .block(block);
    frame.render_widget(input, area);

    if active && app.dialog.is_none() {
        frame.set_cursor_position((input_cursor_x(area, &app.input), area.y + 1));
    }
}

/// Column of the cursor after `input`, kept inside the input box border.
fn input_cursor_x(area: Rect, input: &str) -> u16 {
    let width = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let last = area.x.saturating_add(area.width.saturating_sub(2));
    area.x.saturating_add(1).saturating_add(width).min(last)
}

fn task_row(task: &Task) -> Row<'static> {
    let glyph_style = match task.status {
        TaskStatus::Completed => Style::default().fg(COLOR_SUCCESS),
        TaskStatus::Pending => Style::default().fg(COLOR_WARNING),
    };
    let description_style = match task.status {
        TaskStatus::Completed => Style::default()
            .fg(COLOR_MUTED)
            .add_modifier(Modifier::CROSSED_OUT),
        TaskStatus::Pending => Style::default().fg(COLOR_TEXT),
    };
    let completed = task
        .completed_label()
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    Row::new(vec![
        Cell::from(task.id.to_string()),
        Cell::from(task.status.glyph()).style(glyph_style),
        Cell::from(task.description.clone()).style(description_style),
        Cell::from(task.created_label()),
        Cell::from(completed),
    ])
}

fn render_tasks(frame: &mut Frame, app: &ShellApp<'_>, area: Rect, accent: Color) {
    let visible = app.visible();
    let header = Row::new(vec!["ID", "", "Description", "Created", "Completed"]).style(
        Style::default()
            .fg(COLOR_MUTED)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = visible.iter().map(|task| task_row(task)).collect();
    let widths = [
        Constraint::Length(4),
        Constraint::Length(2),
        Constraint::Min(12),
        Constraint::Length(16),
        Constraint::Length(16),
    ];

    let title = format!(" Tasks ({}: {}) ", app.filter.label(), visible.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(app.focus == Focus::List, accent))
                .title(title),
        )
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(app.selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_filter(frame: &mut Frame, app: &ShellApp<'_>, area: Rect, accent: Color) {
    let titles: Vec<String> = StatusFilter::VARIANTS
        .iter()
        .enumerate()
        .map(|(idx, filter)| format!("{} {}", idx + 1, filter.label()))
        .collect();
    let selected = StatusFilter::VARIANTS
        .iter()
        .position(|filter| *filter == app.filter)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(COLOR_MUTED))
        .highlight_style(
            Style::default()
                .fg(accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider(" ");
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);
    frame.render_widget(
        Paragraph::new(Span::styled("Filter:", Style::default().fg(COLOR_MUTED))),
        chunks[0],
    );
    frame.render_widget(tabs, chunks[1]);
}

fn render_status(frame: &mut Frame, app: &ShellApp<'_>, area: Rect) {
    let mut spans = vec![Span::styled(
        app.summary().to_string(),
        Style::default().fg(COLOR_TEXT),
    )];
    if let Some(message) = app.status_message.as_deref() {
        spans.push(Span::styled("  |  ", Style::default().fg(COLOR_MUTED)));
        spans.push(Span::styled(message.to_string(), Style::default().fg(COLOR_INFO)));
    }
    let hint = match app.focus {
        Focus::Input => "",
        Focus::List => "  c complete  d delete  x clear  f filter  q quit",
    };
    spans.push(Span::styled(hint, Style::default().fg(COLOR_MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog) {
    let (title, body, color) = match dialog {
        Dialog::Warning { title, message } => (title.as_str(), message.clone(), COLOR_WARNING),
        Dialog::Info { message } => ("Info", message.clone(), COLOR_INFO),
        Dialog::ConfirmClear => (
            "Confirm",
            "Are you sure you want to clear all tasks? (y/N)".to_string(),
            COLOR_WARNING,
        ),
    };
    let footer = match dialog {
        Dialog::ConfirmClear => "y to confirm, any other key to cancel",
        _ => "press any key",
    };

    let popup = centered_rect(50, 7, area);
    let text = vec![
        Line::from(Span::styled(body, Style::default().fg(COLOR_TEXT))),
        Line::from(""),
        Line::from(Span::styled(footer, Style::default().fg(COLOR_MUTED))),
    ];
    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {title} ")),
        );
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let scaled = u32::from(area.width) * u32::from(percent_x) / 100;
    let width = u16::try_from(scaled).unwrap_or(u16::MAX).max(30).min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::{input_cursor_x, render};
    use ratatui::layout::Rect;
    use crate::shell::ShellApp;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use todo_core::TaskStore;
    use todo_core::clock::FixedClock;
    use todo_core::model::StatusFilter;
    use time::macros::datetime;

    fn temp_path(file_name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("todo-{nanos}-{file_name}"))
    }

    fn screen(app: &ShellApp<'_>) -> String {
        let backend = TestBackend::new(90, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_rows_with_glyphs_timestamps_and_summary() {
        let path = temp_path("view-rows.json");
        let mut store = TaskStore::open(&path).with_clock(FixedClock(datetime!(2025-12-20 09:30)));
        store.add("Buy milk").unwrap();
        store.add("Walk dog").unwrap();
        store.complete(1).unwrap();
        let app = ShellApp::new(&mut store);

        let text = screen(&app);
        std::fs::remove_file(&path).ok();

        assert!(text.contains("To-Do List"));
        assert!(text.contains("Buy milk"));
        assert!(text.contains("Walk dog"));
        assert!(text.contains("✓"));
        assert!(text.contains("◯"));
        assert!(text.contains("2025-12-20 09:30"));
        assert!(text.contains("Total: 2 tasks (1 pending, 1 completed)"));
    }

    #[test]
    fn filtered_view_hides_other_rows_but_keeps_totals() {
        let path = temp_path("view-filter.json");
        let mut store = TaskStore::open(&path).with_clock(FixedClock(datetime!(2025-12-20 09:30)));
        store.add("Buy milk").unwrap();
        store.add("Walk dog").unwrap();
        store.complete(1).unwrap();
        let mut app = ShellApp::new(&mut store);
        app.set_filter(StatusFilter::Pending);

        let text = screen(&app);
        std::fs::remove_file(&path).ok();

        assert!(!text.contains("Buy milk"));
        assert!(text.contains("Walk dog"));
        assert!(text.contains("Tasks (Pending: 1)"));
        assert!(text.contains("Total: 2 tasks (1 pending, 1 completed)"));
    }

    #[test]
    fn cursor_stays_inside_input_box() {
        let area = Rect::new(0, 1, 40, 3);

        assert_eq!(input_cursor_x(area, ""), 1);
        assert_eq!(input_cursor_x(area, "abc"), 4);
        assert_eq!(input_cursor_x(area, &"x".repeat(100)), 38);
        assert_eq!(input_cursor_x(area, &"x".repeat(70_000)), 38);

        let edge = Rect::new(u16::MAX - 10, 0, 10, 3);
        assert_eq!(input_cursor_x(edge, &"x".repeat(70_000)), u16::MAX - 2);
    }

    #[test]
    fn renders_confirm_dialog() {
        let path = temp_path("view-dialog.json");
        let mut store = TaskStore::open(&path).with_clock(FixedClock(datetime!(2025-12-20 09:30)));
        store.add("Buy milk").unwrap();
        let mut app = ShellApp::new(&mut store);
        app.request_clear();

        let text = screen(&app);
        std::fs::remove_file(&path).ok();

        assert!(text.contains("Confirm"));
        assert!(text.contains("y to confirm"));
    }
}
