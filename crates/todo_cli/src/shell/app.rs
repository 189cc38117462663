use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use todo_core::error::AppError;
use todo_core::model::{StatusFilter, Summary, Task};
use todo_core::{ClearOutcome, CompleteOutcome, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Warning { title: String, message: String },
    Info { message: String },
    ConfirmClear,
}

pub struct ShellApp<'a> {
    store: &'a mut TaskStore,
    pub(crate) input: String,
    pub(crate) focus: Focus,
    pub(crate) filter: StatusFilter,
    pub(crate) selected: Option<usize>,
    pub(crate) dialog: Option<Dialog>,
    pub(crate) status_message: Option<String>,
    pub(crate) theme: Option<String>,
    pub(crate) should_quit: bool,
}

impl<'a> ShellApp<'a> {
    pub fn new(store: &'a mut TaskStore) -> Self {
        Self {
            store,
            input: String::new(),
            focus: Focus::Input,
            filter: StatusFilter::All,
            selected: None,
            dialog: None,
            status_message: None,
            theme: None,
            should_quit: false,
        }
    }

    pub fn with_theme(mut self, theme: Option<&str>) -> Self {
        self.theme = theme.map(str::to_string);
        self
    }

    pub fn visible(&self) -> Vec<&Task> {
        self.store.filter(self.filter)
    }

    pub fn summary(&self) -> Summary {
        self.store.summary()
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn selected_id(&self) -> Option<u64> {
        let index = self.selected?;
        self.visible().get(index).map(|task| task.id)
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Some(dialog) = self.dialog.take() {
            if dialog == Dialog::ConfirmClear {
                let accepted = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
                self.confirm_clear(accepted);
            }
            return;
        }

        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_add(),
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::List,
            KeyCode::Down => {
                self.focus = Focus::List;
                self.select_next();
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(ch);
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Char('c') | KeyCode::Char(' ') => self.mark_completed(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('x') => self.request_clear(),
            KeyCode::Char('f') => self.set_filter(self.filter.next()),
            KeyCode::Char('1') => self.set_filter(StatusFilter::All),
            KeyCode::Char('2') => self.set_filter(StatusFilter::Pending),
            KeyCode::Char('3') => self.set_filter(StatusFilter::Completed),
            KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Tab => self.focus = Focus::Input,
            _ => {}
        }
    }

    pub fn submit_add(&mut self) {
        match self.store.add(&self.input) {
            Ok(task) => {
                self.input.clear();
                self.status_message = Some(format!("Task added successfully (ID: {})", task.id));
            }
            Err(err) => {
                if matches!(err, AppError::Io(_)) {
                    self.input.clear();
                }
                self.warn("Input Error", err);
            }
        }
        self.clamp_selection();
    }

    pub fn mark_completed(&mut self) {
        let Some(id) = self.selected_id() else {
            self.warn_selection("Please select a task to mark as completed!");
            return;
        };

        match self.store.complete(id) {
            Ok(CompleteOutcome::Completed(_)) => {
                self.status_message = Some(format!("Task {id} marked as completed!"));
            }
            Ok(CompleteOutcome::AlreadyCompleted(_)) => {
                self.dialog = Some(Dialog::Info {
                    message: format!("Task {id} is already completed!"),
                });
            }
            Err(err) => self.warn("Task Error", err),
        }
        self.clamp_selection();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            self.warn_selection("Please select a task to delete!");
            return;
        };

        match self.store.delete(id) {
            Ok(_) => self.status_message = Some(format!("Task {id} deleted successfully!")),
            Err(err) => self.warn("Task Error", err),
        }
        self.clamp_selection();
    }

    pub fn request_clear(&mut self) {
        if self.store.is_empty() {
            self.dialog = Some(Dialog::Info {
                message: "The to-do list is already empty!".to_string(),
            });
        } else {
            self.dialog = Some(Dialog::ConfirmClear);
        }
    }

    pub fn confirm_clear(&mut self, accepted: bool) {
        match self.store.clear_all(|| Ok(accepted)) {
            Ok(ClearOutcome::Cleared(_)) => {
                self.status_message = Some("All tasks have been cleared!".to_string());
            }
            Ok(ClearOutcome::Declined) => {
                self.status_message = Some("Clear cancelled".to_string());
            }
            Ok(ClearOutcome::AlreadyEmpty) => {
                self.dialog = Some(Dialog::Info {
                    message: "The to-do list is already empty!".to_string(),
                });
            }
            Err(err) => self.warn("Task Error", err),
        }
        self.clamp_selection();
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.clamp_selection();
    }

    fn select_next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(index) => (index + 1).min(len - 1),
            None => 0,
        });
    }

    fn select_previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(index) => index.saturating_sub(1),
            None => len - 1,
        });
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = match self.selected {
            Some(_) if len == 0 => None,
            Some(index) => Some(index.min(len - 1)),
            None => None,
        };
    }

    fn warn_selection(&mut self, message: &str) {
        self.dialog = Some(Dialog::Warning {
            title: "Selection Error".to_string(),
            message: message.to_string(),
        });
    }

    fn warn(&mut self, title: &str, err: AppError) {
        let dialog = match err {
            AppError::Io(message) => Dialog::Warning {
                title: "Save Error".to_string(),
                message: format!("The change is kept but could not be saved: {message}"),
            },
            other => Dialog::Warning {
                title: title.to_string(),
                message: other.message().to_string(),
            },
        };
        self.dialog = Some(dialog);
    }
}
