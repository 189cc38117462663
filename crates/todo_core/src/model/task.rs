use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Minute-precision wall-clock layout used on disk and on screen.
pub const STAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

time::serde::format_description!(minute_stamp, PrimitiveDateTime, STAMP_FORMAT);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub description: String,
    pub status: TaskStatus,
    #[serde(with = "minute_stamp")]
    pub created_at: PrimitiveDateTime,
    #[serde(default, with = "minute_stamp::option")]
    pub completed_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Pending => "◯",
            Self::Completed => "✓",
        }
    }
}

impl Task {
    pub fn new(id: u64, description: &str, created_at: PrimitiveDateTime) -> Self {
        Self {
            id,
            description: description.to_string(),
            status: TaskStatus::Pending,
            created_at,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Checks the invariants a task read from disk must satisfy.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.id == 0 {
            return Err(AppError::invalid_data("task id must be positive"));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::invalid_data(format!(
                "task {} has an empty description",
                self.id
            )));
        }
        match (self.status, self.completed_at) {
            (TaskStatus::Pending, Some(_)) => Err(AppError::invalid_data(format!(
                "pending task {} has completed_at",
                self.id
            ))),
            (TaskStatus::Completed, None) => Err(AppError::invalid_data(format!(
                "completed task {} is missing completed_at",
                self.id
            ))),
            _ => Ok(()),
        }
    }

    pub fn created_label(&self) -> String {
        format_stamp(&self.created_at)
    }

    pub fn completed_label(&self) -> Option<String> {
        self.completed_at.as_ref().map(format_stamp)
    }
}

pub fn format_stamp(stamp: &PrimitiveDateTime) -> String {
    // Formatting a date-time with a fixed numeric layout cannot fail.
    stamp.format(STAMP_FORMAT).unwrap_or_default()
}

pub fn parse_stamp(raw: &str) -> Result<PrimitiveDateTime, AppError> {
    PrimitiveDateTime::parse(raw.trim(), STAMP_FORMAT)
        .map_err(|_| AppError::invalid_data("timestamp must be YYYY-MM-DD HH:MM"))
}
