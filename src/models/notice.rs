//! User-visible notices raised by the session controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    /// Command confirmed.
    Success,
    /// Informational progress.
    Info,
    /// Input rejected locally.
    Warning,
    /// Command failed or was rejected by the server.
    Danger,
}

/// A transient message for the operator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Notice {
    /// Unique notice identifier.
    pub id: Uuid,
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
    /// Creation timestamp.
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    /// Construct a notice stamped with the current time.
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            raised_at: Utc::now(),
        }
    }
}
