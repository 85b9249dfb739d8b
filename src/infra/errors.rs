// src/infra/errors.rs — Error types for habitgram

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HabitgramError {
    /// The chart service rejected a request. The message is the
    /// human-readable text extracted from the response body and is
    /// shown to the user as-is.
    #[error("{0}")]
    Service(String),

    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HabitgramError {
    /// Whether the error carries a message fit for direct user display.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, HabitgramError::Service(_))
    }
}

pub type Result<T> = std::result::Result<T, HabitgramError>;
