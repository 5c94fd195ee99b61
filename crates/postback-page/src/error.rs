//! Page model errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Control not found: {0}")]
    ControlNotFound(String),

    #[error("Form not found: {0}")]
    FormNotFound(String),

    #[error("Invalid form action {action:?}: {message}")]
    InvalidAction { action: String, message: String },

    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),
}
