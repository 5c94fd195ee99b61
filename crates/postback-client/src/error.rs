//! Session and transport errors.

use postback_page::PageError;
use postback_protocols::{FramingError, InvariantNumber};
use thiserror::Error;

/// Failure of the HTTP collaborator.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

/// Failure of a session operation.
#[derive(Debug, Error)]
pub enum PostbackError {
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Server error {code}: {message}")]
    Protocol {
        code: InvariantNumber,
        message: String,
    },

    #[error("Control not found: {0}")]
    ControlNotFound(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("No page loaded")]
    NoPage,

    #[error("Session is faulted; load a page first")]
    Faulted,

    #[error("Page has no script manager; partial postbacks are unavailable")]
    MissingScriptManager,

    #[error("Form not found: {0}")]
    FormNotFound(String),

    #[error("Invalid URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Page error: {0}")]
    Page(String),
}

impl From<PageError> for PostbackError {
    fn from(e: PageError) -> Self {
        match e {
            PageError::ControlNotFound(name) => Self::ControlNotFound(name),
            PageError::FormNotFound(id) => Self::FormNotFound(id),
            PageError::InvalidAction { action, message } => Self::InvalidUrl {
                url: action,
                message,
            },
            other => Self::Page(other.to_string()),
        }
    }
}
