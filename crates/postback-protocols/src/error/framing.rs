//! Delta stream framing errors.

use thiserror::Error;

/// A delta stream could not be decoded.
///
/// `position` is the 1-based character column in the whole input at which
/// the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Framing error at column {position}: {detail}")]
pub struct FramingError {
    pub position: usize,
    pub detail: String,
}

impl FramingError {
    pub fn new(position: usize, detail: impl Into<String>) -> Self {
        Self {
            position,
            detail: detail.into(),
        }
    }
}
