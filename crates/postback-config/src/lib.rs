//! # Postback Config
//!
//! Configuration for postback sessions: HTTP client settings, session
//! behavior and delta stream decoding.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
