//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_session;

pub use schema_session::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub delta: DeltaConfig,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout; an expired timeout is a transport failure.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Keep cookies across requests of a session.
    #[serde(default = "default_true")]
    pub cookie_store: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            cookie_store: true,
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; postback/0.1)".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
