//! Session and delta decoding configuration.

use std::path::PathBuf;

use postback_protocols::LengthUnit;
use serde::{Deserialize, Serialize};

use super::default_true;

/// Postback session behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Load the target of a delta redirect instead of only reporting it.
    #[serde(default = "default_true")]
    pub follow_redirects: bool,

    /// Directory receiving a copy of the page after each partial update.
    #[serde(default)]
    pub responses_dir: Option<PathBuf>,

    /// Bookkeeping fields blanked in every outgoing form request.
    #[serde(default = "default_transient_fields")]
    pub transient_fields: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            responses_dir: None,
            transient_fields: default_transient_fields(),
        }
    }
}

fn default_transient_fields() -> Vec<String> {
    vec!["_eo_js_modules".to_string(), "_eo_obj_inst".to_string()]
}

/// Delta stream decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeltaConfig {
    #[serde(default)]
    pub length_unit: LengthUnit,
}
