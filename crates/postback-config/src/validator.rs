//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_http(config, &mut result);
        Self::validate_session(config, &mut result);

        Ok(result)
    }

    fn validate_http(config: &Config, result: &mut ValidationResult) {
        if config.http.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "http.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        if config.http.user_agent.trim().is_empty() {
            result.add_error(ValidationError::new(
                "http.user_agent",
                "user_agent cannot be empty",
            ));
        }

        if !config.http.cookie_store {
            result.add_warning(ValidationWarning::new(
                "http.cookie_store",
                "Cookie store disabled, session cookies will not be replayed",
            ));
        }
    }

    fn validate_session(config: &Config, result: &mut ValidationResult) {
        for name in &config.session.transient_fields {
            if name.is_empty() {
                result.add_error(ValidationError::new(
                    "session.transient_fields",
                    "Field names cannot be empty",
                ));
            }
        }

        if let Some(ref dir) = config.session.responses_dir {
            if !dir.exists() {
                result.add_warning(ValidationWarning::new(
                    "session.responses_dir",
                    format!("Directory does not exist and will be created: {:?}", dir),
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
