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

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
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

        Self::validate_sorter(config, &mut result);
        Self::validate_page(config, &mut result);
        Self::validate_remote(config, &mut result);
        Self::validate_logging(config, &mut result);

        Ok(result)
    }

    fn validate_sorter(config: &Config, result: &mut ValidationResult) {
        if config.sorter.max_sort_attempts == 0 {
            result.add_error(ValidationError::new(
                "sorter.max_sort_attempts",
                "max_sort_attempts must be greater than 0",
            ));
        }

        if config.sorter.max_sort_attempts > 100 {
            result.add_warning(ValidationWarning::new(
                "sorter.max_sort_attempts",
                "max_sort_attempts is very high (>100), a broken page will be retried for a long time",
            ));
        }

        if config.sorter.retry_sort_interval_ms == 0 {
            result.add_warning(ValidationWarning::new(
                "sorter.retry_sort_interval_ms",
                "retry_sort_interval_ms is 0, retries will run back to back",
            ));
        }
    }

    fn validate_page(config: &Config, result: &mut ValidationResult) {
        if config.page.collection_url_marker.is_empty() {
            result.add_error(ValidationError::new(
                "page.collection_url_marker",
                "collection_url_marker cannot be empty",
            ));
        }

        if let Some(ref path) = config.page.snapshot_path {
            if !path.exists() {
                result.add_warning(ValidationWarning::new(
                    "page.snapshot_path",
                    format!("Snapshot file does not exist yet: {:?}", path),
                ));
            }
        }
    }

    fn validate_remote(config: &Config, result: &mut ValidationResult) {
        let url = &config.remote.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            result.add_error(ValidationError::new(
                "remote.base_url",
                "base_url must start with http:// or https://",
            ));
        }

        if config.remote.page_size == 0 || config.remote.page_size > 50 {
            result.add_error(ValidationError::new(
                "remote.page_size",
                "page_size must be between 1 and 50",
            ));
        }

        if config.remote.timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "remote.timeout_secs",
                "timeout_secs must be greater than 0",
            ));
        }

        if config.remote.playlist_id.as_deref().is_none_or(str::is_empty) {
            result.add_warning(ValidationWarning::new(
                "remote.playlist_id",
                "playlist_id is not set, it must be passed on the command line",
            ));
        }

        if config.remote.access_token.is_none() {
            result.add_warning(ValidationWarning::new(
                "remote.access_token",
                "access_token is not set, position updates will be rejected by the API",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            result.add_warning(ValidationWarning::new(
                "logging.level",
                format!(
                    "'{}' is not a plain level ({:?}), it will be used as a filter directive",
                    config.logging.level, valid_levels
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
