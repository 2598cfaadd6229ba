//! `check-config` command.

use std::path::Path;

use tubesort_config::{Config, ConfigValidator};

/// Validate the loaded configuration and print every finding.
pub(crate) fn check_config(path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let result = ConfigValidator::validate(config)?;

    println!("Configuration: {}", path.display());
    for warning in &result.warnings {
        println!("  warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("  error: {}: {}", error.path, error.message);
    }

    result.into_result()?;
    println!("Configuration is valid");
    Ok(())
}
