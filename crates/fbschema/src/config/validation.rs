//! Configuration validation.

use super::Config;
use crate::error::{Result, SchemaError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.connection.user.trim().is_empty() {
        return Err(SchemaError::Config("connection.user is required".into()));
    }
    if config.connection.port == 0 {
        return Err(SchemaError::Config(
            "connection.port must be greater than 0".into(),
        ));
    }
    if let Some(host) = &config.connection.host {
        if host.trim().is_empty() {
            return Err(SchemaError::Config(
                "connection.host must not be empty when set".into(),
            ));
        }
    }
    if config.connection.charset.trim().is_empty() {
        return Err(SchemaError::Config("connection.charset is required".into()));
    }

    let file = &config.build.database_file;
    if file.trim().is_empty() {
        return Err(SchemaError::Config("build.database_file is required".into()));
    }
    if file.contains('/') || file.contains('\\') {
        return Err(SchemaError::Config(format!(
            "build.database_file must be a file name, got '{}'",
            file
        )));
    }

    if config.output.log_dir.trim().is_empty() {
        return Err(SchemaError::Config("output.log_dir is required".into()));
    }

    Ok(())
}
