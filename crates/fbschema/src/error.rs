//! Error types for schema build, export and update operations.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for usage and configuration errors.
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code when the scripts directory does not exist.
pub const EXIT_DIRECTORY_NOT_FOUND: u8 = 3;
/// Exit code when a catalog query fails during export.
pub const EXIT_CATALOG_ERROR: u8 = 4;
/// Exit code when a statement fails in a transactional run.
pub const EXIT_STATEMENT_ERROR: u8 = 5;
/// Exit code for connection and transaction control failures.
pub const EXIT_DRIVER_ERROR: u8 = 6;
/// Exit code for filesystem failures.
pub const EXIT_IO_ERROR: u8 = 7;
/// Exit code for result serialization failures.
pub const EXIT_SERIALIZATION_ERROR: u8 = 8;

/// Main error type for schema operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Configuration or usage error (invalid YAML, bad flag combination, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scripts directory is missing.
    #[error("Scripts directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A catalog query failed or returned rows that cannot be decoded.
    #[error("Catalog read failed ({context}): {message}")]
    CatalogRead { context: String, message: String },

    /// A single DDL or procedure statement failed.
    #[error("Statement failed in {}: {message}\n  Statement: {statement}", .file.display())]
    StatementExecution {
        file: PathBuf,
        statement: String,
        message: String,
    },

    /// A script name matches more than one phase keyword.
    #[error("Script {} matches several phases ({phases}); rename it or change scripts.multi_match", .file.display())]
    AmbiguousScript { file: PathBuf, phases: String },

    /// Connection, database creation or transaction control failed.
    #[error("Database driver error: {0}")]
    Driver(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create a CatalogRead error with context about which read failed.
    pub fn catalog_read(context: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::CatalogRead {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a StatementExecution error.
    pub fn statement(
        file: impl Into<PathBuf>,
        statement: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        SchemaError::StatementExecution {
            file: file.into(),
            statement: statement.into(),
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SchemaError::Config(_) | SchemaError::AmbiguousScript { .. } | SchemaError::Yaml(_) => {
                EXIT_CONFIG_ERROR
            }
            SchemaError::DirectoryNotFound(_) => EXIT_DIRECTORY_NOT_FOUND,
            SchemaError::CatalogRead { .. } => EXIT_CATALOG_ERROR,
            SchemaError::StatementExecution { .. } => EXIT_STATEMENT_ERROR,
            SchemaError::Driver(_) => EXIT_DRIVER_ERROR,
            SchemaError::Io(_) => EXIT_IO_ERROR,
            SchemaError::Json(_) => EXIT_SERIALIZATION_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
