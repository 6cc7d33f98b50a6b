//! Error types for the migration library.

use thiserror::Error;

/// Exit code for configuration errors (invalid YAML, bad schema, missing key).
pub const EXIT_CONFIG_ERROR: u8 = 1;
/// Exit code for source database errors.
pub const EXIT_SOURCE_ERROR: u8 = 2;
/// Exit code for table provisioning errors.
pub const EXIT_PROVISION_ERROR: u8 = 3;
/// Exit code for batch write errors.
pub const EXIT_TRANSFER_ERROR: u8 = 4;
/// Exit code for IO errors (file not found, etc.)
pub const EXIT_IO_ERROR: u8 = 7;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, empty column list, bad batch size, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database connection or query error, with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// Table has no primary key column
    #[error("Table {0} has no primary key - a single-column primary key is required")]
    NoPrimaryKey(String),

    /// Table has more than one primary key column
    #[error("Table {table} has a composite primary key ({}) - only single-column keys are supported", columns.join(", "))]
    AmbiguousPrimaryKey { table: String, columns: Vec<String> },

    /// Destination table could not be created or never became active
    #[error("Provisioning failed for table {table}: {message}")]
    Provision { table: String, message: String },

    /// Batch write failed for a specific table
    #[error("Transfer failed for table {table}: {message}")]
    Transfer { table: String, message: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrateError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl ToString, context: impl Into<String>) -> Self {
        MigrateError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a Provision error
    pub fn provision(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Provision {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a Transfer error
    pub fn transfer(table: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Transfer {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Whether this error was detected before anything was written.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            MigrateError::Config(_)
                | MigrateError::NoPrimaryKey(_)
                | MigrateError::AmbiguousPrimaryKey { .. }
        )
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MigrateError::Config(_)
            | MigrateError::NoPrimaryKey(_)
            | MigrateError::AmbiguousPrimaryKey { .. }
            | MigrateError::Yaml(_)
            | MigrateError::Json(_) => EXIT_CONFIG_ERROR,
            MigrateError::Pool { .. } => EXIT_SOURCE_ERROR,
            MigrateError::Provision { .. } => EXIT_PROVISION_ERROR,
            MigrateError::Transfer { .. } => EXIT_TRANSFER_ERROR,
            MigrateError::Io(_) => EXIT_IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        // Add error chain for wrapped errors
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

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
