//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transfer::DEFAULT_BATCH_SIZE;
use crate::typemap::TypePolicy;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database configuration (MySQL).
    pub source: SourceConfig,

    /// Target configuration (DynamoDB).
    #[serde(default)]
    pub target: TargetConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Source database (MySQL) configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Username (default: "root").
    #[serde(default = "default_user")]
    pub user: String,

    /// Password. Never written back out.
    #[serde(default, skip_serializing)]
    pub password: String,

    /// Database (schema) to migrate.
    pub database: String,
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .finish()
    }
}

/// Target (DynamoDB) configuration.
///
/// Both fields fall back to the AWS SDK default chain when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// AWS region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint override, e.g. `http://localhost:8000` for DynamoDB Local.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Migrate only this table. All base tables when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Prefix destination table names with the source database name.
    #[serde(default)]
    pub prefix_with_database: bool,

    /// Separator between database and table name (default: "_").
    #[serde(default = "default_prefix_separator")]
    pub prefix_separator: String,

    /// Map `tinyint` columns to BOOLEAN.
    #[serde(default)]
    pub tinyint_as_bool: bool,

    /// Map primary key columns to STRING.
    #[serde(default)]
    pub force_pk_as_string: bool,

    /// Create destination tables before migrating.
    #[serde(default)]
    pub create_table: bool,

    /// Items per bulk write, 1..=25 (default: 25).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Keep going with the next table after a table fails.
    #[serde(default)]
    pub continue_on_error: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            table: None,
            prefix_with_database: false,
            prefix_separator: default_prefix_separator(),
            tinyint_as_bool: false,
            force_pk_as_string: false,
            create_table: false,
            batch_size: default_batch_size(),
            continue_on_error: false,
        }
    }
}

impl MigrationConfig {
    /// Type coercion flags for the schema translator.
    pub fn type_policy(&self) -> TypePolicy {
        TypePolicy {
            tinyint_as_bool: self.tinyint_as_bool,
            force_pk_as_string: self.force_pk_as_string,
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_mysql_port() -> u16 {
    3306
}

fn default_user() -> String {
    "root".to_string()
}

fn default_prefix_separator() -> String {
    "_".to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
