//! # mysql-dynamo-migrate
//!
//! MySQL to DynamoDB migration library.
//!
//! Each source table is migrated in three steps:
//!
//! - **Schema translation**: columns become UpperCamelCase attributes typed
//!   NUMBER, STRING, BINARY or BOOLEAN
//! - **Table provisioning** (optional): a table keyed by the single-column
//!   primary key, billed on demand
//! - **Batch migration**: rows are streamed, converted to items and written
//!   with BatchWriteItem in batches of up to 25
//!
//! ## Example
//!
//! ```rust,no_run
//! use mysql_dynamo_migrate::{Config, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> mysql_dynamo_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let orchestrator = Orchestrator::new(config).await?;
//!     let result = orchestrator.run(false).await?;
//!     println!("Migrated {} items", result.items_written);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod orchestrator;
pub mod provision;
pub mod transfer;
pub mod typemap;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use config::{Config, MigrationConfig, SourceConfig, TargetConfig};
pub use crate::core::{
    AttributeDefinition, AttributeType, ColumnDefinition, Item, ItemValue, Row, RowCursor,
    SourceReader, SourceValue, TargetWriter,
};
pub use drivers::{DynamoWriter, MysqlReader};
pub use error::{MigrateError, Result};
pub use orchestrator::{
    destination_table_name, HealthCheckResult, MigrationResult, Orchestrator, TableReport,
};
pub use provision::{ensure_table, TableReady};
pub use transfer::{migrate, TransferStats};
pub use typemap::{translate, TypePolicy};
