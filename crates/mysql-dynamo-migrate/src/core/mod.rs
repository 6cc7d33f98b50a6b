//! Core abstractions for relational to key-value migration.
//!
//! - [`schema`]: Source column and destination attribute metadata
//! - [`value`]: Raw source values and typed destination item values
//! - [`traits`]: Source reader and target writer traits
//! - [`identifier`]: Identifier quoting and attribute name normalization
//!
//! Drivers (`drivers/mysql`, `drivers/dynamodb`) implement the traits; the
//! schema translator, provisioner and batch engine only depend on this module.

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{AttributeDefinition, AttributeType, ColumnDefinition};
pub use traits::{BatchWriteOutcome, CreateTableOutcome, RowCursor, SourceReader, TargetWriter};
pub use value::{Item, ItemValue, Row, SourceValue, WriteBatch};
