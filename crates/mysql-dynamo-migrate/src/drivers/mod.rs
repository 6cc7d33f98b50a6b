//! Database driver implementations.
//!
//! - [`mysql`]: MySQL/MariaDB source reader
//! - [`dynamodb`]: DynamoDB target writer
//!
//! Each driver implements one of the core traits
//! ([`SourceReader`](crate::core::SourceReader) or
//! [`TargetWriter`](crate::core::TargetWriter)).

pub mod dynamodb;
pub mod mysql;

pub use dynamodb::DynamoWriter;
pub use mysql::MysqlReader;
