//! Core traits for the relational source and the key-value target.
//!
//! - [`SourceReader`]: Reads table metadata and streams rows from the source
//! - [`TargetWriter`]: Creates tables and bulk-writes items to the target
//!
//! The migration engine only talks to these traits, so the schema translator,
//! provisioner and batch engine can be exercised against in-memory doubles.

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::error::Result;

use super::schema::{AttributeType, ColumnDefinition};
use super::value::{Item, Row};

/// Forward-only, single-pass cursor over the rows of one table.
///
/// The number of fields per row is known before the first row is pulled.
/// Dropping the cursor releases the underlying statement.
pub struct RowCursor {
    width: usize,
    rows: BoxStream<'static, Result<Row>>,
}

impl RowCursor {
    /// Wrap a row stream whose rows have `width` fields.
    pub fn new(width: usize, rows: BoxStream<'static, Result<Row>>) -> Self {
        Self { width, rows }
    }

    /// Build a cursor over rows that are already in memory.
    pub fn from_rows(width: usize, rows: Vec<Row>) -> Self {
        Self::new(
            width,
            Box::pin(futures::stream::iter(rows.into_iter().map(Ok))),
        )
    }

    /// Number of fields in each row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Pull the next row. `Ok(None)` signals end of stream.
    pub async fn next_row(&mut self) -> Result<Option<Row>> {
        self.rows.try_next().await
    }
}

impl fmt::Debug for RowCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowCursor")
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

/// Read metadata and rows from a relational source.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// List the base tables of a database.
    async fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    /// List the columns of a table ordered by physical position, flagging
    /// the columns of the primary index.
    async fn list_columns(&self, database: &str, table: &str) -> Result<Vec<ColumnDefinition>>;

    /// Open a cursor over all rows of a table.
    ///
    /// Rows come back in an implementation-defined but stable order, with
    /// one field per entry of `columns`.
    async fn stream_rows(
        &self,
        database: &str,
        table: &str,
        columns: &[ColumnDefinition],
    ) -> Result<RowCursor>;

    /// Check that the source is reachable.
    async fn ping(&self) -> Result<()>;

    /// Get the database type identifier (e.g., "mysql").
    fn db_type(&self) -> &str;

    /// Close the connection pool.
    async fn close(&self);
}

/// Result of a create-table request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateTableOutcome {
    /// The table was created by this request.
    Created,
    /// The table already existed.
    AlreadyExists,
}

/// Result of a bulk write that reached the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchWriteOutcome {
    /// Items accepted by the target.
    pub written: usize,
    /// Items the target reported back as unprocessed.
    pub unprocessed: usize,
}

/// Create tables in and write items to a key-value target.
#[async_trait]
pub trait TargetWriter: Send + Sync {
    /// Create a table keyed by a single hash attribute, billed on demand.
    async fn create_table(
        &self,
        table: &str,
        key_name: &str,
        key_type: AttributeType,
    ) -> Result<CreateTableOutcome>;

    /// Block until the table is active and accepts writes.
    async fn wait_until_active(&self, table: &str) -> Result<()>;

    /// Write one batch of items in a single bulk request.
    ///
    /// An `Err` means the request itself failed; items the target accepted
    /// the request for but did not process are reported in the outcome.
    async fn batch_write(&self, table: &str, items: Vec<Item>) -> Result<BatchWriteOutcome>;

    /// Check that the target is reachable.
    async fn ping(&self) -> Result<()>;

    /// Get the target type identifier (e.g., "dynamodb").
    fn db_type(&self) -> &str;
}
