//! In-memory source and target used by the unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::schema::{AttributeType, ColumnDefinition};
use crate::core::traits::{
    BatchWriteOutcome, CreateTableOutcome, RowCursor, SourceReader, TargetWriter,
};
use crate::core::value::{Item, Row};
use crate::error::{MigrateError, Result};

/// A source table held in memory.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<Row>,
}

/// Source reader over in-memory tables, ordered by name.
#[derive(Debug, Default)]
pub struct MemorySource {
    pub tables: BTreeMap<String, MemoryTable>,
    /// Fail the row stream after this many rows.
    pub fail_after_rows: Option<usize>,
    /// Report a cursor width that differs from the column count.
    pub width_override: Option<usize>,
}

impl MemorySource {
    pub fn with_table(
        mut self,
        name: &str,
        columns: Vec<ColumnDefinition>,
        rows: Vec<Row>,
    ) -> Self {
        self.tables
            .insert(name.to_string(), MemoryTable { columns, rows });
        self
    }

    fn table(&self, table: &str) -> Result<&MemoryTable> {
        self.tables
            .get(table)
            .ok_or_else(|| MigrateError::pool(format!("table {table} not found"), "memory source"))
    }
}

#[async_trait]
impl SourceReader for MemorySource {
    async fn list_tables(&self, _database: &str) -> Result<Vec<String>> {
        Ok(self.tables.keys().cloned().collect())
    }

    async fn list_columns(&self, _database: &str, table: &str) -> Result<Vec<ColumnDefinition>> {
        Ok(self.table(table)?.columns.clone())
    }

    async fn stream_rows(
        &self,
        _database: &str,
        table: &str,
        columns: &[ColumnDefinition],
    ) -> Result<RowCursor> {
        let rows = self.table(table)?.rows.clone();
        let width = self.width_override.unwrap_or(columns.len());

        match self.fail_after_rows {
            Some(limit) => {
                let table = table.to_string();
                let items: Vec<Result<Row>> = rows
                    .into_iter()
                    .take(limit)
                    .map(Ok)
                    .chain(std::iter::once(Err(MigrateError::pool(
                        "connection lost",
                        format!("streaming {table}"),
                    ))))
                    .collect();
                Ok(RowCursor::new(width, Box::pin(futures::stream::iter(items))))
            }
            None => Ok(RowCursor::from_rows(width, rows)),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn db_type(&self) -> &str {
        "memory"
    }

    async fn close(&self) {}
}

#[derive(Debug, Default)]
pub struct TargetState {
    /// Tables that exist, with their key attribute.
    pub tables: BTreeMap<String, (String, AttributeType)>,
    /// Tables that have been waited on.
    pub active: HashSet<String>,
    /// Number of create_table calls.
    pub create_calls: usize,
    /// Number of batch_write calls, failed ones included.
    pub batch_calls: usize,
    /// Every accepted batch_write call in order.
    pub batches: Vec<(String, Vec<Item>)>,
}

/// Target writer that records every request.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    pub state: Mutex<TargetState>,
    /// Fail the batch_write call with this 0-based index.
    pub fail_batch: Option<usize>,
    /// Fail create_table with a non-"already exists" error.
    pub fail_create: bool,
    /// Report this many unprocessed items per batch.
    pub unprocessed_per_batch: usize,
}

impl MemoryTarget {
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state
            .lock()
            .unwrap()
            .batches
            .iter()
            .map(|(_, items)| items.len())
            .collect()
    }

    pub fn items(&self, table: &str) -> Vec<Item> {
        self.state
            .lock()
            .unwrap()
            .batches
            .iter()
            .filter(|(t, _)| t == table)
            .flat_map(|(_, items)| items.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl TargetWriter for MemoryTarget {
    async fn create_table(
        &self,
        table: &str,
        key_name: &str,
        key_type: AttributeType,
    ) -> Result<CreateTableOutcome> {
        let mut state = self.state.lock().unwrap();
        state.create_calls += 1;
        if self.fail_create {
            return Err(MigrateError::provision(table, "AccessDeniedException"));
        }
        if state.tables.contains_key(table) {
            return Ok(CreateTableOutcome::AlreadyExists);
        }
        state
            .tables
            .insert(table.to_string(), (key_name.to_string(), key_type));
        Ok(CreateTableOutcome::Created)
    }

    async fn wait_until_active(&self, table: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.tables.contains_key(table) {
            return Err(MigrateError::provision(table, "table does not exist"));
        }
        state.active.insert(table.to_string());
        Ok(())
    }

    async fn batch_write(&self, table: &str, items: Vec<Item>) -> Result<BatchWriteOutcome> {
        let mut state = self.state.lock().unwrap();
        let call = state.batch_calls;
        state.batch_calls += 1;
        if self.fail_batch == Some(call) {
            return Err(MigrateError::transfer(table, "ProvisionedThroughputExceededException"));
        }
        let count = items.len();
        state.batches.push((table.to_string(), items));
        let unprocessed = self.unprocessed_per_batch.min(count);
        Ok(BatchWriteOutcome {
            written: count - unprocessed,
            unprocessed,
        })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn db_type(&self) -> &str {
        "memory"
    }
}
