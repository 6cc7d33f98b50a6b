//! Batched transfer of source rows into destination items.
//!
//! Rows are pulled from a [`RowCursor`] one at a time, converted into items
//! according to the translated attribute types, and grouped into batches of
//! at most `batch_size` items. Every full batch is written as soon as it
//! fills up; the remainder is written once the cursor is exhausted.
//!
//! The pipeline is strictly sequential: one row, one conversion, at most one
//! bulk write in flight.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::schema::{AttributeDefinition, AttributeType, ColumnDefinition};
use crate::core::traits::{RowCursor, TargetWriter};
use crate::core::value::{Item, ItemValue, Row, SourceValue, WriteBatch};
use crate::error::{MigrateError, Result};

/// Default number of items per bulk write (the DynamoDB BatchWriteItem limit).
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Statistics from migrating one table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransferStats {
    /// Rows read from the source and sent to the target.
    pub items_written: u64,

    /// Bulk write requests issued.
    pub batches: u64,

    /// Items the target accepted the request for but reported unprocessed.
    pub unprocessed_items: u64,

    /// Time spent in bulk writes.
    #[serde(skip)]
    pub write_time: Duration,

    /// Total time for the table.
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Pending batch and row counter for a single table migration.
#[derive(Debug)]
pub struct BatchAccumulator {
    batch_size: usize,
    pending: WriteBatch,
    rows: u64,
}

impl BatchAccumulator {
    /// Create an accumulator that releases a batch every `batch_size` items.
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(MigrateError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            batch_size,
            pending: WriteBatch::with_capacity(batch_size),
            rows: 0,
        })
    }

    /// Append an item. Returns the full batch when the row count reaches a
    /// multiple of the batch size.
    pub fn push(&mut self, item: Item) -> Option<Vec<Item>> {
        self.pending.push(item);
        self.rows += 1;
        if self.rows % self.batch_size as u64 == 0 {
            Some(self.pending.take())
        } else {
            None
        }
    }

    /// Take the remaining items after the last row, if any.
    pub fn finish(&mut self) -> Option<Vec<Item>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.take())
        }
    }

    /// Rows appended so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Items waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

/// Parse a boolean literal.
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`; anything
/// else is `false`.
pub fn parse_bool(s: &str) -> bool {
    matches!(s, "1" | "t" | "T" | "TRUE" | "true" | "True")
}

/// Convert one source value into a destination value.
pub fn convert_value(value: SourceValue, attribute_type: AttributeType) -> ItemValue {
    match attribute_type {
        AttributeType::Number => match value {
            SourceValue::Null => ItemValue::Null,
            other => ItemValue::Number(other.as_text().into_owned()),
        },
        AttributeType::Boolean => ItemValue::Boolean(parse_bool(&value.as_text())),
        AttributeType::Binary => ItemValue::Binary(value.into_bytes()),
        AttributeType::String => match value {
            SourceValue::Text(s) => ItemValue::String(s),
            other => ItemValue::String(other.as_text().into_owned()),
        },
    }
}

/// Convert a source row into an item keyed by attribute name.
///
/// The row must be aligned with `attributes`.
pub fn convert_row(row: Row, attributes: &[AttributeDefinition]) -> Item {
    row.into_iter()
        .zip(attributes)
        .map(|(value, attr)| (attr.name.clone(), convert_value(value, attr.attribute_type)))
        .collect()
}

/// Migrate every row of a cursor into `table_name`.
///
/// Column, attribute and row widths are checked before the first row is
/// read. A failed bulk write aborts the table; earlier batches stay written.
pub async fn migrate<W>(
    writer: &W,
    table_name: &str,
    mut cursor: RowCursor,
    columns: &[ColumnDefinition],
    attributes: &[AttributeDefinition],
    batch_size: usize,
) -> Result<TransferStats>
where
    W: TargetWriter + ?Sized,
{
    if columns.len() != attributes.len() {
        return Err(MigrateError::Config(format!(
            "{}: {} columns but {} attributes",
            table_name,
            columns.len(),
            attributes.len()
        )));
    }
    if cursor.width() != attributes.len() {
        return Err(MigrateError::Config(format!(
            "{}: number of columns from result set ({}) and metadata ({}) mismatch",
            table_name,
            cursor.width(),
            attributes.len()
        )));
    }
    let mut acc = BatchAccumulator::new(batch_size)?;

    info!(
        "Starting transfer for {} ({} attributes, batch size {})",
        table_name,
        attributes.len(),
        batch_size
    );

    let start = Instant::now();
    let mut stats = TransferStats::default();

    while let Some(row) = cursor.next_row().await? {
        let item = convert_row(row, attributes);
        if let Some(items) = acc.push(item) {
            flush(writer, table_name, items, &mut stats).await?;
        }
    }

    if let Some(items) = acc.finish() {
        flush(writer, table_name, items, &mut stats).await?;
    }

    stats.elapsed = start.elapsed();
    let secs = stats.elapsed.as_secs_f64();
    let rows_per_sec = if secs > 0.0 {
        (stats.items_written as f64 / secs) as u64
    } else {
        stats.items_written
    };

    if stats.unprocessed_items > 0 {
        warn!(
            "{}: {} items were reported unprocessed and were not retried",
            table_name, stats.unprocessed_items
        );
    }
    info!(
        "{}: transferred {} rows in {} batches ({:.2}s, {:.2}s writing, {} rows/sec)",
        table_name,
        stats.items_written,
        stats.batches,
        secs,
        stats.write_time.as_secs_f64(),
        rows_per_sec
    );

    Ok(stats)
}

async fn flush<W>(
    writer: &W,
    table_name: &str,
    items: Vec<Item>,
    stats: &mut TransferStats,
) -> Result<()>
where
    W: TargetWriter + ?Sized,
{
    let count = items.len() as u64;
    let write_start = Instant::now();
    let outcome = writer.batch_write(table_name, items).await?;
    stats.write_time += write_start.elapsed();

    stats.items_written += count;
    stats.batches += 1;
    stats.unprocessed_items += outcome.unprocessed as u64;

    debug!(
        "{}: batch {} wrote {} items ({} unprocessed)",
        table_name, stats.batches, outcome.written, outcome.unprocessed
    );
    Ok(())
}
