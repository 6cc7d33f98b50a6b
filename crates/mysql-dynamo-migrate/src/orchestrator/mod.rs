//! Migration orchestrator - main workflow coordinator.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::{Config, SourceConfig, TargetConfig};
use crate::core::schema::AttributeDefinition;
use crate::core::traits::{SourceReader, TargetWriter};
use crate::drivers::{DynamoWriter, MysqlReader};
use crate::error::{MigrateError, Result};
use crate::provision::ensure_table;
use crate::transfer::migrate;
use crate::typemap::{primary_key, translate};

/// Destination table name for a source table.
///
/// `database + separator + table` when prefixing, `table` otherwise.
pub fn destination_table_name(
    database: &str,
    table: &str,
    prefix: bool,
    separator: &str,
) -> String {
    if prefix {
        format!("{}{}{}", database, separator, table)
    } else {
        table.to_string()
    }
}

/// Migration orchestrator.
pub struct Orchestrator {
    config: Config,
    source: Arc<dyn SourceReader>,
    target: Arc<dyn TargetWriter>,
}

/// Outcome for a single table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableReport {
    /// Source table name.
    pub source_table: String,

    /// Destination table name.
    pub destination_table: String,

    /// Hash key attribute, when the table has a single-column primary key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Translated attributes as `Name:TYPE`, `(PK)` marking the key.
    pub attributes: Vec<String>,

    /// Whether the destination table was created by this run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,

    /// Items sent to the destination.
    pub items_written: u64,

    /// Bulk write requests issued.
    pub batches: u64,

    /// Items reported unprocessed by the destination.
    pub unprocessed_items: u64,

    /// Failure message, if the table failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationResult {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: "completed", "failed" or "dry_run".
    pub status: String,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// When the migration started.
    pub started_at: DateTime<Utc>,

    /// When the migration completed.
    pub completed_at: DateTime<Utc>,

    /// Total tables processed.
    pub tables_total: usize,

    /// Tables successfully migrated.
    pub tables_success: usize,

    /// Tables that failed.
    pub tables_failed: usize,

    /// Total items written.
    pub items_written: u64,

    /// Average throughput (items/second).
    pub items_per_second: u64,

    /// List of failed table names.
    pub failed_tables: Vec<String>,

    /// Per-table detail.
    pub tables: Vec<TableReport>,
}

impl MigrationResult {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Error for a run that finished with failed tables, naming the first
    /// failed table and its cause.
    pub fn failure(&self) -> Option<MigrateError> {
        let first = self.tables.iter().find(|t| t.error.is_some())?;
        let cause = first.error.as_deref().unwrap_or_default();
        let message = if self.tables_failed > 1 {
            format!(
                "{} ({} of {} tables failed: {})",
                cause,
                self.tables_failed,
                self.tables_total,
                self.failed_tables.join(", ")
            )
        } else {
            cause.to_string()
        };
        Some(MigrateError::transfer(first.source_table.clone(), message))
    }
}

/// Result of a connectivity check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    /// Source reachable.
    pub source_connected: bool,
    /// Source round-trip in milliseconds.
    pub source_latency_ms: u64,
    /// Source error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_error: Option<String>,
    /// Target reachable.
    pub target_connected: bool,
    /// Target round-trip in milliseconds.
    pub target_latency_ms: u64,
    /// Target error, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_error: Option<String>,
    /// Both ends reachable.
    pub healthy: bool,
}

/// Time a connectivity check.
async fn timed_check<F, Fut>(check: F) -> (bool, u64, Option<String>)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let start = Instant::now();
    let result = check().await;
    let latency = start.elapsed().as_millis() as u64;
    match result {
        Ok(()) => (true, latency, None),
        Err(e) => (false, latency, Some(e.to_string())),
    }
}

impl HealthCheckResult {
    async fn from_checks<S, SF, T, TF>(source: S, target: T) -> Self
    where
        S: FnOnce() -> SF,
        SF: Future<Output = Result<()>>,
        T: FnOnce() -> TF,
        TF: Future<Output = Result<()>>,
    {
        let (source_connected, source_latency_ms, source_error) = timed_check(source).await;
        let (target_connected, target_latency_ms, target_error) = timed_check(target).await;
        Self {
            source_connected,
            source_latency_ms,
            source_error,
            target_connected,
            target_latency_ms,
            target_error,
            healthy: source_connected && target_connected,
        }
    }
}

impl Orchestrator {
    /// Create a new orchestrator connected to MySQL and DynamoDB.
    pub async fn new(config: Config) -> Result<Self> {
        let source = MysqlReader::new(&config.source).await?;
        let target = DynamoWriter::new(&config.target).await?;
        Ok(Self::with_drivers(config, Arc::new(source), Arc::new(target)))
    }

    /// Create an orchestrator over existing source and target drivers.
    pub fn with_drivers(
        config: Config,
        source: Arc<dyn SourceReader>,
        target: Arc<dyn TargetWriter>,
    ) -> Self {
        Self {
            config,
            source,
            target,
        }
    }

    /// Check that both the source and the target are reachable.
    ///
    /// Connection failures are reported in the result rather than returned.
    pub async fn health_check(config: &Config) -> HealthCheckResult {
        HealthCheckResult::from_checks(
            || Self::ping_source(&config.source),
            || Self::ping_target(&config.target),
        )
        .await
    }

    async fn ping_source(config: &SourceConfig) -> Result<()> {
        let reader = MysqlReader::new(config).await?;
        let result = reader.ping().await;
        reader.close().await;
        result
    }

    async fn ping_target(config: &TargetConfig) -> Result<()> {
        DynamoWriter::new(config).await?.ping().await
    }

    /// Run the migration.
    ///
    /// With `dry_run` every table's schema is translated and reported, but no
    /// destination table is created and nothing is written.
    pub async fn run(self, dry_run: bool) -> Result<MigrationResult> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let database = self.config.source.database.clone();

        info!(
            "Starting migration run {}: {} ({}) -> {}{}",
            run_id,
            database,
            self.source.db_type(),
            self.target.db_type(),
            if dry_run { " [dry run]" } else { "" }
        );

        let outcome = self.run_tables(&database, dry_run).await;
        self.source.close().await;
        let reports = outcome?;

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let failed_tables: Vec<String> = reports
            .iter()
            .filter(|r| r.error.is_some())
            .map(|r| r.source_table.clone())
            .collect();
        let items_written: u64 = reports.iter().map(|r| r.items_written).sum();
        let items_per_second = if duration > 0.0 {
            (items_written as f64 / duration) as u64
        } else {
            0
        };

        let status = if dry_run {
            "dry_run"
        } else if failed_tables.is_empty() {
            "completed"
        } else {
            "failed"
        };

        let result = MigrationResult {
            run_id,
            status: status.to_string(),
            duration_seconds: duration,
            started_at,
            completed_at,
            tables_total: reports.len(),
            tables_success: reports.len() - failed_tables.len(),
            tables_failed: failed_tables.len(),
            items_written,
            items_per_second,
            failed_tables,
            tables: reports,
        };

        info!(
            "Migration {}: {} tables, {} items in {:.1}s ({} items/s)",
            result.status,
            result.tables_total,
            result.items_written,
            result.duration_seconds,
            result.items_per_second
        );

        Ok(result)
    }

    /// Resolve the table list and process each table in order.
    async fn run_tables(&self, database: &str, dry_run: bool) -> Result<Vec<TableReport>> {
        let tables = match &self.config.migration.table {
            Some(table) => vec![table.clone()],
            None => self.source.list_tables(database).await?,
        };
        if tables.is_empty() {
            warn!("No tables found in database '{}'", database);
        }
        info!("Found {} tables to migrate", tables.len());

        let mut reports = Vec::with_capacity(tables.len());
        for table in &tables {
            let mut report = TableReport {
                source_table: table.clone(),
                destination_table: destination_table_name(
                    database,
                    table,
                    self.config.migration.prefix_with_database,
                    &self.config.migration.prefix_separator,
                ),
                ..Default::default()
            };

            if let Err(e) = self.process_table(database, &mut report, dry_run).await {
                error!("{}: {}", table, e);
                if !self.config.migration.continue_on_error {
                    return Err(e);
                }
                report.error = Some(e.to_string());
            }
            reports.push(report);
        }

        Ok(reports)
    }

    /// Translate, optionally provision, and migrate one table.
    async fn process_table(
        &self,
        database: &str,
        report: &mut TableReport,
        dry_run: bool,
    ) -> Result<()> {
        let migration = &self.config.migration;
        let table = report.source_table.clone();

        let columns = self.source.list_columns(database, &table).await?;
        let attributes = translate(&columns, migration.type_policy()).map_err(|e| match e {
            MigrateError::Config(msg) => MigrateError::Config(format!("{}: {}", table, msg)),
            other => other,
        })?;

        report.attributes = attributes.iter().map(AttributeDefinition::to_string).collect();
        report.key = primary_key(&table, &attributes).ok().map(|k| k.name.clone());

        if dry_run {
            info!(
                "{} -> {}: key {}, attributes [{}]",
                table,
                report.destination_table,
                report.key.as_deref().unwrap_or("<none>"),
                report.attributes.join(", ")
            );
            return Ok(());
        }

        if migration.create_table {
            let ready =
                ensure_table(self.target.as_ref(), &report.destination_table, &attributes).await?;
            report.created = Some(ready.created);
        }

        let cursor = self.source.stream_rows(database, &table, &columns).await?;
        let stats = migrate(
            self.target.as_ref(),
            &report.destination_table,
            cursor,
            &columns,
            &attributes,
            migration.batch_size,
        )
        .await?;

        report.items_written = stats.items_written;
        report.batches = stats.batches;
        report.unprocessed_items = stats.unprocessed_items;
        Ok(())
    }
}
