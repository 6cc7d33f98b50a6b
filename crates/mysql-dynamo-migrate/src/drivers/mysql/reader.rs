//! MySQL/MariaDB source reader implementation.
//!
//! Implements the `SourceReader` trait on top of a SQLx connection pool.
//! Every non-binary column is selected as `CAST(col AS CHAR)` so rows decode
//! uniformly into text; binary columns are selected raw.

use std::time::Duration;

use async_stream::try_stream;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow, MySqlSslMode};
use sqlx::{Executor, Row as _, Statement};
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::core::identifier::{qualify_mysql, quote_mysql};
use crate::core::schema::ColumnDefinition;
use crate::core::traits::{RowCursor, SourceReader};
use crate::core::value::{Row, SourceValue};
use crate::error::{MigrateError, Result};

/// Connection pool timeout.
const POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Rows are read by one cursor at a time, metadata queries run between them.
const POOL_MAX_CONNECTIONS: u32 = 2;

/// MySQL/MariaDB source reader.
pub struct MysqlReader {
    pool: MySqlPool,
}

impl MysqlReader {
    /// Connect to the source database and verify the connection.
    pub async fn new(config: &SourceConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(MySqlSslMode::Preferred);

        let pool = MySqlPoolOptions::new()
            .max_connections(POOL_MAX_CONNECTIONS)
            .acquire_timeout(POOL_CONNECTION_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| MigrateError::pool(e, "creating MySQL source pool"))?;

        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map_err(|e| MigrateError::pool(e, "testing MySQL source connection"))?;

        info!(
            "Connected to MySQL source: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self { pool })
    }

    /// Build the full-table select for a column list.
    fn build_select(database: &str, table: &str, columns: &[ColumnDefinition]) -> Result<String> {
        if columns.is_empty() {
            return Err(MigrateError::Config(format!(
                "table {}.{} has no columns to select",
                database, table
            )));
        }

        let mut select = Vec::with_capacity(columns.len());
        for col in columns {
            let quoted = quote_mysql(&col.name)?;
            if col.is_binary() {
                select.push(quoted);
            } else {
                select.push(format!("CAST({0} AS CHAR) AS {0}", quoted));
            }
        }

        let mut sql = format!(
            "SELECT {} FROM {}",
            select.join(", "),
            qualify_mysql(database, table)?
        );

        // Stable order when the table has a single-column key.
        let keys: Vec<&ColumnDefinition> = columns.iter().filter(|c| c.is_primary_key).collect();
        if let [key] = keys.as_slice() {
            sql.push_str(&format!(" ORDER BY {}", quote_mysql(&key.name)?));
        }

        Ok(sql)
    }

    /// Stream the rows of a select, owning the pool handle and the SQL text.
    fn row_stream(
        pool: MySqlPool,
        sql: String,
        binary: Vec<bool>,
        context: String,
    ) -> impl Stream<Item = Result<Row>> + Send + 'static {
        try_stream! {
            let mut results = sqlx::query(&sql).fetch(&pool);
            while let Some(row) = results
                .try_next()
                .await
                .map_err(|e| MigrateError::pool(e, context.clone()))?
            {
                yield Self::decode_row(&row, &binary)?;
            }
        }
    }

    /// Decode one result row, binary columns as bytes and the rest as text.
    fn decode_row(row: &MySqlRow, binary: &[bool]) -> Result<Row> {
        binary
            .iter()
            .enumerate()
            .map(|(i, &is_binary)| {
                let value = if is_binary {
                    row.try_get::<Option<Vec<u8>>, _>(i).map(SourceValue::from)
                } else {
                    row.try_get::<Option<String>, _>(i).map(SourceValue::from)
                };
                value.map_err(|e| MigrateError::pool(e, format!("decoding MySQL column {}", i)))
            })
            .collect()
    }
}

#[async_trait]
impl SourceReader for MysqlReader {
    async fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        // CAST to CHAR to handle collation differences where information_schema
        // may return VARBINARY instead of VARCHAR
        let query = r#"
            SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
            FROM INFORMATION_SCHEMA.TABLES
            WHERE TABLE_SCHEMA = ? AND TABLE_TYPE = 'BASE TABLE'
            ORDER BY TABLE_NAME
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(database)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::pool(e, "listing MySQL tables"))?;

        let tables = rows
            .iter()
            .map(|row| row.try_get::<String, _>("TABLE_NAME"))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| MigrateError::pool(e, "listing MySQL tables"))?;

        info!("Found {} tables in MySQL database '{}'", tables.len(), database);
        Ok(tables)
    }

    async fn list_columns(&self, database: &str, table: &str) -> Result<Vec<ColumnDefinition>> {
        let query = r#"
            SELECT
                CAST(c.COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
                CAST(c.DATA_TYPE AS CHAR(255)) AS DATA_TYPE,
                CAST(IF(s.INDEX_NAME IS NULL, 0, 1) AS SIGNED) AS is_primary
            FROM INFORMATION_SCHEMA.COLUMNS c
            LEFT JOIN INFORMATION_SCHEMA.STATISTICS s
                ON s.TABLE_SCHEMA = c.TABLE_SCHEMA
                AND s.TABLE_NAME = c.TABLE_NAME
                AND s.COLUMN_NAME = c.COLUMN_NAME
                AND s.INDEX_NAME = 'PRIMARY'
            WHERE c.TABLE_SCHEMA = ? AND c.TABLE_NAME = ?
            ORDER BY c.ORDINAL_POSITION
        "#;

        let rows: Vec<MySqlRow> = sqlx::query(query)
            .bind(database)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MigrateError::pool(e, "loading MySQL columns"))?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row
                .try_get("COLUMN_NAME")
                .map_err(|e| MigrateError::pool(e, "loading MySQL columns"))?;
            let data_type: String = row
                .try_get("DATA_TYPE")
                .map_err(|e| MigrateError::pool(e, "loading MySQL columns"))?;
            let is_primary: i64 = row
                .try_get("is_primary")
                .map_err(|e| MigrateError::pool(e, "loading MySQL columns"))?;
            columns.push(ColumnDefinition::new(name, data_type, is_primary == 1));
        }

        debug!(
            "Loaded {} columns for {}.{}",
            columns.len(),
            database,
            table
        );
        Ok(columns)
    }

    async fn stream_rows(
        &self,
        database: &str,
        table: &str,
        columns: &[ColumnDefinition],
    ) -> Result<RowCursor> {
        let sql = Self::build_select(database, table, columns)?;
        debug!("{}.{}: {}", database, table, sql);

        let width = {
            let stmt = (&self.pool)
                .prepare(&sql)
                .await
                .map_err(|e| MigrateError::pool(e, format!("preparing select for {}", table)))?;
            stmt.columns().len()
        };

        let binary: Vec<bool> = columns.iter().map(|c| c.is_binary()).collect();
        let context = format!("reading MySQL rows from {}.{}", database, table);
        let rows = Self::row_stream(self.pool.clone(), sql, binary, context);

        Ok(RowCursor::new(width, Box::pin(rows)))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MigrateError::pool(e, "testing MySQL connection"))?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "mysql"
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
