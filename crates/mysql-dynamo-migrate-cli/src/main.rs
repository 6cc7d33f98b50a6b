//! mysql-dynamo-migrate CLI - MySQL to DynamoDB migration.

use clap::{Parser, Subcommand};
use mysql_dynamo_migrate::{Config, MigrateError, MigrationConfig, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "mysql-dynamo-migrate")]
#[command(about = "Migrate MySQL tables into DynamoDB")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate tables from MySQL to DynamoDB
    Run {
        /// Dry run: translate schemas and show the plan without writing
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        overrides: MigrationOverrides,
    },

    /// Test source and target connections
    HealthCheck,
}

/// Command-line overrides for the `migration` config section.
#[derive(clap::Args, Debug, Default)]
struct MigrationOverrides {
    /// Migrate only this table
    #[arg(long)]
    table: Option<String>,

    /// Prefix destination table names with the database name
    #[arg(long)]
    prefix_with_database: bool,

    /// Separator between database and table name
    #[arg(long)]
    prefix_separator: Option<String>,

    /// Map tinyint columns to BOOLEAN
    #[arg(long)]
    tinyint_as_bool: bool,

    /// Map primary key columns to STRING
    #[arg(long)]
    force_pk_as_string: bool,

    /// Create destination tables before migrating
    #[arg(long)]
    create_table: bool,

    /// Items per bulk write (1-25)
    #[arg(long)]
    batch_size: Option<usize>,
}

impl MigrationOverrides {
    fn apply(self, migration: &mut MigrationConfig) {
        if let Some(table) = self.table {
            migration.table = Some(table);
        }
        if let Some(separator) = self.prefix_separator {
            migration.prefix_separator = separator;
        }
        if let Some(batch_size) = self.batch_size {
            migration.batch_size = batch_size;
        }
        migration.prefix_with_database |= self.prefix_with_database;
        migration.tinyint_as_bool |= self.tinyint_as_bool;
        migration.force_pk_as_string |= self.force_pk_as_string;
        migration.create_table |= self.create_table;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { dry_run, overrides } => {
            overrides.apply(&mut config.migration);
            config.validate()?;

            let orchestrator = Orchestrator::new(config).await?;
            let result = orchestrator.run(dry_run).await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else if dry_run {
                println!("\nDry run completed!");
                for table in &result.tables {
                    println!(
                        "  {} -> {} (key: {})",
                        table.source_table,
                        table.destination_table,
                        table.key.as_deref().unwrap_or("none")
                    );
                    println!("    {}", table.attributes.join(", "));
                }
            } else {
                println!("\nMigration {}!", result.status);
                println!("  Run ID: {}", result.run_id);
                println!("  Duration: {:.2}s", result.duration_seconds);
                println!(
                    "  Tables: {}/{}",
                    result.tables_success, result.tables_total
                );
                println!("  Items: {}", result.items_written);
                println!("  Throughput: {} items/sec", result.items_per_second);
                if !result.failed_tables.is_empty() {
                    println!("  Failed tables: {:?}", result.failed_tables);
                }
            }

            if let Some(err) = result.failure() {
                return Err(err);
            }
        }

        Commands::HealthCheck => {
            let result = Orchestrator::health_check(&config).await;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Source (MySQL): {} ({}ms)",
                    if result.source_connected { "OK" } else { "FAILED" },
                    result.source_latency_ms
                );
                if let Some(ref err) = result.source_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "  Target (DynamoDB): {} ({}ms)",
                    if result.target_connected { "OK" } else { "FAILED" },
                    result.target_latency_ms
                );
                if let Some(ref err) = result.target_error {
                    println!("    Error: {}", err);
                }
                println!(
                    "\n  Overall: {}",
                    if result.healthy { "HEALTHY" } else { "UNHEALTHY" }
                );
            }

            if !result.healthy {
                return Err(MigrateError::Config("Health check failed".to_string()));
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_given_fields() {
        let mut migration = MigrationConfig {
            prefix_separator: "-".to_string(),
            batch_size: 10,
            create_table: true,
            ..Default::default()
        };
        MigrationOverrides {
            table: Some("users".to_string()),
            tinyint_as_bool: true,
            ..Default::default()
        }
        .apply(&mut migration);

        assert_eq!(migration.table.as_deref(), Some("users"));
        assert!(migration.tinyint_as_bool);
        assert!(migration.create_table);
        assert_eq!(migration.prefix_separator, "-");
        assert_eq!(migration.batch_size, 10);
        assert!(!migration.force_pk_as_string);
    }

    #[test]
    fn test_cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "mysql-dynamo-migrate",
            "-c",
            "custom.yaml",
            "run",
            "--table",
            "orders",
            "--batch-size",
            "5",
            "--create-table",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("custom.yaml"));
        match cli.command {
            Commands::Run { dry_run, overrides } => {
                assert!(dry_run);
                assert_eq!(overrides.table.as_deref(), Some("orders"));
                assert_eq!(overrides.batch_size, Some(5));
                assert!(overrides.create_table);
                assert!(!overrides.prefix_with_database);
            }
            Commands::HealthCheck => panic!("expected run"),
        }
    }
}
