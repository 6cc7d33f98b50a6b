//! Configuration validation.

use super::Config;
use crate::core::identifier::validate_identifier;
use crate::error::{MigrateError, Result};

/// Largest batch accepted by DynamoDB BatchWriteItem.
pub const MAX_BATCH_SIZE: usize = 25;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.host.is_empty() {
        return Err(MigrateError::Config("source.host is required".into()));
    }
    if config.source.database.is_empty() {
        return Err(MigrateError::Config("source.database is required".into()));
    }
    if config.source.user.is_empty() {
        return Err(MigrateError::Config("source.user is required".into()));
    }
    if config.source.port == 0 {
        return Err(MigrateError::Config("source.port must be non-zero".into()));
    }
    validate_identifier(&config.source.database)?;

    // Target validation
    if let Some(region) = &config.target.region {
        if region.trim().is_empty() {
            return Err(MigrateError::Config(
                "target.region must not be empty when set".into(),
            ));
        }
    }
    if let Some(endpoint) = &config.target.endpoint_url {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(MigrateError::Config(format!(
                "target.endpoint_url must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
    }

    // Migration validation
    let migration = &config.migration;
    if migration.batch_size == 0 || migration.batch_size > MAX_BATCH_SIZE {
        return Err(MigrateError::Config(format!(
            "migration.batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, migration.batch_size
        )));
    }
    if migration.prefix_with_database && migration.prefix_separator.is_empty() {
        return Err(MigrateError::Config(
            "migration.prefix_separator must not be empty when prefix_with_database is set"
                .into(),
        ));
    }
    if let Some(table) = &migration.table {
        validate_identifier(table)?;
    }

    Ok(())
}
