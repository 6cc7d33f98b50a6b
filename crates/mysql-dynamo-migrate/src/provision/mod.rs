//! Destination table provisioning.
//!
//! Tables are keyed by a single hash attribute taken from the translated
//! schema. Only the key attribute is declared up front; every other
//! attribute is supplied per item when rows are written.

use tracing::info;

use crate::core::schema::{AttributeDefinition, AttributeType};
use crate::core::traits::{CreateTableOutcome, TargetWriter};
use crate::error::{MigrateError, Result};
use crate::typemap::primary_key;

/// A destination table that is active and accepts writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReady {
    /// Destination table name.
    pub table_name: String,
    /// Hash key attribute name.
    pub key_name: String,
    /// Hash key attribute type.
    pub key_type: AttributeType,
    /// Whether this call created the table.
    pub created: bool,
}

/// Create the destination table if it is missing and wait until it is active.
///
/// An existing table is not an error. Any other create failure is.
pub async fn ensure_table<W>(
    writer: &W,
    table_name: &str,
    attributes: &[AttributeDefinition],
) -> Result<TableReady>
where
    W: TargetWriter + ?Sized,
{
    let key = primary_key(table_name, attributes)?;
    if !key.attribute_type.is_key_type() {
        return Err(MigrateError::Config(format!(
            "key attribute {} of table {} is {}; keys must be STRING, NUMBER or BINARY \
             (use force_pk_as_string or disable tinyint_as_bool)",
            key.name, table_name, key.attribute_type
        )));
    }

    let outcome = writer
        .create_table(table_name, &key.name, key.attribute_type)
        .await?;
    match outcome {
        CreateTableOutcome::Created => {
            info!(
                "Created table {} (key {} {})",
                table_name,
                key.name,
                key.attribute_type.tag()
            );
        }
        CreateTableOutcome::AlreadyExists => {
            info!("Table {} already exists", table_name);
        }
    }

    // Writes issued before the table is active are rejected.
    writer.wait_until_active(table_name).await?;

    Ok(TableReady {
        table_name: table_name.to_string(),
        key_name: key.name.clone(),
        key_type: key.attribute_type,
        created: outcome == CreateTableOutcome::Created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryTarget;

    fn users_attributes() -> Vec<AttributeDefinition> {
        vec![
            AttributeDefinition::new("Id", AttributeType::Number, true),
            AttributeDefinition::new("Name", AttributeType::String, false),
        ]
    }

    #[tokio::test]
    async fn test_creates_table_with_single_hash_key() {
        let target = MemoryTarget::default();
        let ready = ensure_table(&target, "users", &users_attributes())
            .await
            .unwrap();

        assert!(ready.created);
        assert_eq!(ready.key_name, "Id");
        assert_eq!(ready.key_type, AttributeType::Number);

        let state = target.state.lock().unwrap();
        assert_eq!(
            state.tables.get("users"),
            Some(&("Id".to_string(), AttributeType::Number))
        );
        assert!(state.active.contains("users"));
    }

    #[tokio::test]
    async fn test_second_call_is_idempotent() {
        let target = MemoryTarget::default();
        let first = ensure_table(&target, "users", &users_attributes())
            .await
            .unwrap();
        let second = ensure_table(&target, "users", &users_attributes())
            .await
            .unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.table_name, second.table_name);
        assert_eq!(first.key_name, second.key_name);
        assert_eq!(first.key_type, second.key_type);
        assert_eq!(target.state.lock().unwrap().create_calls, 2);
    }

    #[tokio::test]
    async fn test_create_failure_is_fatal() {
        let target = MemoryTarget {
            fail_create: true,
            ..Default::default()
        };
        let err = ensure_table(&target, "users", &users_attributes())
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::Provision { .. }));
        assert!(target.state.lock().unwrap().active.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let target = MemoryTarget::default();
        let attrs = vec![AttributeDefinition::new("Name", AttributeType::String, false)];
        let err = ensure_table(&target, "logs", &attrs).await.unwrap_err();
        assert!(matches!(err, MigrateError::NoPrimaryKey(_)));
        assert_eq!(target.state.lock().unwrap().create_calls, 0);
    }

    #[tokio::test]
    async fn test_composite_key_is_config_error() {
        let target = MemoryTarget::default();
        let attrs = vec![
            AttributeDefinition::new("OrderId", AttributeType::Number, true),
            AttributeDefinition::new("LineNo", AttributeType::Number, true),
        ];
        let err = ensure_table(&target, "order_lines", &attrs)
            .await
            .unwrap_err();
        assert!(matches!(err, MigrateError::AmbiguousPrimaryKey { .. }));
        assert_eq!(target.state.lock().unwrap().create_calls, 0);
    }

    #[tokio::test]
    async fn test_boolean_key_is_config_error() {
        let target = MemoryTarget::default();
        let attrs = vec![AttributeDefinition::new("Flag", AttributeType::Boolean, true)];
        let err = ensure_table(&target, "flags", &attrs).await.unwrap_err();
        assert!(err.is_config());
        assert_eq!(target.state.lock().unwrap().create_calls, 0);
    }
}
