//! DynamoDB target writer implementation.
//!
//! Implements the `TargetWriter` trait with the AWS SDK. Tables are created
//! with a single HASH key and on-demand billing; items are written with
//! BatchWriteItem, one request per batch.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType, PutRequest,
    ScalarAttributeType, TableStatus, WriteRequest,
};
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use crate::config::TargetConfig;
use crate::core::schema::AttributeType;
use crate::core::traits::{BatchWriteOutcome, CreateTableOutcome, TargetWriter};
use crate::core::value::{Item, ItemValue};
use crate::error::{MigrateError, Result};

/// Delay between DescribeTable polls while waiting for a table.
const ACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// DescribeTable polls before giving up on a table.
const ACTIVE_MAX_ATTEMPTS: u32 = 60;

/// DynamoDB target writer.
#[derive(Debug, Clone)]
pub struct DynamoWriter {
    client: Client,
}

impl DynamoWriter {
    /// Build a client from the default AWS credential and region chain,
    /// with optional region and endpoint overrides.
    pub async fn new(config: &TargetConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        if sdk_config.region().is_none() {
            return Err(MigrateError::Config(
                "no AWS region configured: set target.region or AWS_REGION".to_string(),
            ));
        }

        info!(
            "DynamoDB target: region {}{}",
            sdk_config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_default(),
            config
                .endpoint_url
                .as_deref()
                .map(|e| format!(", endpoint {}", e))
                .unwrap_or_default()
        );

        Ok(Self::from_client(Client::new(&sdk_config)))
    }

    /// Wrap an existing client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// Map a key attribute type to its DynamoDB scalar type.
pub fn scalar_type(attribute_type: AttributeType) -> Result<ScalarAttributeType> {
    match attribute_type {
        AttributeType::Number => Ok(ScalarAttributeType::N),
        AttributeType::String => Ok(ScalarAttributeType::S),
        AttributeType::Binary => Ok(ScalarAttributeType::B),
        AttributeType::Boolean => Err(MigrateError::Config(
            "BOOLEAN cannot be used as a key attribute type".to_string(),
        )),
    }
}

/// Convert an item value to its DynamoDB wire form.
pub fn to_attribute_value(value: ItemValue) -> AttributeValue {
    match value {
        ItemValue::Number(n) => AttributeValue::N(n),
        ItemValue::String(s) => AttributeValue::S(s),
        ItemValue::Binary(b) => AttributeValue::B(Blob::new(b)),
        ItemValue::Boolean(b) => AttributeValue::Bool(b),
        ItemValue::Null => AttributeValue::Null(true),
    }
}

/// Convert an item to a DynamoDB attribute map.
pub fn to_attribute_map(item: Item) -> HashMap<String, AttributeValue> {
    item.into_iter()
        .map(|(name, value)| (name, to_attribute_value(value)))
        .collect()
}

#[async_trait]
impl TargetWriter for DynamoWriter {
    async fn create_table(
        &self,
        table: &str,
        key_name: &str,
        key_type: AttributeType,
    ) -> Result<CreateTableOutcome> {
        let definition = AttributeDefinition::builder()
            .attribute_name(key_name)
            .attribute_type(scalar_type(key_type)?)
            .build()
            .map_err(|e| MigrateError::provision(table, e.to_string()))?;
        let key_schema = KeySchemaElement::builder()
            .attribute_name(key_name)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| MigrateError::provision(table, e.to_string()))?;

        let result = self
            .client
            .create_table()
            .table_name(table)
            .attribute_definitions(definition)
            .key_schema(key_schema)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await;

        match result {
            Ok(_) => Ok(CreateTableOutcome::Created),
            Err(err)
                if err
                    .as_service_error()
                    .map(|e| e.is_resource_in_use_exception())
                    .unwrap_or(false) =>
            {
                debug!("CreateTable {}: {}", table, DisplayErrorContext(&err));
                Ok(CreateTableOutcome::AlreadyExists)
            }
            Err(err) => Err(MigrateError::provision(
                table,
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn wait_until_active(&self, table: &str) -> Result<()> {
        for attempt in 1..=ACTIVE_MAX_ATTEMPTS {
            let output = self
                .client
                .describe_table()
                .table_name(table)
                .send()
                .await
                .map_err(|e| MigrateError::provision(table, DisplayErrorContext(&e).to_string()))?;

            let status = output.table().and_then(|t| t.table_status());
            if status == Some(&TableStatus::Active) {
                return Ok(());
            }

            debug!(
                "Table {} is {:?} (attempt {}/{})",
                table, status, attempt, ACTIVE_MAX_ATTEMPTS
            );
            tokio::time::sleep(ACTIVE_POLL_INTERVAL).await;
        }

        Err(MigrateError::provision(
            table,
            format!(
                "table did not become ACTIVE after {} checks",
                ACTIVE_MAX_ATTEMPTS
            ),
        ))
    }

    async fn batch_write(&self, table: &str, items: Vec<Item>) -> Result<BatchWriteOutcome> {
        let count = items.len();
        let mut requests = Vec::with_capacity(count);
        for item in items {
            let put = PutRequest::builder()
                .set_item(Some(to_attribute_map(item)))
                .build()
                .map_err(|e| MigrateError::transfer(table, e.to_string()))?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }

        let output = self
            .client
            .batch_write_item()
            .request_items(table, requests)
            .send()
            .await
            .map_err(|e| MigrateError::transfer(table, DisplayErrorContext(&e).to_string()))?;

        let unprocessed = output
            .unprocessed_items()
            .and_then(|m| m.get(table))
            .map(Vec::len)
            .unwrap_or(0);

        Ok(BatchWriteOutcome {
            written: count.saturating_sub(unprocessed),
            unprocessed,
        })
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .list_tables()
            .limit(1)
            .send()
            .await
            .map_err(|e| {
                MigrateError::pool(DisplayErrorContext(&e), "testing DynamoDB connection")
            })?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "dynamodb"
    }
}
