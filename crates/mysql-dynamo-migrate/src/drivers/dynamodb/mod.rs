//! DynamoDB target driver.
//!
//! Credentials and region come from the standard AWS provider chain
//! (environment, profile, instance metadata). `target.region` and
//! `target.endpoint_url` override them, the latter for DynamoDB Local.

mod writer;

pub use writer::{scalar_type, to_attribute_map, to_attribute_value, DynamoWriter};
