//! Schema metadata for source columns and destination attributes.
//!
//! A [`ColumnDefinition`] describes one column as reported by the source
//! database. The schema translator turns the ordered column list of a table
//! into an ordered list of [`AttributeDefinition`]s that drives both table
//! provisioning and row conversion.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Column metadata read from the source database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name in its original casing.
    pub name: String,

    /// Native data type (e.g., "int", "tinyint", "blob", "varchar").
    pub native_type: String,

    /// Whether the column belongs to the primary index.
    pub is_primary_key: bool,
}

impl ColumnDefinition {
    /// Create a column definition.
    pub fn new(
        name: impl Into<String>,
        native_type: impl Into<String>,
        is_primary_key: bool,
    ) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            is_primary_key,
        }
    }

    /// Whether the reader must fetch this column as raw bytes rather than text.
    pub fn is_binary(&self) -> bool {
        let native = self.native_type.to_lowercase();
        native.ends_with("blob") || native == "binary" || native == "varbinary"
    }
}

/// Destination attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    Number,
    String,
    Binary,
    Boolean,
}

impl AttributeType {
    /// DynamoDB data type descriptor (`N`, `S`, `B`, `BOOL`).
    pub fn tag(&self) -> &'static str {
        match self {
            AttributeType::Number => "N",
            AttributeType::String => "S",
            AttributeType::Binary => "B",
            AttributeType::Boolean => "BOOL",
        }
    }

    /// Whether a key attribute may use this type.
    ///
    /// DynamoDB key attributes must be scalar `S`, `N` or `B`.
    pub fn is_key_type(&self) -> bool {
        !matches!(self, AttributeType::Boolean)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttributeType::Number => "NUMBER",
            AttributeType::String => "STRING",
            AttributeType::Binary => "BINARY",
            AttributeType::Boolean => "BOOLEAN",
        })
    }
}

/// Destination attribute derived from a source column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Attribute name, normalized to UpperCamelCase.
    pub name: String,

    /// Attribute type.
    pub attribute_type: AttributeType,

    /// Whether this attribute is the partition key.
    pub is_primary_key: bool,
}

impl AttributeDefinition {
    /// Create an attribute definition.
    pub fn new(
        name: impl Into<String>,
        attribute_type: AttributeType,
        is_primary_key: bool,
    ) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            is_primary_key,
        }
    }
}

impl fmt::Display for AttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.attribute_type)?;
        if self.is_primary_key {
            f.write_str("(PK)")?;
        }
        Ok(())
    }
}
