//! Value types for moving rows from the source into destination items.
//!
//! Source values are kept in their raw form ([`SourceValue`]): the reader does
//! not interpret column types beyond deciding between text and bytes. The
//! destination attribute type decides how each value is converted into an
//! [`ItemValue`].

use std::borrow::Cow;
use std::collections::BTreeMap;

/// Nullable scalar read from a source row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceValue {
    /// SQL NULL.
    Null,

    /// Canonical text form of the value.
    Text(String),

    /// Raw bytes (binary and blob columns).
    Bytes(Vec<u8>),
}

impl SourceValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SourceValue::Null)
    }

    /// String form of the value.
    ///
    /// NULL becomes the empty string and bytes are decoded lossily as UTF-8.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            SourceValue::Null => Cow::Borrowed(""),
            SourceValue::Text(s) => Cow::Borrowed(s.as_str()),
            SourceValue::Bytes(b) => String::from_utf8_lossy(b),
        }
    }

    /// Consume the value and return its byte content.
    ///
    /// NULL becomes an empty byte sequence.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            SourceValue::Null => Vec::new(),
            SourceValue::Text(s) => s.into_bytes(),
            SourceValue::Bytes(b) => b,
        }
    }
}

impl From<&str> for SourceValue {
    fn from(v: &str) -> Self {
        SourceValue::Text(v.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(v: String) -> Self {
        SourceValue::Text(v)
    }
}

impl From<Vec<u8>> for SourceValue {
    fn from(v: Vec<u8>) -> Self {
        SourceValue::Bytes(v)
    }
}

impl<T: Into<SourceValue>> From<Option<T>> for SourceValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SourceValue::Null)
    }
}

/// One source row, positionally aligned with the table's column list.
pub type Row = Vec<SourceValue>;

/// Typed value of a destination item attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValue {
    /// Number, carried as its decimal string form.
    Number(String),

    /// String.
    String(String),

    /// Binary payload.
    Binary(Vec<u8>),

    /// Boolean.
    Boolean(bool),

    /// Explicit null marker.
    Null,
}

/// Destination item: attribute name to typed value.
pub type Item = BTreeMap<String, ItemValue>;

/// Items awaiting a single bulk write.
#[derive(Debug, Default)]
pub struct WriteBatch {
    /// Items in append order.
    pub items: Vec<Item>,
}

impl WriteBatch {
    /// Create an empty batch with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append an item.
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Take the pending items, leaving the batch empty.
    pub fn take(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.items)
    }

    /// Get the number of items in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
