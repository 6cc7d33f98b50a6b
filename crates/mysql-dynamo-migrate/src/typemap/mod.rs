//! Type mapping between MySQL columns and DynamoDB attributes.

use std::collections::HashSet;

use tracing::debug;

use crate::core::identifier::attribute_name;
use crate::core::schema::{AttributeDefinition, AttributeType, ColumnDefinition};
use crate::error::{MigrateError, Result};

/// Type coercion flags applied while translating a table schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypePolicy {
    /// Map `tinyint` columns to BOOLEAN.
    pub tinyint_as_bool: bool,
    /// Map primary key columns to STRING whatever their native type.
    pub force_pk_as_string: bool,
}

/// Map a single column to its destination attribute type.
///
/// Rules are evaluated in order, first match wins:
/// forced string key, tinyint as bool, `*int`, `*blob`, string.
pub fn map_type(column: &ColumnDefinition, policy: TypePolicy) -> AttributeType {
    let native = column.native_type.to_lowercase();

    if policy.force_pk_as_string && column.is_primary_key {
        AttributeType::String
    } else if policy.tinyint_as_bool && native == "tinyint" {
        AttributeType::Boolean
    } else if native.ends_with("int") {
        AttributeType::Number
    } else if native.ends_with("blob") {
        AttributeType::Binary
    } else {
        AttributeType::String
    }
}

/// Translate a table's ordered column list into destination attributes.
///
/// The output has one attribute per column, in the same order.
pub fn translate(
    columns: &[ColumnDefinition],
    policy: TypePolicy,
) -> Result<Vec<AttributeDefinition>> {
    if columns.is_empty() {
        return Err(MigrateError::Config(
            "cannot translate a table without columns".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(columns.len());
    let mut attributes = Vec::with_capacity(columns.len());

    for column in columns {
        let name = attribute_name(&column.name);
        if name.is_empty() {
            return Err(MigrateError::Config(format!(
                "column {:?} has no usable attribute name",
                column.name
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(MigrateError::Config(format!(
                "column {:?} maps to attribute {} which is already taken by another column",
                column.name, name
            )));
        }

        let attribute_type = map_type(column, policy);
        debug!(
            "{} ({}) -> {} ({})",
            column.name, column.native_type, name, attribute_type
        );

        attributes.push(AttributeDefinition {
            name,
            attribute_type,
            is_primary_key: column.is_primary_key,
        });
    }

    Ok(attributes)
}

/// Get the single primary key attribute of a translated table.
pub fn primary_key<'a>(
    table: &str,
    attributes: &'a [AttributeDefinition],
) -> Result<&'a AttributeDefinition> {
    let keys: Vec<&AttributeDefinition> =
        attributes.iter().filter(|a| a.is_primary_key).collect();

    match keys.as_slice() {
        [key] => Ok(*key),
        [] => Err(MigrateError::NoPrimaryKey(table.to_string())),
        _ => Err(MigrateError::AmbiguousPrimaryKey {
            table: table.to_string(),
            columns: keys.iter().map(|a| a.name.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NATIVE_TYPES: &[&str] = &[
        "int", "bigint", "smallint", "tinyint", "mediumint", "blob", "tinyblob", "mediumblob",
        "longblob", "varchar", "char", "text", "date", "datetime", "timestamp", "decimal",
        "double", "enum", "json", "geometry", "",
    ];

    fn col(name: &str, native: &str, pk: bool) -> ColumnDefinition {
        ColumnDefinition::new(name, native, pk)
    }

    const NO_FLAGS: TypePolicy = TypePolicy {
        tinyint_as_bool: false,
        force_pk_as_string: false,
    };

    #[test]
    fn test_integer_types() {
        for native in ["int", "bigint", "smallint", "tinyint", "mediumint"] {
            assert_eq!(map_type(&col("n", native, false), NO_FLAGS), AttributeType::Number);
        }
    }

    #[test]
    fn test_blob_types() {
        for native in ["blob", "tinyblob", "mediumblob", "longblob"] {
            assert_eq!(map_type(&col("b", native, false), NO_FLAGS), AttributeType::Binary);
        }
    }

    #[test]
    fn test_catch_all_is_string() {
        for native in ["varchar", "text", "datetime", "decimal", "enum", "json", "varbinary"] {
            assert_eq!(map_type(&col("s", native, false), NO_FLAGS), AttributeType::String);
        }
    }

    #[test]
    fn test_native_type_is_case_insensitive() {
        assert_eq!(map_type(&col("n", "BIGINT", false), NO_FLAGS), AttributeType::Number);
        assert_eq!(map_type(&col("b", "LongBlob", false), NO_FLAGS), AttributeType::Binary);
    }

    #[test]
    fn test_every_native_type_gets_a_type_under_every_policy() {
        let policies = [
            NO_FLAGS,
            TypePolicy {
                tinyint_as_bool: true,
                force_pk_as_string: false,
            },
            TypePolicy {
                tinyint_as_bool: false,
                force_pk_as_string: true,
            },
            TypePolicy {
                tinyint_as_bool: true,
                force_pk_as_string: true,
            },
        ];
        for policy in policies {
            for native in NATIVE_TYPES {
                for pk in [false, true] {
                    let columns = vec![col("c", native, pk)];
                    let attrs = translate(&columns, policy).unwrap();
                    assert_eq!(attrs.len(), 1);
                    assert!(matches!(
                        attrs[0].attribute_type,
                        AttributeType::Number
                            | AttributeType::String
                            | AttributeType::Binary
                            | AttributeType::Boolean
                    ));
                }
            }
        }
    }

    #[test]
    fn test_tinyint_as_bool() {
        let policy = TypePolicy {
            tinyint_as_bool: true,
            force_pk_as_string: false,
        };
        assert_eq!(map_type(&col("active", "tinyint", false), policy), AttributeType::Boolean);
        // Only tinyint, not the other integer widths
        assert_eq!(map_type(&col("qty", "smallint", false), policy), AttributeType::Number);
    }

    #[test]
    fn test_force_pk_as_string_overrides_everything() {
        let policy = TypePolicy {
            tinyint_as_bool: true,
            force_pk_as_string: true,
        };
        for native in NATIVE_TYPES {
            assert_eq!(map_type(&col("id", native, true), policy), AttributeType::String);
        }
        // Non-key columns keep their normal mapping
        assert_eq!(map_type(&col("active", "tinyint", false), policy), AttributeType::Boolean);
        assert_eq!(map_type(&col("n", "int", false), policy), AttributeType::Number);
    }

    #[test]
    fn test_tinyint_key_without_force_is_boolean() {
        let policy = TypePolicy {
            tinyint_as_bool: true,
            force_pk_as_string: false,
        };
        assert_eq!(map_type(&col("id", "tinyint", true), policy), AttributeType::Boolean);
    }

    #[test]
    fn test_translate_users_table() {
        let columns = vec![
            col("id", "int", true),
            col("name", "varchar", false),
            col("active", "tinyint", false),
            col("photo", "blob", false),
        ];
        let policy = TypePolicy {
            tinyint_as_bool: true,
            force_pk_as_string: false,
        };
        let attrs = translate(&columns, policy).unwrap();

        assert_eq!(
            attrs,
            vec![
                AttributeDefinition::new("Id", AttributeType::Number, true),
                AttributeDefinition::new("Name", AttributeType::String, false),
                AttributeDefinition::new("Active", AttributeType::Boolean, false),
                AttributeDefinition::new("Photo", AttributeType::Binary, false),
            ]
        );
    }

    #[test]
    fn test_translate_preserves_order_and_key_flags() {
        let columns = vec![
            col("z_last", "int", false),
            col("a_first", "varchar", false),
            col("m_key", "bigint", true),
        ];
        let attrs = translate(&columns, NO_FLAGS).unwrap();
        let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["ZLast", "AFirst", "MKey"]);
        let keys: Vec<bool> = attrs.iter().map(|a| a.is_primary_key).collect();
        assert_eq!(keys, vec![false, false, true]);
    }

    #[test]
    fn test_translate_keeps_digits_in_attribute_names() {
        let columns = vec![
            col("md5hash", "char", true),
            col("utf8mb4_text", "text", false),
            col("address_line1", "varchar", false),
        ];
        let attrs = translate(&columns, NO_FLAGS).unwrap();
        let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Md5hash", "Utf8mb4Text", "AddressLine1"]);
        assert_eq!(primary_key("hashes", &attrs).unwrap().name, "Md5hash");
    }

    #[test]
    fn test_translate_empty_is_config_error() {
        let err = translate(&[], NO_FLAGS).unwrap_err();
        assert!(matches!(err, MigrateError::Config(_)));
    }

    #[test]
    fn test_translate_rejects_colliding_names() {
        let columns = vec![col("user_id", "int", true), col("userId", "int", false)];
        let err = translate(&columns, NO_FLAGS).unwrap_err();
        assert!(err.to_string().contains("UserId"));
    }

    #[test]
    fn test_primary_key_single() {
        let attrs = vec![
            AttributeDefinition::new("Name", AttributeType::String, false),
            AttributeDefinition::new("Id", AttributeType::Number, true),
        ];
        let key = primary_key("users", &attrs).unwrap();
        assert_eq!(key.name, "Id");
    }

    #[test]
    fn test_primary_key_missing() {
        let attrs = vec![AttributeDefinition::new("Name", AttributeType::String, false)];
        let err = primary_key("logs", &attrs).unwrap_err();
        assert!(matches!(err, MigrateError::NoPrimaryKey(ref t) if t == "logs"));
    }

    #[test]
    fn test_primary_key_composite_is_rejected() {
        let attrs = vec![
            AttributeDefinition::new("OrderId", AttributeType::Number, true),
            AttributeDefinition::new("LineNo", AttributeType::Number, true),
        ];
        let err = primary_key("order_lines", &attrs).unwrap_err();
        match err {
            MigrateError::AmbiguousPrimaryKey { table, columns } => {
                assert_eq!(table, "order_lines");
                assert_eq!(columns, vec!["OrderId".to_string(), "LineNo".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
