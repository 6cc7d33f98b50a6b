//! Identifier handling for source queries and destination attribute names.
//!
//! Source identifiers (database, table and column names) cannot be passed as
//! parameters in prepared statements, so queries that name them are built
//! with validated, backtick-quoted identifiers.
//!
//! Destination attribute names are normalized to UpperCamelCase regardless of
//! the source casing: `user_id`, `user-id` and `userId` all become `UserId`.

use convert_case::{Boundary, Case, Converter};

use crate::error::{MigrateError, Result};

/// Maximum identifier length.
/// - MySQL: 64 characters
/// - DynamoDB table names: 255 characters
const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Validate an identifier for security issues.
///
/// Rejects:
/// - Empty identifiers
/// - Identifiers containing null bytes (injection vector)
/// - Identifiers exceeding maximum length
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(MigrateError::Config(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks.
///
/// Escapes backticks by doubling them and wraps in backticks.
/// Validates the identifier before quoting.
///
/// ```ignore
/// assert_eq!(quote_mysql("users")?, "`users`");
/// assert_eq!(quote_mysql("table`name")?, "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Qualify a MySQL table name with its database.
pub fn qualify_mysql(database: &str, table: &str) -> Result<String> {
    Ok(format!("{}.{}", quote_mysql(database)?, quote_mysql(table)?))
}

/// Normalize a source column name to an UpperCamelCase attribute name.
///
/// Word boundaries are taken from `_`, `-`, spaces and case changes only.
/// Digits never split a word: `md5hash` becomes `Md5hash`.
pub fn attribute_name(column: &str) -> String {
    Converter::new()
        .set_boundaries(&[
            Boundary::Underscore,
            Boundary::Hyphen,
            Boundary::Space,
            Boundary::LowerUpper,
            Boundary::Acronym,
        ])
        .to_case(Case::Pascal)
        .convert(column)
}
