//! MySQL/MariaDB source driver.
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+
//!
//! Connections are made with SQLx from the `source` config section.

mod reader;

pub use reader::MysqlReader;
