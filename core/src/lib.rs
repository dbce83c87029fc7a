//! # sqljson-core
//!
//! Portable JSON column lookups for SQL databases.
//!
//! Key transforms (`value -> 'a' -> 0`) and JSON lookups (`has_key`,
//! `contains`, `exact`, `isnull`, text and numeric comparisons) are built as a
//! small expression tree and compiled into dialect-specific SQL for
//! PostgreSQL, MySQL/MariaDB, Oracle and SQLite.
//!
//! ```
//! use sqljson_core::prelude::*;
//! use serde_json::json;
//!
//! let lookup = Lookup::new(
//!     Expr::col("value").key("owner").key("name"),
//!     LookupKind::Exact,
//!     json!("alice"),
//! );
//! let sql = lookup.compile(&Connection::new(Dialect::Sqlite)).unwrap();
//! assert_eq!(sql.sql, "JSON_EXTRACT(\"value\", %s) = JSON_EXTRACT(%s, '$')");
//! ```
//!
//! Generated SQL uses format-style `%s` placeholders (literal `%` is written
//! as `%%`); see [`Fragment::render`] to get driver placeholders.

pub mod ast;
pub mod error;
pub mod field;
pub mod parser;
pub mod schema;
pub mod transpiler;

pub use error::JsonError;
pub use parser::{parse_filter_key, parse_lookup};

/// Convenient re-exports for building and compiling lookups.
pub mod prelude {
    pub use crate::ast::{Expr, Lookup, LookupKind, PathSegment, Rhs, SortOrder, Value};
    pub use crate::error::JsonError;
    pub use crate::field::{FieldDefault, JsonField};
    pub use crate::parser::{FilterKey, parse_filter_key, parse_lookup};
    pub use crate::schema::Schema;
    pub use crate::transpiler::{
        CompiledSql, Connection, Dialect, Features, Fragment, LikeVariant, Query, ToSql,
    };
}
