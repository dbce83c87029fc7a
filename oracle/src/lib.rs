//! # sqljson-oracle
//!
//! Oracle adapter for format-style SQL.
//!
//! Statements compiled by `sqljson-core` use `%s` placeholders. This crate
//! rewrites them into Oracle bind variables, converts parameters (booleans,
//! timestamps, large strings) and fetched NUMBER columns, and initializes
//! each session. The network client stays behind the [`driver::DriverConnection`]
//! and [`driver::DriverCursor`] traits.

pub mod driver;
pub mod error;
pub mod types;

pub use driver::{
    DriverConnection, DriverCursor, FormatStylePlaceholderCursor, OracleConnection,
    OracleDatabase, OracleSettings, Params,
};
pub use error::{DriverError, OracleError, OracleResult, wrap_oracle_errors};
pub use types::{InputSize, OracleParam, Param};
