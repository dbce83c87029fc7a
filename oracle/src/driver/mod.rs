//! Driver boundary.
//!
//! The adapter never talks to the network itself. A concrete Oracle client
//! implements [`DriverConnection`] and [`DriverCursor`]; the adapter rewrites
//! statements and parameters on top of them.

mod connection;
mod cursor;

pub use connection::{OracleConnection, OracleDatabase, OracleSettings};
pub use cursor::{FormatStylePlaceholderCursor, NumberConverter, Params};

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::DriverError;
use crate::types::{BindValue, InputSize};

/// Bind variables for one execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Binds {
    Positional(Vec<BindValue>),
    Named(BTreeMap<String, BindValue>),
}

impl Binds {
    pub fn len(&self) -> usize {
        match self {
            Binds::Positional(values) => values.len(),
            Binds::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Input size hints, shaped like the binds they describe.
#[derive(Debug, Clone, PartialEq)]
pub enum InputSizes {
    Positional(Vec<Option<InputSize>>),
    Named(BTreeMap<String, InputSize>),
}

/// Column type reported in a cursor description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    Number,
    Varchar,
    Clob,
    Blob,
    Date,
    Timestamp,
    Other,
}

/// Column metadata for the current result set.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescription {
    pub name: String,
    pub db_type: DbType,
    /// 0 when the server reports none.
    pub precision: i16,
    /// -127 marks a floating point NUMBER.
    pub scale: i16,
}

impl ColumnDescription {
    pub fn new(name: &str, db_type: DbType) -> Self {
        Self {
            name: name.to_string(),
            db_type,
            precision: 0,
            scale: 0,
        }
    }

    pub fn number(name: &str, precision: i16, scale: i16) -> Self {
        Self {
            name: name.to_string(),
            db_type: DbType::Number,
            precision,
            scale,
        }
    }
}

/// A cell as fetched from the driver. NUMBER columns arrive as text.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Null,
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
}

/// A converted cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Decimal(Decimal),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(NaiveDateTime),
}

impl From<RawCell> for Cell {
    fn from(raw: RawCell) -> Self {
        match raw {
            RawCell::Null => Cell::Null,
            RawCell::Text(s) => Cell::Text(s),
            RawCell::Bytes(b) => Cell::Bytes(b),
            RawCell::Timestamp(ts) => Cell::Timestamp(ts),
        }
    }
}

/// Cursor of an Oracle client library.
pub trait DriverCursor {
    /// Execute `sql` (with `:name` bind variables) once.
    fn execute(&mut self, sql: &str, binds: &Binds) -> Result<(), DriverError>;

    /// Execute `sql` once per row of binds.
    fn execute_many(&mut self, sql: &str, rows: &[Binds]) -> Result<(), DriverError>;

    fn set_input_sizes(&mut self, sizes: &InputSizes) -> Result<(), DriverError>;

    /// Columns of the current result set, empty when there is none.
    fn description(&self) -> Vec<ColumnDescription>;

    fn fetch_row(&mut self) -> Result<Option<Vec<RawCell>>, DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;
}

/// Connection of an Oracle client library.
pub trait DriverConnection {
    type Cursor: DriverCursor;

    fn cursor(&mut self) -> Result<Self::Cursor, DriverError>;

    fn commit(&mut self) -> Result<(), DriverError>;

    fn rollback(&mut self) -> Result<(), DriverError>;

    fn autocommit(&self) -> bool;

    fn set_autocommit(&mut self, on: bool) -> Result<(), DriverError>;

    fn set_stmt_cache_size(&mut self, size: u32);

    /// Round trip to the server.
    fn ping(&mut self) -> Result<(), DriverError>;
}
