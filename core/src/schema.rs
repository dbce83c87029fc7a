//! Table and column declarations used to check filter keys.
//!
//! # Example
//! ```
//! use sqljson_core::schema::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::from_json(r#"{
//!     "tables": [{
//!         "name": "things",
//!         "columns": [
//!             { "name": "id", "type": "integer", "primary_key": true },
//!             { "name": "value", "type": "json", "nullable": true }
//!         ]
//!     }]
//! }"#).unwrap();
//!
//! assert!(schema.parse_lookup("things", "value__a__isnull", json!(true)).is_ok());
//! assert!(schema.parse_lookup("things", "vaule__a", json!(1)).is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::ast::{Lookup, LookupKind, Rhs};
use crate::error::{JsonError, JsonResult};
use crate::parser::parse_filter_key;

/// Known tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// Declared SQL type; `json` and `jsonb` mark JSON columns.
    #[serde(rename = "type", alias = "sql_type")]
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

impl ColumnDef {
    /// A nullable column.
    pub fn new(name: &str, sql_type: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            nullable: true,
            primary_key: false,
        }
    }

    /// Whether the column stores JSON documents.
    pub fn is_json(&self) -> bool {
        self.sql_type.eq_ignore_ascii_case("json") || self.sql_type.eq_ignore_ascii_case("jsonb")
    }
}

impl Schema {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Look up a column, suggesting the closest name when it is missing.
    pub fn resolve_column(&self, table: &str, column: &str) -> JsonResult<&ColumnDef> {
        let def = self.table(table).ok_or_else(|| JsonError::UnknownTable {
            name: table.to_string(),
            suggestion: closest(table, self.tables.iter().map(|t| t.name.as_str())),
        })?;
        def.column(column).ok_or_else(|| JsonError::UnknownField {
            name: column.to_string(),
            suggestion: closest(column, def.columns.iter().map(|c| c.name.as_str())),
        })
    }

    /// Parse a filter key against `table`, checking that the field exists and
    /// is a JSON column whenever keys or JSON lookups are used.
    pub fn parse_lookup(
        &self,
        table: &str,
        key: &str,
        rhs: impl Into<Rhs>,
    ) -> JsonResult<Lookup> {
        let filter = parse_filter_key(key)?;
        let column = self.resolve_column(table, &filter.field)?;
        let json_only = !filter.keys.is_empty()
            || !matches!(filter.lookup, LookupKind::Exact | LookupKind::IsNull);
        if json_only && !column.is_json() {
            return Err(JsonError::NotJson(column.name.clone()));
        }
        Ok(filter.into_lookup(rhs))
    }
}

impl TableDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Builder: append `column`.
    pub fn with(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Builder: append a nullable JSON column.
    pub fn with_json(self, name: &str) -> Self {
        self.with(ColumnDef::new(name, "json"))
    }

    /// Builder: append a non-null primary key.
    pub fn with_primary_key(self, name: &str, sql_type: &str) -> Self {
        self.with(ColumnDef {
            nullable: false,
            primary_key: true,
            ..ColumnDef::new(name, sql_type)
        })
    }
}

/// Closest candidate within edit distance 3.
fn closest<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
    candidates
        .map(|c| (c, strsim::levenshtein(name, c)))
        .filter(|(_, distance)| *distance <= 3)
        .min_by_key(|(_, distance)| *distance)
        .map(|(c, _)| c.to_string())
}
