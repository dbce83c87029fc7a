//! Supported SQL dialects and per-connection capability flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::mysql::MysqlGenerator;
use super::oracle::OracleGenerator;
use super::postgres::PostgresGenerator;
use super::sqlite::SqliteGenerator;
use super::traits::JsonGenerator;
use crate::error::JsonError;

/// Target database engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "mariadb")]
    MySql,
    Oracle,
    Sqlite,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Oracle,
        Dialect::Sqlite,
    ];

    /// Emission strategy for this dialect.
    pub fn generator(&self) -> Box<dyn JsonGenerator> {
        match self {
            Dialect::Postgres => Box::new(PostgresGenerator),
            Dialect::MySql => Box::new(MysqlGenerator),
            Dialect::Oracle => Box::new(OracleGenerator),
            Dialect::Sqlite => Box::new(SqliteGenerator),
        }
    }

    /// Vendor name used in messages.
    pub fn vendor(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::Oracle => "oracle",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.vendor())
    }
}

impl FromStr for Dialect {
    type Err = JsonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "oracle" => Ok(Dialect::Oracle),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => {
                let names = ["postgresql", "mysql", "mariadb", "oracle", "sqlite"];
                let suggestion = names
                    .iter()
                    .map(|n| (*n, strsim::jaro_winkler(other, n)))
                    .filter(|(_, score)| *score > 0.8)
                    .max_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(n, _)| format!(", did you mean '{}'?", n))
                    .unwrap_or_default();
                Err(JsonError::Parse(format!(
                    "unknown dialect '{}'{}",
                    s, suggestion
                )))
            }
        }
    }
}

/// Which LIKE form an Oracle connection accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeVariant {
    /// `LIKE TRANSLATE(%s USING NCHAR_CS) ESCAPE TRANSLATE('\' USING NCHAR_CS)`
    #[default]
    Standard,
    /// `LIKEC %s ESCAPE '\'`
    Likec,
}

/// Capability flags, computed once when a connection opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub mysql_is_mariadb: bool,
    pub like_variant: LikeVariant,
    pub interprets_empty_strings_as_nulls: bool,
    pub supports_json_field: bool,
}

impl Features {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            mysql_is_mariadb: false,
            like_variant: LikeVariant::Standard,
            interprets_empty_strings_as_nulls: dialect == Dialect::Oracle,
            supports_json_field: true,
        }
    }
}

/// Compilation target: a dialect plus the capabilities of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub dialect: Dialect,
    pub features: Features,
}

impl Connection {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            features: Features::for_dialect(dialect),
        }
    }

    /// A MySQL connection talking to MariaDB.
    pub fn mariadb() -> Self {
        let mut conn = Self::new(Dialect::MySql);
        conn.features.mysql_is_mariadb = true;
        conn
    }

    pub fn with_features(dialect: Dialect, features: Features) -> Self {
        Self { dialect, features }
    }

    pub fn with_like_variant(mut self, variant: LikeVariant) -> Self {
        self.features.like_variant = variant;
        self
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}
