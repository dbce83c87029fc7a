//! # sqljson
//!
//! Portable JSON column lookups for PostgreSQL, MySQL/MariaDB, Oracle and
//! SQLite.
//!
//! Lookups are compiled by [`sqljson_core`]; Oracle sessions run them through
//! the placeholder cursor in [`oracle`]. This crate adds the configuration
//! file and the `sqljson` command.

pub mod config;

pub use sqljson_core::{
    JsonError, ast, error, field, parse_filter_key, parse_lookup, parser, prelude, schema,
    transpiler,
};
pub use sqljson_oracle as oracle;

pub use config::{Config, ConfigError, ConfigSource};
