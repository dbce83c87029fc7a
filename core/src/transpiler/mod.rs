//! SQL transpiler for JSON key transforms and lookups.
//!
//! Converts `Expr`, `Lookup` and `Query` nodes into dialect-specific SQL.

pub mod dialect;
pub mod lookups;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod query;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
mod tests;

use crate::ast::{Expr, Lookup, Value};
use crate::error::JsonResult;

pub use dialect::{Connection, Dialect, Features, LikeVariant};
pub use query::Query;
pub use traits::{JsonGenerator, KeyLhs, escape_format, escape_like, sql_literal};

/// A compiled SQL fragment with its parameters in placeholder order.
///
/// `sql` uses format-style `%s` placeholders; a literal percent sign is
/// written `%%`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Compiled output of a lookup or query.
pub type CompiledSql = Fragment;

impl Fragment {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A fragment with no parameters.
    pub fn sql_only(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Concatenate fragments with `sep`, keeping parameter order.
    pub fn join(parts: Vec<Fragment>, sep: &str) -> Self {
        let mut sql = Vec::with_capacity(parts.len());
        let mut params = Vec::new();
        for part in parts {
            sql.push(part.sql);
            params.extend(part.params);
        }
        Self {
            sql: sql.join(sep),
            params,
        }
    }

    pub fn parenthesized(self) -> Self {
        Self {
            sql: format!("({})", self.sql),
            params: self.params,
        }
    }

    /// Replace format-style placeholders with the dialect's driver
    /// placeholders (`$1`, `?`, `:arg0`) and unescape `%%`.
    pub fn render(&self, dialect: Dialect) -> String {
        let generator = dialect.generator();
        render_placeholders(&self.sql, |index| generator.placeholder(index))
    }
}

/// Rewrite `%s` with `placeholder(n)` (1-based) and `%%` with `%`.
pub fn render_placeholders(sql: &str, mut placeholder: impl FnMut(usize) -> String) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut index = 0;
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some('s') => {
                chars.next();
                index += 1;
                out.push_str(&placeholder(index));
            }
            _ => out.push('%'),
        }
    }
    out
}

/// Conversion of AST nodes into SQL fragments.
pub trait ToSql {
    /// Compile against a connection's dialect and capabilities.
    fn to_sql_with(&self, conn: &Connection) -> JsonResult<Fragment>;

    /// Compile for a dialect with default capabilities.
    fn to_sql(&self, dialect: Dialect) -> JsonResult<Fragment> {
        self.to_sql_with(&Connection::new(dialect))
    }
}

impl ToSql for Expr {
    fn to_sql_with(&self, conn: &Connection) -> JsonResult<Fragment> {
        let generator = conn.dialect.generator();
        Ok(compile_expr(self, generator.as_ref()))
    }
}

impl ToSql for Lookup {
    fn to_sql_with(&self, conn: &Connection) -> JsonResult<Fragment> {
        lookups::compile_lookup(self, conn)
    }
}

impl Expr {
    /// Compile this expression for `conn`.
    pub fn compile(&self, conn: &Connection) -> JsonResult<Fragment> {
        self.to_sql_with(conn)
    }
}

impl Lookup {
    /// Compile this lookup for `conn`.
    pub fn compile(&self, conn: &Connection) -> JsonResult<Fragment> {
        self.to_sql_with(conn)
    }
}

/// Compile an expression with an already-selected generator.
pub(crate) fn compile_expr(expr: &Expr, generator: &dyn JsonGenerator) -> Fragment {
    match expr.key_chain() {
        Some(chain) => {
            let root = compile_expr(chain.root, generator);
            generator.key_transform(root, &chain.path, chain.as_text)
        }
        None => match expr {
            Expr::Column { table: Some(table), name } => Fragment::sql_only(format!(
                "{}.{}",
                generator.quote_identifier(table),
                generator.quote_identifier(name)
            )),
            Expr::Column { table: None, name } => {
                Fragment::sql_only(generator.quote_identifier(name))
            }
            // key_chain() is Some for every transform
            Expr::KeyTransform { lhs, .. } | Expr::KeyText { lhs, .. } => {
                compile_expr(lhs, generator)
            }
        },
    }
}
