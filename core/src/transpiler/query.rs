//! SELECT builder over JSON lookups.

use super::{Connection, Fragment, ToSql, compile_expr};
use crate::ast::{Expr, Lookup, SortOrder};
use crate::error::JsonResult;
use crate::parser::parse_lookup;

/// A filter entry; `negated` filters come from `exclude`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub lookup: Lookup,
    pub negated: bool,
}

/// A single-table SELECT with JSON lookups in the WHERE clause.
///
/// ```
/// use sqljson_core::prelude::*;
/// use serde_json::json;
///
/// let query = Query::table("things")
///     .filter_key("value__owner__name", json!("alice"))
///     .unwrap()
///     .order_by(Expr::col("value").key("rank"), SortOrder::Desc);
/// let sql = query.to_sql(&Connection::new(Dialect::Postgres)).unwrap();
/// assert_eq!(
///     sql.render(Dialect::Postgres),
///     "SELECT * FROM \"things\" WHERE (\"value\" #> $1) = $2 ORDER BY (\"value\" -> $3) DESC"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub table: String,
    pub columns: Vec<Expr>,
    pub filters: Vec<Filter>,
    pub order_by: Vec<(Expr, SortOrder)>,
}

impl Query {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            ..Default::default()
        }
    }

    /// Select these expressions instead of `*`.
    pub fn values(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.columns.extend(exprs);
        self
    }

    pub fn filter(mut self, lookup: Lookup) -> Self {
        self.filters.push(Filter {
            lookup,
            negated: false,
        });
        self
    }

    pub fn exclude(mut self, lookup: Lookup) -> Self {
        self.filters.push(Filter {
            lookup,
            negated: true,
        });
        self
    }

    /// Add a filter written as a filter key, e.g. `value__a__0__icontains`.
    pub fn filter_key(self, key: &str, rhs: serde_json::Value) -> JsonResult<Self> {
        Ok(self.filter(parse_lookup(key, rhs)?))
    }

    /// Add an exclusion written as a filter key.
    pub fn exclude_key(self, key: &str, rhs: serde_json::Value) -> JsonResult<Self> {
        Ok(self.exclude(parse_lookup(key, rhs)?))
    }

    pub fn order_by(mut self, expr: Expr, order: SortOrder) -> Self {
        self.order_by.push((expr, order));
        self
    }

    /// Compile to a full SELECT statement.
    pub fn to_sql(&self, conn: &Connection) -> JsonResult<Fragment> {
        let generator = conn.dialect.generator();
        let generator = generator.as_ref();

        let select = if self.columns.is_empty() {
            Fragment::sql_only("*")
        } else {
            Fragment::join(
                self.columns.iter().map(|c| compile_expr(c, generator)).collect(),
                ", ",
            )
        };
        let mut parts = vec![
            Fragment::sql_only("SELECT"),
            select,
            Fragment::sql_only(format!("FROM {}", generator.quote_identifier(&self.table))),
        ];

        if !self.filters.is_empty() {
            let wrap = self.filters.len() > 1;
            let mut conditions = Vec::with_capacity(self.filters.len());
            for filter in &self.filters {
                let compiled = filter.lookup.to_sql_with(conn)?;
                conditions.push(if filter.negated {
                    Fragment::new(format!("NOT ({})", compiled.sql), compiled.params)
                } else if wrap {
                    compiled.parenthesized()
                } else {
                    compiled
                });
            }
            parts.push(Fragment::sql_only("WHERE"));
            parts.push(Fragment::join(conditions, " AND "));
        }

        if !self.order_by.is_empty() {
            let terms = self
                .order_by
                .iter()
                .map(|(expr, order)| {
                    let term = compile_expr(expr, generator);
                    Fragment::new(format!("{} {}", term.sql, order), term.params)
                })
                .collect();
            parts.push(Fragment::sql_only("ORDER BY"));
            parts.push(Fragment::join(terms, ", "));
        }

        let fragment = Fragment::join(parts, " ");
        tracing::debug!(table = %self.table, dialect = %conn.dialect, sql = %fragment.sql, "compiled query");
        Ok(fragment)
    }
}
