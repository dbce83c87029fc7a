//! Filter-key parser.
//!
//! A filter key names a JSON column, an optional chain of keys and an
//! optional lookup, joined by `__`:
//!
//! ```text
//! value                     -> value exact
//! value__has_key            -> value has_key
//! value__owner__name        -> value -> owner -> name exact
//! value__tags__0__icontains -> value -> tags -> 0 icontains
//! ```
//!
//! Digit-only segments are array indices. On the column itself only the JSON
//! lookups are recognized; any other trailing name is a key.

pub mod grammar;

#[cfg(test)]
mod tests;

use crate::ast::{Expr, Lookup, LookupKind, PathSegment, Rhs};
use crate::error::{JsonError, JsonResult};

/// A parsed filter key.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKey {
    pub field: String,
    pub keys: Vec<PathSegment>,
    pub lookup: LookupKind,
}

impl FilterKey {
    /// The left-hand expression: the column with its key transforms applied.
    pub fn expr(&self) -> Expr {
        self.keys
            .iter()
            .cloned()
            .fold(Expr::col(self.field.clone()), |expr, key| expr.key(key))
    }

    pub fn into_lookup(self, rhs: impl Into<Rhs>) -> Lookup {
        Lookup::new(self.expr(), self.lookup, rhs)
    }
}

/// Parse `field[__key...][__lookup]`.
pub fn parse_filter_key(key: &str) -> JsonResult<FilterKey> {
    let (_, segments) = grammar::parse_segments(key)
        .map_err(|_| JsonError::Parse(format!("invalid filter key '{}': empty segment", key)))?;

    let Some((field, rest)) = segments.split_first() else {
        return Err(JsonError::Parse("empty filter key".to_string()));
    };
    if !grammar::is_identifier(field) {
        return Err(JsonError::Parse(format!(
            "invalid field name '{}' in filter key '{}'",
            field, key
        )));
    }

    let (keys, lookup) = match rest.split_last() {
        Some((last, keys)) => match resolve_lookup(last, !keys.is_empty()) {
            Some(kind) => (keys, kind),
            None => (rest, LookupKind::Exact),
        },
        None => (rest, LookupKind::Exact),
    };

    Ok(FilterKey {
        field: field.to_string(),
        keys: keys.iter().map(|s| PathSegment::parse(s)).collect(),
        lookup,
    })
}

/// Parse a filter key and attach its right-hand side.
pub fn parse_lookup(key: &str, rhs: impl Into<Rhs>) -> JsonResult<Lookup> {
    Ok(parse_filter_key(key)?.into_lookup(rhs))
}

fn resolve_lookup(name: &str, on_key: bool) -> Option<LookupKind> {
    LookupKind::from_name(name, on_key).filter(|kind| on_key || !kind.requires_key())
}
