use serde::{Deserialize, Serialize};

use crate::ast::PathSegment;

/// Left-hand (or right-hand) expression of a lookup.
///
/// Key transforms form a singly-linked chain back to a column:
/// `value -> 'd' -> 1 -> 'f'` is
/// `KeyTransform(KeyTransform(KeyTransform(Column(value), d), 1), f)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A (possibly table-qualified) column.
    Column { table: Option<String>, name: String },
    /// Extract the JSON value at `key` from `lhs`.
    KeyTransform { lhs: Box<Expr>, key: PathSegment },
    /// Extract the value at `key` as text.
    KeyText { lhs: Box<Expr>, key: PathSegment },
}

/// A key chain split into its base expression and the full path.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyChain<'a> {
    pub root: &'a Expr,
    pub path: Vec<PathSegment>,
    pub as_text: bool,
}

impl Expr {
    /// Unqualified column reference.
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Table-qualified column reference.
    pub fn table_col(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Chain a key transform.
    pub fn key(self, key: impl Into<PathSegment>) -> Self {
        Expr::KeyTransform {
            lhs: Box::new(self),
            key: key.into(),
        }
    }

    /// Chain a text-extracting key transform.
    pub fn key_text(self, key: impl Into<PathSegment>) -> Self {
        Expr::KeyText {
            lhs: Box::new(self),
            key: key.into(),
        }
    }

    /// Turn the outermost key transform into its text variant.
    pub fn into_text(self) -> Self {
        match self {
            Expr::KeyTransform { lhs, key } => Expr::KeyText { lhs, key },
            other => other,
        }
    }

    pub fn is_key_transform(&self) -> bool {
        matches!(self, Expr::KeyTransform { .. } | Expr::KeyText { .. })
    }

    /// Walk to the base of a key chain, collecting the path root-first.
    /// Returns `None` for a plain column.
    pub fn key_chain(&self) -> Option<KeyChain<'_>> {
        let as_text = matches!(self, Expr::KeyText { .. });
        let mut path = Vec::new();
        let mut current = self;
        loop {
            match current {
                Expr::KeyTransform { lhs, key } | Expr::KeyText { lhs, key } => {
                    path.push(key.clone());
                    current = lhs;
                }
                Expr::Column { .. } => break,
            }
        }
        if path.is_empty() {
            return None;
        }
        path.reverse();
        Some(KeyChain {
            root: current,
            path,
            as_text,
        })
    }

    /// Name of the underlying column.
    pub fn column_name(&self) -> &str {
        match self {
            Expr::Column { name, .. } => name,
            Expr::KeyTransform { lhs, .. } | Expr::KeyText { lhs, .. } => lhs.column_name(),
        }
    }
}
