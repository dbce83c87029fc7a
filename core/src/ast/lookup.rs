use serde::{Deserialize, Serialize};

use crate::ast::{Expr, LookupKind};

/// Right-hand side of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rhs {
    /// A literal JSON value. `null` means the JSON null literal.
    Value(serde_json::Value),
    /// Another expression (e.g. a key of a second column).
    Expr(Expr),
}

impl Rhs {
    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Rhs::Value(v) => Some(v),
            Rhs::Expr(_) => None,
        }
    }
}

impl From<serde_json::Value> for Rhs {
    fn from(v: serde_json::Value) -> Self {
        Rhs::Value(v)
    }
}

impl From<Expr> for Rhs {
    fn from(e: Expr) -> Self {
        Rhs::Expr(e)
    }
}

/// A lookup node: `lhs <kind> rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    pub lhs: Expr,
    pub kind: LookupKind,
    pub rhs: Rhs,
}

impl Lookup {
    pub fn new(lhs: Expr, kind: LookupKind, rhs: impl Into<Rhs>) -> Self {
        Self {
            lhs,
            kind,
            rhs: rhs.into(),
        }
    }

    pub fn exact(lhs: Expr, rhs: impl Into<Rhs>) -> Self {
        Self::new(lhs, LookupKind::Exact, rhs)
    }

    pub fn isnull(lhs: Expr, isnull: bool) -> Self {
        Self::new(lhs, LookupKind::IsNull, serde_json::Value::Bool(isnull))
    }

    pub fn has_key(lhs: Expr, key: &str) -> Self {
        Self::new(lhs, LookupKind::HasKey, serde_json::Value::from(key))
    }

    pub fn has_keys<S: AsRef<str>>(lhs: Expr, keys: impl IntoIterator<Item = S>) -> Self {
        Self::new(lhs, LookupKind::HasKeys, key_array(keys))
    }

    pub fn has_any_keys<S: AsRef<str>>(lhs: Expr, keys: impl IntoIterator<Item = S>) -> Self {
        Self::new(lhs, LookupKind::HasAnyKeys, key_array(keys))
    }

    pub fn contains(lhs: Expr, rhs: serde_json::Value) -> Self {
        Self::new(lhs, LookupKind::Contains, rhs)
    }

    pub fn contained_by(lhs: Expr, rhs: serde_json::Value) -> Self {
        Self::new(lhs, LookupKind::ContainedBy, rhs)
    }
}

fn key_array<S: AsRef<str>>(keys: impl IntoIterator<Item = S>) -> serde_json::Value {
    serde_json::Value::Array(
        keys.into_iter()
            .map(|k| serde_json::Value::from(k.as_ref()))
            .collect(),
    )
}
