//! The per-dialect emission strategy and shared escaping helpers.

use serde_json::Value as JsonValue;

use super::dialect::{Dialect, Features};
use super::Fragment;
use crate::ast::{LookupKind, PathSegment, Value};
use crate::error::{JsonError, JsonResult};

/// Escape text spliced into format-style SQL (`%` -> `%%`).
pub fn escape_format(text: &str) -> String {
    text.replace('%', "%%")
}

/// Quote text as a SQL string literal safe to splice into format-style SQL.
pub fn sql_literal(text: &str) -> String {
    format!("'{}'", escape_format(&text.replace('\'', "''")))
}

/// Escape LIKE wildcards with backslashes.
pub fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Substitute `{rhs}` then `{lhs}` in an operator template.
pub fn fill_template(template: &str, lhs: &str, rhs: &str) -> String {
    template.replace("{rhs}", rhs).replace("{lhs}", lhs)
}

/// SQL comparison operator for numeric lookups.
pub fn comparison_operator(kind: LookupKind) -> &'static str {
    match kind {
        LookupKind::Lt => "<",
        LookupKind::Lte => "<=",
        LookupKind::Gt => ">",
        LookupKind::Gte => ">=",
        _ => "=",
    }
}

/// Left-hand side of a key-level lookup, kept apart so dialects can reach
/// both the base column and the path.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyLhs {
    pub root: Fragment,
    pub path: Vec<PathSegment>,
}

impl KeyLhs {
    /// The whole document stored in `root`.
    pub fn document(root: Fragment) -> Self {
        Self {
            root,
            path: Vec::new(),
        }
    }

    pub fn is_document(&self) -> bool {
        self.path.is_empty()
    }
}

/// Dialect-specific SQL emission for JSON lookups.
///
/// Every method returns format-style SQL (`%s` placeholders, `%%` for a
/// literal percent sign) with parameters in placeholder order.
pub trait JsonGenerator {
    fn dialect(&self) -> Dialect;

    /// Quote an identifier (table or column name).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", escape_format(&name.replace('"', "\"\"")))
    }

    /// Driver placeholder for the 1-based parameter `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Extract the value at `path` from `root`. `as_text` requests the text
    /// form where the dialect distinguishes it.
    fn key_transform(&self, root: Fragment, path: &[PathSegment], as_text: bool) -> Fragment;

    /// Existence check for one object key of the value at `lhs`.
    fn has_key(&self, lhs: &KeyLhs, key: &str) -> Fragment;

    /// `has_key`, `has_keys` or `has_any_keys`. The default combines one
    /// single-key check per key.
    fn has_keys(&self, lhs: KeyLhs, keys: &[String], kind: LookupKind) -> JsonResult<Fragment> {
        let checks: Vec<Fragment> = keys.iter().map(|key| self.has_key(&lhs, key)).collect();
        match kind.key_combinator() {
            Some(op) => Ok(Fragment::join(checks, op).parenthesized()),
            None => checks
                .into_iter()
                .next()
                .ok_or_else(|| JsonError::invalid_rhs(kind, "no key given")),
        }
    }

    /// Structural containment: the value at `lhs` contains `rhs`.
    fn contains(&self, lhs: KeyLhs, rhs: &JsonValue) -> JsonResult<Fragment>;

    /// Inverse containment: `lhs` is contained by `rhs`.
    fn contained_by(&self, _lhs: Fragment, _rhs: &JsonValue) -> JsonResult<Fragment> {
        Err(JsonError::not_supported(LookupKind::ContainedBy, self.dialect()))
    }

    /// Column-level equality against a JSON value.
    fn exact(&self, lhs: Fragment, rhs: &JsonValue, features: &Features) -> JsonResult<Fragment>;

    /// Key-level equality against a JSON value (`null` is JSON null).
    fn key_exact(&self, key: KeyLhs, rhs: &JsonValue, features: &Features) -> JsonResult<Fragment>;

    /// Key absence (`isnull = true`) or presence (`isnull = false`).
    fn key_isnull(&self, key: KeyLhs, isnull: bool) -> Fragment {
        let extract = self.key_transform(key.root, &key.path, false);
        let op = if isnull { "IS NULL" } else { "IS NOT NULL" };
        Fragment::new(format!("{} {}", extract.sql, op), extract.params)
    }

    /// Operator template for a text lookup; `{lhs}` and `{rhs}` are filled
    /// in after the prepare steps.
    fn text_operator(&self, kind: LookupKind, features: &Features) -> &'static str;

    /// Rewrite the extracted text before the operator is applied.
    fn prepare_text_lhs(&self, lhs: String, _kind: LookupKind) -> String {
        lhs
    }

    /// Rewrite the bound text placeholder before the operator is applied.
    fn prepare_text_rhs(&self, _kind: LookupKind) -> String {
        "%s".to_string()
    }

    /// Whether `iexact` is a LIKE match, so its value needs wildcard escaping.
    fn iexact_uses_like(&self) -> bool {
        false
    }

    /// Rewrite the extracted value before a numeric comparison.
    fn numeric_lhs(&self, lhs: String) -> String {
        lhs
    }

    /// Parameter for the right-hand side of a numeric comparison.
    fn numeric_rhs(&self, rhs: &JsonValue) -> Value {
        Value::from_json_scalar(rhs)
    }

    /// SQL around the numeric rhs parameter.
    fn numeric_placeholder(&self, _rhs: &Value) -> &'static str {
        "%s"
    }
}
