use serde_json::Value as JsonValue;

use super::dialect::{Dialect, Features};
use super::traits::{JsonGenerator, KeyLhs};
use super::Fragment;
use crate::ast::path::nested_key_path;
use crate::ast::{LookupKind, PathSegment, Value, compile_json_path};
use crate::error::JsonResult;

/// SQLite generator (JSON1 functions).
pub struct SqliteGenerator;

impl SqliteGenerator {
    /// Check that the value at `path` inside `root` equals `value`.
    ///
    /// `JSON_EXTRACT` returns JSON booleans as the integers 0 and 1, so
    /// booleans and numbers are told apart with `JSON_TYPE`.
    fn value_check(root: &Fragment, path: String, value: &JsonValue) -> Fragment {
        let mut params = root.params.clone();
        params.push(Value::String(path.clone()));
        let sql = match value {
            JsonValue::Null => format!("JSON_TYPE({}, %s) = 'null'", root.sql),
            JsonValue::Bool(b) => format!("JSON_TYPE({}, %s) = '{}'", root.sql, b),
            JsonValue::Number(_) => {
                let number = Value::from_json_scalar(value);
                let placeholder = SqliteGenerator.numeric_placeholder(&number);
                params.extend(root.params.iter().cloned());
                params.push(Value::String(path));
                params.push(number);
                format!(
                    "(JSON_TYPE({root}, %s) IN ('integer', 'real') AND JSON_EXTRACT({root}, %s) = {placeholder})",
                    root = root.sql,
                    placeholder = placeholder
                )
            }
            JsonValue::String(_) => {
                params.push(Value::from_json_scalar(value));
                format!("JSON_EXTRACT({}, %s) = %s", root.sql)
            }
            JsonValue::Array(_) | JsonValue::Object(_) => {
                params.push(Value::json(value));
                format!("JSON_EXTRACT({}, %s) = JSON(%s)", root.sql)
            }
        };
        Fragment::new(sql, params)
    }
}

impl JsonGenerator for SqliteGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn key_transform(&self, root: Fragment, path: &[PathSegment], _as_text: bool) -> Fragment {
        if path.is_empty() {
            return root;
        }
        let mut params = root.params;
        params.push(Value::String(compile_json_path(path)));
        Fragment::new(format!("JSON_EXTRACT({}, %s)", root.sql), params)
    }

    fn has_key(&self, lhs: &KeyLhs, key: &str) -> Fragment {
        let mut params = lhs.root.params.clone();
        params.push(Value::String(nested_key_path(&lhs.path, key)));
        Fragment::new(format!("JSON_TYPE({}, %s) IS NOT NULL", lhs.root.sql), params)
    }

    // paths always start at the root column: JSON_TYPE over an extracted
    // string fails with "malformed JSON"
    fn contains(&self, lhs: KeyLhs, rhs: &JsonValue) -> JsonResult<Fragment> {
        match rhs {
            JsonValue::Object(members) if members.is_empty() => {
                if lhs.is_document() {
                    return Ok(Fragment::new(
                        format!("JSON_TYPE({}, '$') = 'object'", lhs.root.sql),
                        lhs.root.params,
                    ));
                }
                let mut params = lhs.root.params;
                params.push(Value::String(compile_json_path(&lhs.path)));
                Ok(Fragment::new(
                    format!("JSON_TYPE({}, %s) = 'object'", lhs.root.sql),
                    params,
                ))
            }
            JsonValue::Object(members) => {
                let checks: Vec<Fragment> = members
                    .iter()
                    .map(|(key, value)| {
                        Self::value_check(&lhs.root, nested_key_path(&lhs.path, key), value)
                    })
                    .collect();
                let many = checks.len() > 1;
                let joined = Fragment::join(checks, " AND ");
                Ok(if many { joined.parenthesized() } else { joined })
            }
            other if lhs.is_document() => {
                let mut params = lhs.root.params;
                params.push(Value::json(other));
                Ok(Fragment::new(format!("JSON({}) = JSON(%s)", lhs.root.sql), params))
            }
            other => Ok(Self::value_check(
                &lhs.root,
                compile_json_path(&lhs.path),
                other,
            )),
        }
    }

    fn exact(&self, lhs: Fragment, rhs: &JsonValue, _features: &Features) -> JsonResult<Fragment> {
        let mut params = lhs.params;
        params.push(Value::json(rhs));
        let sql = if rhs.is_null() {
            format!("JSON_TYPE({}, '$') = %s", lhs.sql)
        } else {
            format!("JSON({}) = JSON(%s)", lhs.sql)
        };
        Ok(Fragment::new(sql, params))
    }

    fn key_exact(&self, key: KeyLhs, rhs: &JsonValue, _features: &Features) -> JsonResult<Fragment> {
        if rhs.is_boolean() || rhs.is_number() {
            return Ok(Self::value_check(&key.root, compile_json_path(&key.path), rhs));
        }
        let mut params = key.root.params;
        params.push(Value::String(compile_json_path(&key.path)));
        params.push(Value::json(rhs));
        // JSON_EXTRACT yields SQL NULL for both JSON null and a missing key
        let sql = if rhs.is_null() {
            format!("JSON_TYPE({}, %s) = %s", key.root.sql)
        } else {
            format!("JSON_EXTRACT({}, %s) = JSON_EXTRACT(%s, '$')", key.root.sql)
        };
        Ok(Fragment::new(sql, params))
    }

    fn key_isnull(&self, key: KeyLhs, isnull: bool) -> Fragment {
        let mut params = key.root.params;
        params.push(Value::String(compile_json_path(&key.path)));
        let op = if isnull { "IS NULL" } else { "IS NOT NULL" };
        Fragment::new(format!("JSON_TYPE({}, %s) {}", key.root.sql, op), params)
    }

    fn text_operator(&self, kind: LookupKind, _features: &Features) -> &'static str {
        match kind {
            LookupKind::IExact
            | LookupKind::TextContains
            | LookupKind::IContains
            | LookupKind::StartsWith
            | LookupKind::IStartsWith
            | LookupKind::EndsWith
            | LookupKind::IEndsWith => "{lhs} LIKE {rhs} ESCAPE '\\'",
            LookupKind::Regex => "{lhs} REGEXP {rhs}",
            LookupKind::IRegex => "{lhs} REGEXP '(?i)' || {rhs}",
            _ => "{lhs} = {rhs}",
        }
    }

    fn iexact_uses_like(&self) -> bool {
        true
    }

    // integers beyond i64 arrive as JSON text
    fn numeric_placeholder(&self, rhs: &Value) -> &'static str {
        match rhs {
            Value::Json(_) => "JSON_EXTRACT(%s, '$')",
            _ => "%s",
        }
    }
}
