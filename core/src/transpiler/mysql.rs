use serde_json::Value as JsonValue;

use super::dialect::{Dialect, Features};
use super::traits::{JsonGenerator, KeyLhs, escape_format};
use super::Fragment;
use crate::ast::{LookupKind, PathSegment, Value, compile_json_path};
use crate::ast::path::nested_key_path;
use crate::error::JsonResult;

/// MySQL / MariaDB generator.
pub struct MysqlGenerator;

impl MysqlGenerator {
    /// Wrap the bound JSON text so both sides of `=` are JSON values.
    /// MariaDB stores JSON as text, so string values are unquoted.
    fn json_rhs(rhs: &JsonValue, features: &Features) -> &'static str {
        if features.mysql_is_mariadb && rhs.is_string() {
            "JSON_UNQUOTE(JSON_EXTRACT(%s, '$'))"
        } else {
            "JSON_EXTRACT(%s, '$')"
        }
    }

    fn equals_json(lhs: Fragment, rhs: &JsonValue, features: &Features) -> Fragment {
        let mut params = lhs.params;
        params.push(Value::json(rhs));
        Fragment::new(
            format!("{} = {}", lhs.sql, Self::json_rhs(rhs, features)),
            params,
        )
    }
}

impl JsonGenerator for MysqlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", escape_format(&name.replace('`', "``")))
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

    // one path from the column root, so a scalar at the lhs path is skipped
    fn has_key(&self, lhs: &KeyLhs, key: &str) -> Fragment {
        let mut params = lhs.root.params.clone();
        params.push(Value::String(nested_key_path(&lhs.path, key)));
        Fragment::new(
            format!("JSON_CONTAINS_PATH({}, 'one', %s)", lhs.root.sql),
            params,
        )
    }

    fn contains(&self, lhs: KeyLhs, rhs: &JsonValue) -> JsonResult<Fragment> {
        let value = self.key_transform(lhs.root, &lhs.path, false);
        let mut params = value.params;
        params.push(Value::json(rhs));
        Ok(Fragment::new(format!("JSON_CONTAINS({}, %s, '$')", value.sql), params))
    }

    fn contained_by(&self, lhs: Fragment, rhs: &JsonValue) -> JsonResult<Fragment> {
        let mut params = vec![Value::json(rhs)];
        params.extend(lhs.params);
        Ok(Fragment::new(format!("JSON_CONTAINS(%s, {}, '$')", lhs.sql), params))
    }

    fn exact(&self, lhs: Fragment, rhs: &JsonValue, features: &Features) -> JsonResult<Fragment> {
        Ok(Self::equals_json(lhs, rhs, features))
    }

    fn key_exact(&self, key: KeyLhs, rhs: &JsonValue, features: &Features) -> JsonResult<Fragment> {
        let extract = self.key_transform(key.root, &key.path, false);
        Ok(Self::equals_json(extract, rhs, features))
    }

    fn text_operator(&self, kind: LookupKind, _features: &Features) -> &'static str {
        match kind {
            LookupKind::IExact
            | LookupKind::IContains
            | LookupKind::IStartsWith
            | LookupKind::IEndsWith => "{lhs} LIKE {rhs}",
            LookupKind::TextContains | LookupKind::StartsWith | LookupKind::EndsWith => {
                "{lhs} LIKE BINARY {rhs}"
            }
            LookupKind::Regex => "{lhs} REGEXP BINARY {rhs}",
            LookupKind::IRegex => "{lhs} REGEXP {rhs}",
            _ => "{lhs} = {rhs}",
        }
    }

    // JSON_EXTRACT returns quoted JSON strings; the JSON column collation is
    // binary, so case-insensitive lookups lower both sides.
    fn prepare_text_lhs(&self, lhs: String, kind: LookupKind) -> String {
        let unquoted = format!("JSON_UNQUOTE({})", lhs);
        if kind.is_case_insensitive() {
            format!("LOWER({})", unquoted)
        } else {
            unquoted
        }
    }

    fn prepare_text_rhs(&self, kind: LookupKind) -> String {
        if kind.is_case_insensitive() {
            "LOWER(%s)".to_string()
        } else {
            "%s".to_string()
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
