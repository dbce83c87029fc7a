use serde_json::Value as JsonValue;

use super::dialect::{Dialect, Features, LikeVariant};
use super::traits::{JsonGenerator, KeyLhs, escape_format, sql_literal};
use super::Fragment;
use crate::ast::path::nested_key_path;
use crate::ast::{LookupKind, PathSegment, Value, compile_json_path};
use crate::error::JsonResult;

/// Oracle generator (`JSON_QUERY` / `JSON_VALUE` / `JSON_EXISTS`).
///
/// Oracle does not accept bind variables as JSON paths, so paths are spliced
/// in as quoted literals.
pub struct OracleGenerator;

impl OracleGenerator {
    /// `COALESCE(JSON_QUERY(..), JSON_VALUE(..))` over a literal path.
    fn extract(lhs: &Fragment, path_literal: &str) -> Fragment {
        let mut params = lhs.params.clone();
        params.extend(lhs.params.iter().cloned());
        Fragment::new(
            format!(
                "COALESCE(JSON_QUERY({lhs}, {path}), JSON_VALUE({lhs}, {path}))",
                lhs = lhs.sql,
                path = path_literal
            ),
            params,
        )
    }

    /// Wrap `value` as `{"val": value}` so Oracle can extract it with the
    /// same function used on the column side.
    fn wrapped_value(value: &JsonValue) -> String {
        let function = if value.is_array() || value.is_object() {
            "JSON_QUERY"
        } else {
            "JSON_VALUE"
        };
        let document = format!("{{\"val\": {}}}", value);
        format!("{}({}, '$.val')", function, sql_literal(&document))
    }

    /// Compare the value at `path` inside `root` with `value`.
    fn member_check(root: &Fragment, path: &str, value: &JsonValue) -> Fragment {
        let path = sql_literal(path);
        match value {
            JsonValue::Null => {
                let extract = Self::extract(root, &path);
                let mut params = root.params.clone();
                params.extend(extract.params);
                Fragment::new(
                    format!(
                        "(JSON_EXISTS({}, {}) AND {} IS NULL)",
                        root.sql, path, extract.sql
                    ),
                    params,
                )
            }
            JsonValue::Array(_) | JsonValue::Object(_) => Fragment::new(
                format!(
                    "JSON_QUERY({}, {}) = {}",
                    root.sql,
                    path,
                    Self::wrapped_value(value)
                ),
                root.params.clone(),
            ),
            scalar => Fragment::new(
                format!(
                    "JSON_VALUE({}, {}) = {}",
                    root.sql,
                    path,
                    Self::wrapped_value(scalar)
                ),
                root.params.clone(),
            ),
        }
    }
}

impl JsonGenerator for OracleGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!(
            "\"{}\"",
            escape_format(&name.to_uppercase().replace('"', "\"\""))
        )
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":arg{}", index.saturating_sub(1))
    }

    fn key_transform(&self, root: Fragment, path: &[PathSegment], _as_text: bool) -> Fragment {
        if path.is_empty() {
            return root;
        }
        Self::extract(&root, &sql_literal(&compile_json_path(path)))
    }

    fn has_key(&self, lhs: &KeyLhs, key: &str) -> Fragment {
        Fragment::new(
            format!(
                "JSON_EXISTS({}, {})",
                lhs.root.sql,
                sql_literal(&nested_key_path(&lhs.path, key))
            ),
            lhs.root.params.clone(),
        )
    }

    fn contains(&self, lhs: KeyLhs, rhs: &JsonValue) -> JsonResult<Fragment> {
        if let JsonValue::Object(members) = rhs {
            if !members.is_empty() {
                let checks: Vec<Fragment> = members
                    .iter()
                    .map(|(key, value)| {
                        Self::member_check(&lhs.root, &nested_key_path(&lhs.path, key), value)
                    })
                    .collect();
                let many = checks.len() > 1;
                let joined = Fragment::join(checks, " AND ");
                return Ok(if many { joined.parenthesized() } else { joined });
            }
        }
        let value = self.key_transform(lhs.root, &lhs.path, false);
        match rhs {
            JsonValue::Object(_) => Ok(Fragment::new(
                format!("DBMS_LOB.SUBSTR({}) LIKE '{{%%}}'", value.sql),
                value.params,
            )),
            other => {
                let mut params = value.params;
                params.push(Value::json(other));
                Ok(Fragment::new(format!("DBMS_LOB.SUBSTR({}) = %s", value.sql), params))
            }
        }
    }

    fn exact(&self, lhs: Fragment, rhs: &JsonValue, _features: &Features) -> JsonResult<Fragment> {
        let mut params = lhs.params;
        params.push(Value::json(rhs));
        Ok(Fragment::new(format!("DBMS_LOB.SUBSTR({}) = %s", lhs.sql), params))
    }

    fn key_exact(&self, key: KeyLhs, rhs: &JsonValue, _features: &Features) -> JsonResult<Fragment> {
        let path = sql_literal(&compile_json_path(&key.path));
        let extract = Self::extract(&key.root, &path);
        if rhs.is_null() {
            let mut params = key.root.params;
            params.extend(extract.params);
            return Ok(Fragment::new(
                format!(
                    "(JSON_EXISTS({}, {}) AND {} IS NULL)",
                    key.root.sql, path, extract.sql
                ),
                params,
            ));
        }
        Ok(Fragment::new(
            format!("{} = {}", extract.sql, Self::wrapped_value(rhs)),
            extract.params,
        ))
    }

    fn key_isnull(&self, key: KeyLhs, isnull: bool) -> Fragment {
        let path = sql_literal(&compile_json_path(&key.path));
        if isnull {
            let mut params = key.root.params.clone();
            params.extend(key.root.params);
            Fragment::new(
                format!(
                    "(NOT JSON_EXISTS({root}, {path}) OR JSON_QUERY({root}, '$') IS NULL)",
                    root = key.root.sql,
                    path = path
                ),
                params,
            )
        } else {
            Fragment::new(
                format!("JSON_EXISTS({}, {})", key.root.sql, path),
                key.root.params,
            )
        }
    }

    fn text_operator(&self, kind: LookupKind, features: &Features) -> &'static str {
        let likec = features.like_variant == LikeVariant::Likec;
        match kind {
            LookupKind::IExact => "UPPER({lhs}) = UPPER({rhs})",
            LookupKind::TextContains | LookupKind::StartsWith | LookupKind::EndsWith => {
                if likec {
                    "{lhs} LIKEC {rhs} ESCAPE '\\'"
                } else {
                    "{lhs} LIKE TRANSLATE({rhs} USING NCHAR_CS) ESCAPE TRANSLATE('\\' USING NCHAR_CS)"
                }
            }
            LookupKind::IContains | LookupKind::IStartsWith | LookupKind::IEndsWith => {
                if likec {
                    "UPPER({lhs}) LIKEC UPPER({rhs}) ESCAPE '\\'"
                } else {
                    "UPPER({lhs}) LIKE UPPER(TRANSLATE({rhs} USING NCHAR_CS)) ESCAPE TRANSLATE('\\' USING NCHAR_CS)"
                }
            }
            LookupKind::Regex => "REGEXP_LIKE({lhs}, {rhs}, 'c')",
            LookupKind::IRegex => "REGEXP_LIKE({lhs}, {rhs}, 'i')",
            _ => "{lhs} = {rhs}",
        }
    }

    fn numeric_lhs(&self, lhs: String) -> String {
        format!("TO_NUMBER({})", lhs)
    }
}
