use serde_json::Value as JsonValue;

use super::dialect::{Dialect, Features};
use super::traits::{JsonGenerator, KeyLhs};
use super::Fragment;
use crate::ast::{LookupKind, PathSegment, Value};
use crate::error::{JsonError, JsonResult};

/// PostgreSQL generator (jsonb operators).
pub struct PostgresGenerator;

impl PostgresGenerator {
    fn operator_sql(lhs: Fragment, op: &str, param: Value) -> Fragment {
        let mut params = lhs.params;
        params.push(param);
        Fragment::new(format!("{} {} %s", lhs.sql, op), params)
    }
}

impl JsonGenerator for PostgresGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn key_transform(&self, root: Fragment, path: &[PathSegment], as_text: bool) -> Fragment {
        let (op, param) = match path {
            [] => return root,
            [single] => {
                let param = match single {
                    PathSegment::Index(n) => Value::Int(*n as i64),
                    PathSegment::Key(k) => Value::String(k.clone()),
                };
                (if as_text { "->>" } else { "->" }, param)
            }
            _ => (
                if as_text { "#>>" } else { "#>" },
                Value::text_array(path.iter().map(PathSegment::as_text)),
            ),
        };
        let mut params = root.params;
        params.push(param);
        Fragment::new(format!("({} {} %s)", root.sql, op), params)
    }

    fn has_key(&self, lhs: &KeyLhs, key: &str) -> Fragment {
        let value = self.key_transform(lhs.root.clone(), &lhs.path, false);
        Self::operator_sql(value, "?", Value::String(key.to_string()))
    }

    fn has_keys(&self, lhs: KeyLhs, keys: &[String], kind: LookupKind) -> JsonResult<Fragment> {
        let op = match kind {
            LookupKind::HasKeys => "?&",
            LookupKind::HasAnyKeys => "?|",
            _ => {
                let key = keys
                    .first()
                    .ok_or_else(|| JsonError::invalid_rhs(kind, "no key given"))?;
                return Ok(self.has_key(&lhs, key));
            }
        };
        let value = self.key_transform(lhs.root, &lhs.path, false);
        Ok(Self::operator_sql(value, op, Value::text_array(keys.iter().cloned())))
    }

    fn contains(&self, lhs: KeyLhs, rhs: &JsonValue) -> JsonResult<Fragment> {
        let value = self.key_transform(lhs.root, &lhs.path, false);
        Ok(Self::operator_sql(value, "@>", Value::json(rhs)))
    }

    fn contained_by(&self, lhs: Fragment, rhs: &JsonValue) -> JsonResult<Fragment> {
        Ok(Self::operator_sql(lhs, "<@", Value::json(rhs)))
    }

    fn exact(&self, lhs: Fragment, rhs: &JsonValue, _features: &Features) -> JsonResult<Fragment> {
        Ok(Self::operator_sql(lhs, "=", Value::json(rhs)))
    }

    fn key_exact(&self, key: KeyLhs, rhs: &JsonValue, _features: &Features) -> JsonResult<Fragment> {
        let extract = self.key_transform(key.root, &key.path, false);
        Ok(Self::operator_sql(extract, "=", Value::json(rhs)))
    }

    fn text_operator(&self, kind: LookupKind, _features: &Features) -> &'static str {
        match kind {
            LookupKind::IExact => "UPPER({lhs}) = UPPER({rhs})",
            LookupKind::TextContains | LookupKind::StartsWith | LookupKind::EndsWith => {
                "{lhs} LIKE {rhs}"
            }
            LookupKind::IContains | LookupKind::IStartsWith | LookupKind::IEndsWith => {
                "UPPER({lhs}) LIKE UPPER({rhs})"
            }
            LookupKind::Regex => "{lhs} ~ {rhs}",
            LookupKind::IRegex => "{lhs} ~* {rhs}",
            _ => "{lhs} = {rhs}",
        }
    }

    // jsonb compares jsonb, so the bound value stays a JSON document
    fn numeric_rhs(&self, rhs: &JsonValue) -> Value {
        Value::json(rhs)
    }
}
