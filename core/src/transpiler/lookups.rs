//! Lookup compilation pipeline.
//!
//! Every lookup runs through the same steps: compile the left-hand side,
//! rewrite it for the dialect, prepare the right-hand side, then apply the
//! dialect's template.

use serde_json::Value as JsonValue;

use super::traits::{JsonGenerator, KeyLhs, comparison_operator, escape_like, fill_template};
use super::{Connection, Fragment, compile_expr};
use crate::ast::{Expr, Lookup, LookupKind, Rhs, Value};
use crate::error::{JsonError, JsonResult};

/// Compile a lookup for the connection's dialect.
pub fn compile_lookup(lookup: &Lookup, conn: &Connection) -> JsonResult<Fragment> {
    let generator = conn.dialect.generator();
    let generator = generator.as_ref();
    let kind = lookup.kind;
    let on_key = lookup.lhs.is_key_transform();

    if kind.requires_key() && !on_key {
        return Err(JsonError::InvalidLookup {
            lookup: kind.name().to_string(),
            target: format!("column '{}' (use a key transform)", lookup.lhs.column_name()),
        });
    }

    let fragment = match kind {
        LookupKind::HasKey | LookupKind::HasKeys | LookupKind::HasAnyKeys => {
            let keys = key_list(kind, rhs_value(lookup)?)?;
            if kind == LookupKind::HasKey && keys.len() > 1 {
                return Err(JsonError::invalid_rhs(
                    kind,
                    "expected a single key (use has_keys or has_any_keys for a list)",
                ));
            }
            generator.has_keys(target(&lookup.lhs, generator), &keys, kind)?
        }
        LookupKind::Contains => {
            generator.contains(target(&lookup.lhs, generator), rhs_value(lookup)?)?
        }
        LookupKind::ContainedBy => {
            let lhs = compile_expr(&lookup.lhs, generator);
            generator.contained_by(lhs, rhs_value(lookup)?)?
        }
        LookupKind::Exact => compile_exact(lookup, conn, generator)?,
        LookupKind::IsNull => compile_isnull(lookup, generator)?,
        kind if kind.is_text() => compile_text(lookup, conn, generator)?,
        _ => compile_numeric(lookup, generator)?,
    };

    tracing::trace!(
        dialect = %conn.dialect,
        lookup = %kind,
        sql = %fragment.sql,
        params = fragment.params.len(),
        "compiled lookup"
    );
    Ok(fragment)
}

fn rhs_value(lookup: &Lookup) -> JsonResult<&JsonValue> {
    lookup
        .rhs
        .as_value()
        .ok_or_else(|| JsonError::invalid_rhs(lookup.kind, "expected a JSON value, not an expression"))
}

/// Split a key-transform lhs into its compiled base and path.
fn key_lhs(expr: &Expr, generator: &dyn JsonGenerator) -> Option<KeyLhs> {
    expr.key_chain().map(|chain| KeyLhs {
        root: compile_expr(chain.root, generator),
        path: chain.path,
    })
}

/// The lhs as a root plus path; a plain column is the whole document.
fn target(expr: &Expr, generator: &dyn JsonGenerator) -> KeyLhs {
    key_lhs(expr, generator).unwrap_or_else(|| KeyLhs::document(compile_expr(expr, generator)))
}

/// Normalize the rhs of a key-existence lookup into a list of key names.
fn key_list(kind: LookupKind, rhs: &JsonValue) -> JsonResult<Vec<String>> {
    let items: Vec<&JsonValue> = match rhs {
        JsonValue::Array(items) => items.iter().collect(),
        scalar => vec![scalar],
    };
    if items.is_empty() {
        return Err(JsonError::invalid_rhs(kind, "at least one key is required"));
    }
    items
        .into_iter()
        .map(|item| match item {
            JsonValue::String(s) => Ok(s.clone()),
            JsonValue::Number(n) => Ok(n.to_string()),
            JsonValue::Bool(b) => Ok(b.to_string()),
            JsonValue::Null => Err(JsonError::invalid_rhs(kind, "null is not a key")),
            other => Err(JsonError::invalid_rhs(kind, format!("{} is not a key", other))),
        })
        .collect()
}

fn compile_exact(
    lookup: &Lookup,
    conn: &Connection,
    generator: &dyn JsonGenerator,
) -> JsonResult<Fragment> {
    match &lookup.rhs {
        Rhs::Expr(rhs) => {
            let lhs = compile_expr(&lookup.lhs, generator);
            let rhs = compile_expr(rhs, generator);
            Ok(Fragment::join(vec![lhs, rhs], " = "))
        }
        Rhs::Value(value) => match key_lhs(&lookup.lhs, generator) {
            Some(key) => generator.key_exact(key, value, &conn.features),
            None => {
                let lhs = compile_expr(&lookup.lhs, generator);
                generator.exact(lhs, value, &conn.features)
            }
        },
    }
}

fn compile_isnull(lookup: &Lookup, generator: &dyn JsonGenerator) -> JsonResult<Fragment> {
    let isnull = match rhs_value(lookup)? {
        JsonValue::Bool(b) => *b,
        other => {
            return Err(JsonError::invalid_rhs(
                LookupKind::IsNull,
                format!("expected a boolean, got {}", other),
            ));
        }
    };
    match key_lhs(&lookup.lhs, generator) {
        Some(key) => Ok(generator.key_isnull(key, isnull)),
        None => {
            let lhs = compile_expr(&lookup.lhs, generator);
            let op = if isnull { "IS NULL" } else { "IS NOT NULL" };
            Ok(Fragment::new(format!("{} {}", lhs.sql, op), lhs.params))
        }
    }
}

fn compile_text(
    lookup: &Lookup,
    conn: &Connection,
    generator: &dyn JsonGenerator,
) -> JsonResult<Fragment> {
    let kind = lookup.kind;
    let text = match rhs_value(lookup)? {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => {
            return Err(JsonError::invalid_rhs(kind, "null cannot be used as a query value"));
        }
        other => other.to_string(),
    };
    let param = prepare_text_param(kind, &text, generator.iexact_uses_like());

    let lhs = compile_expr(&lookup.lhs.clone().into_text(), generator);
    let lhs_sql = generator.prepare_text_lhs(lhs.sql, kind);
    let rhs_sql = generator.prepare_text_rhs(kind);
    let sql = fill_template(generator.text_operator(kind, &conn.features), &lhs_sql, &rhs_sql);

    let mut params = lhs.params;
    params.push(Value::String(param));
    Ok(Fragment::new(sql, params))
}

/// Add wildcards and escape LIKE metacharacters for pattern lookups.
pub fn prepare_text_param(kind: LookupKind, text: &str, iexact_uses_like: bool) -> String {
    match kind {
        LookupKind::TextContains | LookupKind::IContains => format!("%{}%", escape_like(text)),
        LookupKind::StartsWith | LookupKind::IStartsWith => format!("{}%", escape_like(text)),
        LookupKind::EndsWith | LookupKind::IEndsWith => format!("%{}", escape_like(text)),
        LookupKind::IExact if iexact_uses_like => escape_like(text),
        _ => text.to_string(),
    }
}

fn compile_numeric(lookup: &Lookup, generator: &dyn JsonGenerator) -> JsonResult<Fragment> {
    let lhs = compile_expr(&lookup.lhs, generator);
    let lhs_sql = generator.numeric_lhs(lhs.sql);
    let mut params = lhs.params;
    let rhs_sql = match &lookup.rhs {
        Rhs::Value(JsonValue::Null) => {
            return Err(JsonError::invalid_rhs(lookup.kind, "null cannot be compared"));
        }
        Rhs::Value(value) => {
            let param = generator.numeric_rhs(value);
            let placeholder = generator.numeric_placeholder(&param);
            params.push(param);
            placeholder.to_string()
        }
        Rhs::Expr(expr) => {
            let rhs = compile_expr(expr, generator);
            params.extend(rhs.params);
            rhs.sql
        }
    };
    Ok(Fragment::new(
        format!("{} {} {}", lhs_sql, comparison_operator(lookup.kind), rhs_sql),
        params,
    ))
}
