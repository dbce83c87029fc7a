use pretty_assertions::assert_eq;
use serde_json::json;

use crate::ast::*;
use crate::error::JsonError;
use crate::transpiler::{Connection, Dialect};

fn sqlite() -> Connection {
    Connection::new(Dialect::Sqlite)
}

fn value() -> Expr {
    Expr::col("value")
}

fn path(p: &str) -> Value {
    Value::String(p.to_string())
}

#[test]
fn test_has_key_uses_json_type() {
    let sql = Lookup::has_key(value(), "a").compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) IS NOT NULL"#);
    assert_eq!(sql.params, vec![path(r#"$."a""#)]);
}

#[test]
fn test_has_any_keys_joins_with_or() {
    let sql = Lookup::has_any_keys(value(), ["c", "h"]).compile(&sqlite()).unwrap();
    assert_eq!(
        sql.sql,
        r#"(JSON_TYPE("value", %s) IS NOT NULL OR JSON_TYPE("value", %s) IS NOT NULL)"#
    );
}

#[test]
fn test_contains_empty_object_matches_objects() {
    let sql = Lookup::contains(value(), json!({})).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", '$') = 'object'"#);
    assert!(sql.params.is_empty());
}

#[test]
fn test_has_key_on_nested_key_joins_paths() {
    let sql = Lookup::has_key(value().key("a"), "x").compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) IS NOT NULL"#);
    assert_eq!(sql.params, vec![path(r#"$."a"."x""#)]);
}

#[test]
fn test_contains_decomposes_per_key() {
    let sql = Lookup::contains(value(), json!({"a": "b", "c": 1}))
        .compile(&sqlite())
        .unwrap();
    assert_eq!(
        sql.sql,
        r#"(JSON_EXTRACT("value", %s) = %s AND (JSON_TYPE("value", %s) IN ('integer', 'real') AND JSON_EXTRACT("value", %s) = %s))"#
    );
    assert_eq!(
        sql.params,
        vec![
            path(r#"$."a""#),
            Value::String("b".into()),
            path(r#"$."c""#),
            path(r#"$."c""#),
            Value::Int(1),
        ]
    );
}

#[test]
fn test_contains_boolean_member_checks_type() {
    let sql = Lookup::contains(value(), json!({"h": true})).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) = 'true'"#);
    assert_eq!(sql.params, vec![path(r#"$."h""#)]);
}

#[test]
fn test_contains_on_nested_key_starts_at_column() {
    let sql = Lookup::contains(value().key("a"), json!({"x": "y"}))
        .compile(&sqlite())
        .unwrap();
    assert_eq!(sql.sql, r#"JSON_EXTRACT("value", %s) = %s"#);
    assert_eq!(
        sql.params,
        vec![path(r#"$."a"."x""#), Value::String("y".into())]
    );

    let sql = Lookup::contains(value().key("a"), json!({})).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) = 'object'"#);
    assert_eq!(sql.params, vec![path(r#"$."a""#)]);
}

#[test]
fn test_contains_null_and_composite_members() {
    let sql = Lookup::contains(value(), json!({"j": null})).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) = 'null'"#);

    let sql = Lookup::contains(value(), json!({"d": ["e"]})).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_EXTRACT("value", %s) = JSON(%s)"#);
    assert_eq!(sql.params[1], Value::Json(r#"["e"]"#.into()));
}

#[test]
fn test_contains_non_object_compares_documents() {
    let sql = Lookup::contains(value(), json!([1, 2])).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON("value") = JSON(%s)"#);
}

#[test]
fn test_contained_by_not_supported() {
    let err = Lookup::contained_by(value(), json!({}))
        .compile(&sqlite())
        .unwrap_err();
    assert!(matches!(err, JsonError::NotSupported { .. }));
}

#[test]
fn test_field_exact() {
    let sql = Lookup::exact(value(), json!(null)).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", '$') = %s"#);
    assert_eq!(sql.params, vec![Value::Json("null".into())]);

    let sql = Lookup::exact(value(), json!({})).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON("value") = JSON(%s)"#);
}

#[test]
fn test_key_exact_null_checks_type() {
    let sql = Lookup::exact(value().key("j"), json!(null)).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) = %s"#);
    assert_eq!(
        sql.params,
        vec![path(r#"$."j""#), Value::Json("null".into())]
    );
}

#[test]
fn test_key_exact_boolean_checks_type() {
    let sql = Lookup::exact(value().key("h"), json!(false)).compile(&sqlite()).unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) = 'false'"#);
    assert_eq!(sql.params, vec![path(r#"$."h""#)]);
}

#[test]
fn test_key_isnull() {
    let sql = Lookup::isnull(value().key("a").key(0u64), false)
        .compile(&sqlite())
        .unwrap();
    assert_eq!(sql.sql, r#"JSON_TYPE("value", %s) IS NOT NULL"#);
    assert_eq!(sql.params, vec![path(r#"$."a"[0]"#)]);
}

#[test]
fn test_like_lookups_declare_escape() {
    let sql = Lookup::new(value().key("a"), LookupKind::StartsWith, json!("b"))
        .compile(&sqlite())
        .unwrap();
    assert_eq!(sql.sql, r#"JSON_EXTRACT("value", %s) LIKE %s ESCAPE '\'"#);
    assert_eq!(sql.params[1], Value::String("b%".into()));
}

#[test]
fn test_iregex_prefixes_flag() {
    let sql = Lookup::new(value().key("a"), LookupKind::IRegex, json!("^b"))
        .compile(&sqlite())
        .unwrap();
    assert_eq!(sql.sql, r#"JSON_EXTRACT("value", %s) REGEXP '(?i)' || %s"#);
}

#[test]
fn test_numeric_comparison_beyond_i64_binds_json_number() {
    let sql = Lookup::new(value().key("c"), LookupKind::Lt, json!(u64::MAX))
        .compile(&sqlite())
        .unwrap();
    assert_eq!(sql.sql, r#"JSON_EXTRACT("value", %s) < JSON_EXTRACT(%s, '$')"#);
    assert_eq!(sql.params[1], Value::Json("18446744073709551615".into()));
}
