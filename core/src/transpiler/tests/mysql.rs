use pretty_assertions::assert_eq;
use serde_json::json;

use crate::ast::*;
use crate::transpiler::{Connection, Dialect};

fn mysql() -> Connection {
    Connection::new(Dialect::MySql)
}

fn value() -> Expr {
    Expr::col("value")
}

fn path(p: &str) -> Value {
    Value::String(p.to_string())
}

#[test]
fn test_nested_path() {
    let sql = value()
        .key("d")
        .key(1u64)
        .key("f")
        .compile(&mysql())
        .unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`value`, %s)");
    assert_eq!(sql.params, vec![path(r#"$."d"[1]."f""#)]);
    assert_eq!(sql.render(Dialect::MySql), "JSON_EXTRACT(`value`, ?)");
}

#[test]
fn test_has_key() {
    let sql = Lookup::has_key(value(), "a").compile(&mysql()).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS_PATH(`value`, 'one', %s)");
    assert_eq!(sql.params, vec![path(r#"$."a""#)]);
}

#[test]
fn test_has_keys_repeats_lhs() {
    let sql = Lookup::has_keys(value(), ["a", "c"]).compile(&mysql()).unwrap();
    assert_eq!(
        sql.sql,
        "(JSON_CONTAINS_PATH(`value`, 'one', %s) AND JSON_CONTAINS_PATH(`value`, 'one', %s))"
    );
    assert_eq!(sql.params, vec![path(r#"$."a""#), path(r#"$."c""#)]);
}

#[test]
fn test_has_key_on_nested_key_joins_paths() {
    let sql = Lookup::has_key(value().key("a").key(0u64), "b")
        .compile(&mysql())
        .unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS_PATH(`value`, 'one', %s)");
    assert_eq!(sql.params, vec![path(r#"$."a"[0]."b""#)]);
}

#[test]
fn test_numeric_key_name_is_not_an_index() {
    let sql = Lookup::has_key(value(), "0").compile(&mysql()).unwrap();
    assert_eq!(sql.params, vec![path(r#"$."0""#)]);
}

#[test]
fn test_containment() {
    let sql = Lookup::contains(value(), json!({"a": "b"})).compile(&mysql()).unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS(`value`, %s, '$')");

    let sql = Lookup::contained_by(value().key("a"), json!(["x"]))
        .compile(&mysql())
        .unwrap();
    assert_eq!(sql.sql, "JSON_CONTAINS(%s, JSON_EXTRACT(`value`, %s), '$')");
    assert_eq!(
        sql.params,
        vec![Value::Json(r#"["x"]"#.into()), path(r#"$."a""#)]
    );
}

#[test]
fn test_key_exact_wraps_rhs() {
    let sql = Lookup::exact(value().key("a"), json!("b")).compile(&mysql()).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`value`, %s) = JSON_EXTRACT(%s, '$')");
    assert_eq!(
        sql.params,
        vec![path(r#"$."a""#), Value::Json(r#""b""#.into())]
    );
}

#[test]
fn test_mariadb_unquotes_string_rhs() {
    let conn = Connection::mariadb();
    let sql = Lookup::exact(value().key("a"), json!("b")).compile(&conn).unwrap();
    assert_eq!(
        sql.sql,
        "JSON_EXTRACT(`value`, %s) = JSON_UNQUOTE(JSON_EXTRACT(%s, '$'))"
    );

    let sql = Lookup::exact(value().key("c"), json!(1)).compile(&conn).unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`value`, %s) = JSON_EXTRACT(%s, '$')");
}

#[test]
fn test_text_lookups_unquote() {
    let sql = Lookup::new(value().key("a"), LookupKind::TextContains, json!("b"))
        .compile(&mysql())
        .unwrap();
    assert_eq!(sql.sql, "JSON_UNQUOTE(JSON_EXTRACT(`value`, %s)) LIKE BINARY %s");
    assert_eq!(sql.params[1], Value::String("%b%".into()));
}

#[test]
fn test_case_insensitive_lookups_lower_both_sides() {
    let sql = Lookup::new(value().key("a"), LookupKind::IContains, json!("B"))
        .compile(&mysql())
        .unwrap();
    assert_eq!(
        sql.sql,
        "LOWER(JSON_UNQUOTE(JSON_EXTRACT(`value`, %s))) LIKE LOWER(%s)"
    );
}

#[test]
fn test_iexact_escapes_wildcards() {
    let sql = Lookup::new(value().key("a"), LookupKind::IExact, json!("a_b"))
        .compile(&mysql())
        .unwrap();
    assert_eq!(sql.params[1], Value::String(r"a\_b".into()));
}

#[test]
fn test_numeric_comparison_binds_native_value() {
    let sql = Lookup::new(value().key("c"), LookupKind::Gte, json!(2))
        .compile(&mysql())
        .unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`value`, %s) >= %s");
    assert_eq!(sql.params, vec![path(r#"$."c""#), Value::Int(2)]);
}

#[test]
fn test_numeric_comparison_beyond_i64_binds_json_number() {
    let sql = Lookup::new(value().key("c"), LookupKind::Gt, json!(u64::MAX))
        .compile(&mysql())
        .unwrap();
    assert_eq!(sql.sql, "JSON_EXTRACT(`value`, %s) > JSON_EXTRACT(%s, '$')");
    assert_eq!(sql.params[1], Value::Json("18446744073709551615".into()));
}
