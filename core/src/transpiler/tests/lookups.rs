use pretty_assertions::assert_eq;
use serde_json::json;

use crate::ast::*;
use crate::error::JsonError;
use crate::transpiler::{Connection, Dialect, Fragment, render_placeholders};

fn value() -> Expr {
    Expr::col("value")
}

#[test]
fn test_render_placeholders_per_dialect() {
    let sql = Fragment::new("a = %s AND b LIKE '%%x' AND c = %s", vec![1.into(), 2.into()]);
    assert_eq!(sql.render(Dialect::Postgres), "a = $1 AND b LIKE '%x' AND c = $2");
    assert_eq!(sql.render(Dialect::MySql), "a = ? AND b LIKE '%x' AND c = ?");
    assert_eq!(sql.render(Dialect::Sqlite), "a = ? AND b LIKE '%x' AND c = ?");
    assert_eq!(sql.render(Dialect::Oracle), "a = :arg0 AND b LIKE '%x' AND c = :arg1");
}

#[test]
fn test_render_placeholders_keeps_lone_percent() {
    assert_eq!(render_placeholders("50% off", |_| "?".into()), "50% off");
}

#[test]
fn test_has_keys_is_conjunction_of_has_key() {
    for dialect in [Dialect::MySql, Dialect::Oracle, Dialect::Sqlite] {
        let conn = Connection::new(dialect);
        let both = Lookup::has_keys(value(), ["a", "c"]).compile(&conn).unwrap();
        let a = Lookup::has_key(value(), "a").compile(&conn).unwrap();
        let c = Lookup::has_key(value(), "c").compile(&conn).unwrap();
        assert_eq!(both.sql, format!("({} AND {})", a.sql, c.sql), "{}", dialect);
        let mut params = a.params;
        params.extend(c.params);
        assert_eq!(both.params, params, "{}", dialect);
    }
}

#[test]
fn test_has_key_accepts_non_string_scalar() {
    let lookup = Lookup::new(value(), LookupKind::HasKey, json!(1));
    let sql = lookup.compile(&Connection::new(Dialect::Sqlite)).unwrap();
    assert_eq!(sql.params, vec![Value::String(r#"$."1""#.into())]);
}

#[test]
fn test_empty_key_list_is_rejected() {
    let lookup = Lookup::has_keys(value(), Vec::<String>::new());
    for dialect in Dialect::ALL {
        let err = lookup.compile(&Connection::new(dialect)).unwrap_err();
        assert!(matches!(err, JsonError::InvalidRhs { .. }), "{}", dialect);
    }
}

#[test]
fn test_has_key_rejects_several_keys() {
    let lookup = Lookup::new(value(), LookupKind::HasKey, json!(["a", "zzz"]));
    for dialect in Dialect::ALL {
        let err = lookup.compile(&Connection::new(dialect)).unwrap_err();
        assert!(matches!(err, JsonError::InvalidRhs { .. }), "{}", dialect);
    }

    let single = Lookup::new(value(), LookupKind::HasKey, json!(["a"]));
    let sql = single.compile(&Connection::new(Dialect::Sqlite)).unwrap();
    assert_eq!(sql.params, vec![Value::String(r#"$."a""#.into())]);
}

#[test]
fn test_null_key_is_rejected() {
    let lookup = Lookup::new(value(), LookupKind::HasAnyKeys, json!(["a", null]));
    let err = lookup.compile(&Connection::new(Dialect::MySql)).unwrap_err();
    assert!(err.to_string().contains("null is not a key"));
}

#[test]
fn test_text_lookup_on_column_is_rejected() {
    let lookup = Lookup::new(value(), LookupKind::IContains, json!("a"));
    let err = lookup.compile(&Connection::new(Dialect::Postgres)).unwrap_err();
    assert!(matches!(err, JsonError::InvalidLookup { .. }));
}

#[test]
fn test_isnull_requires_boolean() {
    let lookup = Lookup::new(value().key("a"), LookupKind::IsNull, json!("yes"));
    let err = lookup.compile(&Connection::new(Dialect::Sqlite)).unwrap_err();
    assert!(matches!(err, JsonError::InvalidRhs { .. }));
}

#[test]
fn test_numeric_lookup_rejects_null() {
    let lookup = Lookup::new(value().key("a"), LookupKind::Lt, json!(null));
    let err = lookup.compile(&Connection::new(Dialect::MySql)).unwrap_err();
    assert!(matches!(err, JsonError::InvalidRhs { .. }));
}

#[test]
fn test_column_isnull_is_plain_sql_null() {
    for dialect in [Dialect::Postgres, Dialect::Sqlite] {
        let sql = Lookup::isnull(value(), false)
            .compile(&Connection::new(dialect))
            .unwrap();
        assert_eq!(sql.sql, r#""value" IS NOT NULL"#);
    }
    let sql = Lookup::isnull(value(), true)
        .compile(&Connection::new(Dialect::MySql))
        .unwrap();
    assert_eq!(sql.sql, "`value` IS NULL");
}

#[test]
fn test_contained_by_support_per_dialect() {
    for dialect in Dialect::ALL {
        let result = Lookup::contained_by(value(), json!({"a": 1})).compile(&Connection::new(dialect));
        match dialect {
            Dialect::Postgres | Dialect::MySql => assert!(result.is_ok(), "{}", dialect),
            Dialect::Oracle | Dialect::Sqlite => assert!(
                matches!(result, Err(JsonError::NotSupported { .. })),
                "{}",
                dialect
            ),
        }
    }
}

#[test]
fn test_text_rhs_non_string_is_stringified() {
    let lookup = Lookup::new(value().key("c"), LookupKind::StartsWith, json!(1));
    let sql = lookup.compile(&Connection::new(Dialect::Postgres)).unwrap();
    assert_eq!(sql.params[1], Value::String("1%".into()));
}

#[test]
fn test_percent_in_identifier_is_escaped() {
    let sql = Expr::col("50%").compile(&Connection::new(Dialect::Sqlite)).unwrap();
    assert_eq!(sql.sql, r#""50%%""#);
    assert_eq!(sql.render(Dialect::Sqlite), r#""50%""#);
}
