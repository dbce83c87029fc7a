//! Placeholder cursor against a recording driver.

mod common;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use sqljson_oracle::driver::{Binds, Cell, ColumnDescription, DbType, InputSizes, RawCell};
use sqljson_oracle::types::BindValue;
use sqljson_oracle::{
    DriverError, FormatStylePlaceholderCursor, InputSize, OracleError, Param, Params,
};

use common::{MockCursor, Shared};

fn cursor() -> (FormatStylePlaceholderCursor<MockCursor>, Shared) {
    let state = Shared::default();
    (
        FormatStylePlaceholderCursor::new(MockCursor::new(state.clone()), true),
        state,
    )
}

fn named(pairs: &[(&str, BindValue)]) -> Binds {
    Binds::Named(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    )
}

#[test]
fn test_execute_dedupes_values() {
    let (mut cursor, state) = cursor();
    let params = Params::positional([Param::from("a"), Param::from("b"), Param::from("a")]);
    cursor
        .execute("SELECT 1 FROM t WHERE x IN (%s, %s, %s);", Some(&params))
        .unwrap();

    let state = state.borrow();
    let (sql, binds) = &state.executed[0];
    assert_eq!(sql, "SELECT 1 FROM t WHERE x IN (:arg0, :arg1, :arg0)");
    assert_eq!(
        binds,
        &named(&[
            ("arg0", BindValue::Text("a".into())),
            ("arg1", BindValue::Text("b".into())),
        ])
    );
    assert!(state.input_sizes.is_empty());
}

#[test]
fn test_execute_without_params_keeps_text() {
    let (mut cursor, state) = cursor();
    cursor.execute("SELECT '100%%' FROM DUAL", None).unwrap();

    let state = state.borrow();
    assert_eq!(state.executed[0].0, "SELECT '100%%' FROM DUAL");
    assert!(state.executed[0].1.is_empty());
}

#[test]
fn test_execute_sets_input_sizes() {
    let (mut cursor, state) = cursor();
    let when = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    let params = Params::positional([Param::Text("x".repeat(4001)), Param::Timestamp(when)]);
    cursor
        .execute("INSERT INTO t VALUES (%s, %s)", Some(&params))
        .unwrap();

    let expected: BTreeMap<String, InputSize> = [
        ("arg0".to_string(), InputSize::Clob),
        ("arg1".to_string(), InputSize::Timestamp),
    ]
    .into_iter()
    .collect();
    assert_eq!(state.borrow().input_sizes, vec![InputSizes::Named(expected)]);
}

#[test]
fn test_execute_many_keeps_every_value() {
    let (mut cursor, state) = cursor();
    let rows = vec![
        Params::positional([Param::Int(1), Param::Int(1)]),
        Params::positional([Param::Bool(true), Param::Text("y".repeat(5000))]),
    ];
    cursor
        .execute_many("INSERT INTO t VALUES (%s, %s)", &rows)
        .unwrap();

    let state = state.borrow();
    let (sql, binds) = &state.executed_many[0];
    assert_eq!(sql, "INSERT INTO t VALUES (:arg0, :arg1)");
    assert_eq!(
        binds[0],
        Binds::Positional(vec![BindValue::Int(1), BindValue::Int(1)])
    );
    assert_eq!(
        binds[1],
        Binds::Positional(vec![BindValue::Int(1), BindValue::Text("y".repeat(5000))])
    );
    // the CLOB hint of the second row covers the whole batch
    assert_eq!(
        state.input_sizes,
        vec![InputSizes::Positional(vec![None, Some(InputSize::Clob)])]
    );
}

#[test]
fn test_execute_many_with_no_rows_is_noop() {
    let (mut cursor, state) = cursor();
    cursor.execute_many("INSERT INTO t VALUES (%s)", &[]).unwrap();
    assert!(state.borrow().executed_many.is_empty());
}

#[test]
fn test_execute_many_rejects_ragged_rows() {
    let (mut cursor, state) = cursor();
    let rows = vec![
        Params::positional([1i64, 2]),
        Params::positional([3i64]),
    ];
    let err = cursor
        .execute_many("INSERT INTO t VALUES (%s, %s)", &rows)
        .unwrap_err();
    assert!(matches!(err, OracleError::Params(_)));
    assert!(state.borrow().executed_many.is_empty());
}

#[test]
fn test_named_execute_many() {
    let (mut cursor, state) = cursor();
    let rows = vec![
        Params::named([("id", 1i64)]),
        Params::named([("id", 2i64)]),
    ];
    cursor
        .execute_many("DELETE FROM t WHERE id = %(id)s", &rows)
        .unwrap();
    let state = state.borrow();
    assert_eq!(state.executed_many[0].0, "DELETE FROM t WHERE id = :id");
    assert_eq!(state.executed_many[0].1.len(), 2);
}

#[test]
fn test_execute_translates_deferred_fk_error() {
    let (mut cursor, state) = cursor();
    state.borrow_mut().failures.push((
        "COMMIT".into(),
        DriverError::database(Some(2091), "ORA-02091: rolled back\nORA-02291: parent key not found"),
    ));
    let err = cursor.execute("COMMIT", None).unwrap_err();
    assert!(matches!(err, OracleError::Integrity(_)));
}

#[test]
fn test_fetch_converts_number_columns() {
    let (mut cursor, state) = cursor();
    {
        let mut state = state.borrow_mut();
        state.description = vec![
            ColumnDescription::number("ID", 11, 0),
            ColumnDescription::number("PRICE", 8, 2),
            ColumnDescription::number("RATIO", 126, -127),
            ColumnDescription::number("TOTAL", 0, -127),
            ColumnDescription::new("NAME", DbType::Varchar),
        ];
        state.rows.push_back(vec![
            RawCell::Text("7".into()),
            RawCell::Text("19.5".into()),
            RawCell::Text("0.25".into()),
            RawCell::Text("3.75".into()),
            RawCell::Text("12".into()),
        ]);
        state.rows.push_back(vec![
            RawCell::Null,
            RawCell::Null,
            RawCell::Null,
            RawCell::Text("40".into()),
            RawCell::Null,
        ]);
    }
    cursor.execute("SELECT * FROM prices", None).unwrap();

    let rows = cursor.fetch_all().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], Cell::Int(7));
    let Cell::Decimal(price) = &rows[0][1] else {
        panic!("expected a decimal price");
    };
    assert_eq!(price.to_string(), "19.50");
    assert_eq!(rows[0][2], Cell::Float(0.25));
    assert_eq!(rows[0][3], Cell::Decimal(Decimal::new(375, 2)));
    assert_eq!(rows[0][4], Cell::Text("12".into()));
    assert_eq!(rows[1][0], Cell::Null);
    assert_eq!(rows[1][3], Cell::Int(40));
}

#[test]
fn test_close_ignores_interface_error() {
    let (mut cursor, state) = cursor();
    state.borrow_mut().close_error = Some(DriverError::interface("cursor already closed"));
    cursor.close().unwrap();

    state.borrow_mut().close_error = Some(DriverError::database(Some(1013), "ORA-01013"));
    assert!(matches!(cursor.close(), Err(OracleError::Database(_))));
    assert_eq!(state.borrow().closed, 2);
}
