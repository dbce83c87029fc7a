use crate::ast::*;
use crate::parser::{grammar, parse_filter_key};

#[test]
fn test_bare_field_is_exact() {
    let key = parse_filter_key("value").unwrap();
    assert_eq!(key.field, "value");
    assert!(key.keys.is_empty());
    assert_eq!(key.lookup, LookupKind::Exact);
}

#[test]
fn test_field_level_lookup() {
    let key = parse_filter_key("value__has_keys").unwrap();
    assert_eq!(key.field, "value");
    assert!(key.keys.is_empty());
    assert_eq!(key.lookup, LookupKind::HasKeys);

    let key = parse_filter_key("value__contains").unwrap();
    assert_eq!(key.lookup, LookupKind::Contains);
}

#[test]
fn test_key_chain_without_lookup() {
    let key = parse_filter_key("value__owner__name").unwrap();
    assert_eq!(
        key.keys,
        vec![
            PathSegment::Key("owner".to_string()),
            PathSegment::Key("name".to_string()),
        ]
    );
    assert_eq!(key.lookup, LookupKind::Exact);
}

#[test]
fn test_digit_segments_are_indices() {
    let key = parse_filter_key("value__d__1__f__icontains").unwrap();
    assert_eq!(
        key.keys,
        vec![
            PathSegment::Key("d".to_string()),
            PathSegment::Index(1),
            PathSegment::Key("f".to_string()),
        ]
    );
    assert_eq!(key.lookup, LookupKind::IContains);
}

#[test]
fn test_contains_on_key_is_substring() {
    let key = parse_filter_key("value__bar__contains").unwrap();
    assert_eq!(key.lookup, LookupKind::TextContains);
}

#[test]
fn test_text_lookup_name_on_column_is_a_key() {
    let key = parse_filter_key("value__lt").unwrap();
    assert_eq!(key.keys, vec![PathSegment::Key("lt".to_string())]);
    assert_eq!(key.lookup, LookupKind::Exact);
}

#[test]
fn test_numeric_lookup_on_key() {
    let key = parse_filter_key("value__c__gte").unwrap();
    assert_eq!(key.keys, vec![PathSegment::Key("c".to_string())]);
    assert_eq!(key.lookup, LookupKind::Gte);
}

#[test]
fn test_key_with_special_characters() {
    let key = parse_filter_key("value__%total__isnull").unwrap();
    assert_eq!(key.keys, vec![PathSegment::Key("%total".to_string())]);
    assert_eq!(key.lookup, LookupKind::IsNull);
}

#[test]
fn test_single_underscores_stay_in_segment() {
    let key = parse_filter_key("json_value__first_name").unwrap();
    assert_eq!(key.field, "json_value");
    assert_eq!(key.keys, vec![PathSegment::Key("first_name".to_string())]);
}

#[test]
fn test_empty_segment_is_rejected() {
    assert!(parse_filter_key("value____a").is_err());
    assert!(parse_filter_key("value__").is_err());
    assert!(parse_filter_key("").is_err());
}

#[test]
fn test_invalid_field_name() {
    let err = parse_filter_key("1value__a").unwrap_err();
    assert!(err.to_string().contains("invalid field name"));
}

#[test]
fn test_expr_builds_key_chain() {
    let key = parse_filter_key("value__a__0").unwrap();
    assert_eq!(key.expr(), Expr::col("value").key("a").key(0u64));
}

#[test]
fn test_grammar_segments() {
    let (_, segments) = grammar::parse_segments("value__a__0__gt").unwrap();
    assert_eq!(segments, vec!["value", "a", "0", "gt"]);
}

#[test]
fn test_grammar_identifier() {
    assert!(grammar::is_identifier("_private"));
    assert!(grammar::is_identifier("value2"));
    assert!(!grammar::is_identifier("2value"));
    assert!(!grammar::is_identifier("val-ue"));
}
