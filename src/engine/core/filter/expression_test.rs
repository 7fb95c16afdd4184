use crate::engine::core::filter::expression::{CompareOp, FilterExpression};
use crate::engine::core::vector::GeometryType;
use crate::engine::errors::DecodeError;
use serde_json::json;

#[test]
fn parses_comparisons() {
    let expr = FilterExpression::parse(&json!([">=", "rank", 3])).unwrap();
    assert_eq!(
        expr,
        FilterExpression::Compare {
            key: "rank".into(),
            op: CompareOp::Gte,
            literal: json!(3),
        }
    );
}

#[test]
fn parses_nested_all_with_matches() {
    let expr: FilterExpression = r#"["all", ["in", "class", "road", "path"], ["!has", "tunnel"]]"#
        .parse()
        .unwrap();
    assert_eq!(
        expr,
        FilterExpression::All(vec![
            FilterExpression::In {
                key: "class".into(),
                literals: vec![json!("road"), json!("path")],
                negated: false,
            },
            FilterExpression::Has {
                key: "tunnel".into(),
                negated: true,
            },
        ])
    );
}

#[test]
fn geometry_type_keys_become_geometry_filters() {
    let expr = FilterExpression::parse(&json!(["==", "$type", "Polygon"])).unwrap();
    assert_eq!(
        expr,
        FilterExpression::GeometryType {
            types: vec![GeometryType::Polygon],
            negated: false,
        }
    );
    assert!(expr.is_geometry_filter());

    let expr = FilterExpression::parse(&json!(["!in", "geometry-type", "Point", "LineString"])).unwrap();
    assert_eq!(
        expr,
        FilterExpression::GeometryType {
            types: vec![GeometryType::Point, GeometryType::LineString],
            negated: true,
        }
    );
}

#[test]
fn deserializes_through_serde() {
    let expr: FilterExpression = serde_json::from_str(r#"["any", ["has", "name"]]"#).unwrap();
    assert_eq!(
        expr,
        FilterExpression::Any(vec![FilterExpression::Has {
            key: "name".into(),
            negated: false,
        }])
    );
}

#[test]
fn rejects_malformed_expressions() {
    let cases = [
        json!("=="),
        json!([]),
        json!([42, "a", 1]),
        json!(["~=", "a", 1]),
        json!(["==", "a"]),
        json!(["==", 7, 1]),
        json!(["==", "a", [1, 2]]),
        json!(["has"]),
        json!(["in"]),
        json!([">", "$type", "Point"]),
        json!(["==", "$type", "Circle"]),
        json!(["all", ["==", "a"]]),
    ];
    for case in cases {
        let err = FilterExpression::parse(&case).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFilter(_)), "{}", case);
    }
}

#[test]
fn invalid_json_text_is_an_invalid_filter() {
    let err = "[\"==\", ".parse::<FilterExpression>().unwrap_err();
    assert!(matches!(err, DecodeError::InvalidFilter(_)));
}
