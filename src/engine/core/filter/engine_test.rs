use crate::engine::core::filter::{FilterExpression, filter_feature_table};
use crate::engine::core::vector::geometry::{GeometryTypes, Topology, VertexBuffer};
use crate::engine::core::vector::{
    BitVector, GeometryType, GeometryVector, Nullability, NumericVector, StringVector, Vector,
};
use crate::engine::errors::DecodeError;
use crate::engine::tile::FeatureTable;
use serde_json::json;

/// Five features; row 3 has no class.
fn table() -> FeatureTable {
    use GeometryType::*;
    let geometry = GeometryVector::new(
        5,
        GeometryTypes::Flat(vec![Point, LineString, Point, Polygon, MultiPoint]),
        Topology::default(),
        None,
        VertexBuffer::Vec2(Vec::new()),
    );
    let class = StringVector::plain(
        "class",
        vec![0, 4, 8, 12, 12, 17],
        b"roadpathroadriver".to_vec(),
        Nullability::new(Some(BitVector::from_bools(&[true, true, true, false, true]))),
    )
    .unwrap();
    let rank = NumericVector::flat("rank", vec![1i32, 2, 3, 4, 5], Nullability::all_present());
    let age = NumericVector::constant("age", 5, 42i32, Nullability::all_present());

    FeatureTable::new(
        "roads",
        4096,
        geometry,
        None,
        vec![Vector::String(class), Vector::Int(rank), Vector::Int(age)],
    )
}

fn select(table: &FeatureTable, expression: serde_json::Value) -> Vec<u32> {
    let expression = FilterExpression::parse(&expression).unwrap();
    filter_feature_table(table, Some(&expression))
        .unwrap()
        .as_slice()
        .to_vec()
}

#[test]
fn no_expression_selects_everything() {
    let selection = filter_feature_table(&table(), None).unwrap();
    assert_eq!(selection.as_slice(), &[0, 1, 2, 3, 4]);
}

#[test]
fn const_column_matches_all_or_nothing() {
    let table = table();
    assert_eq!(select(&table, json!(["==", "age", 42])).len(), 5);
    assert!(select(&table, json!(["==", "age", 43])).is_empty());
}

#[test]
fn geometry_type_runs_first_inside_all() {
    let table = table();
    let rows = select(
        &table,
        json!(["all", ["==", "class", "road"], ["==", "$type", "Point"]]),
    );
    assert_eq!(rows, vec![0, 2]);
    assert_eq!(select(&table, json!(["!=", "$type", "Point"])), vec![1, 3]);
    assert_eq!(
        select(&table, json!(["in", "$type", "LineString", "Polygon"])),
        vec![1, 3]
    );
}

#[test]
fn all_stops_once_the_selection_is_empty() {
    // the trailing 'any' would fail if it were evaluated
    let rows = select(
        &table(),
        json!(["all", ["==", "age", 43], ["any", ["has", "class"]]]),
    );
    assert!(rows.is_empty());
}

#[test]
fn any_is_unsupported() {
    let expression = FilterExpression::parse(&json!(["any", ["has", "class"]])).unwrap();
    let err = filter_feature_table(&table(), Some(&expression)).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedOperation(_)));
}

#[test]
fn missing_columns_have_fixed_outcomes() {
    let table = table();
    assert_eq!(select(&table, json!(["!=", "nope", 1])).len(), 5);
    assert_eq!(select(&table, json!(["!in", "nope", 1, 2])).len(), 5);
    assert_eq!(select(&table, json!(["!has", "nope"])).len(), 5);
    assert!(select(&table, json!(["==", "nope", 1])).is_empty());
    assert!(select(&table, json!(["in", "nope", 1])).is_empty());
    assert!(select(&table, json!(["has", "nope"])).is_empty());
    assert!(select(&table, json!([">=", "nope", 1])).is_empty());
}

#[test]
fn missing_column_narrows_an_existing_selection() {
    let table = table();
    assert_eq!(
        select(&table, json!(["all", [">", "rank", 3], ["!has", "nope"]])),
        vec![3, 4]
    );
    assert!(select(&table, json!(["all", [">", "rank", 3], ["has", "nope"]])).is_empty());
}

#[test]
fn has_follows_presence() {
    let table = table();
    assert_eq!(select(&table, json!(["has", "class"])), vec![0, 1, 2, 4]);
    assert_eq!(select(&table, json!(["!has", "class"])), vec![3]);
}

#[test]
fn not_equal_keeps_absent_rows() {
    assert_eq!(select(&table(), json!(["!=", "class", "road"])), vec![1, 3, 4]);
}

#[test]
fn match_and_ordering_on_flat_columns() {
    let table = table();
    assert_eq!(select(&table, json!(["in", "rank", 2, 4, 9])), vec![1, 3]);
    assert_eq!(select(&table, json!(["!in", "rank", 2, 4])), vec![0, 2, 4]);
    assert_eq!(select(&table, json!([">", "rank", 3])), vec![3, 4]);
    assert_eq!(select(&table, json!(["<=", "rank", 2])), vec![0, 1]);
    assert_eq!(
        select(
            &table,
            json!(["all", [">=", "rank", 2], ["<", "rank", 5], ["!=", "class", "path"]])
        ),
        vec![2, 3]
    );
}
