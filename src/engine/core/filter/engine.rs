use crate::engine::core::filter::expression::{CompareOp, FilterExpression};
use crate::engine::core::vector::{GeometryType, GeometryVector, Predicate, SelectionVector};
use crate::engine::errors::DecodeError;
use crate::engine::tile::FeatureTable;
use serde_json::Value as JsonValue;
use tracing::trace;

/// Selects the features of `table` matching `expression`; no expression
/// selects every feature.
pub fn filter_feature_table(
    table: &FeatureTable,
    expression: Option<&FilterExpression>,
) -> Result<SelectionVector, DecodeError> {
    let Some(expression) = expression else {
        return Ok(SelectionVector::all(table.num_features()));
    };
    let mut selection = None;
    evaluate(table, expression, &mut selection)?;
    Ok(selection.unwrap_or_else(|| SelectionVector::all(table.num_features())))
}

/// Narrows `selection` in place, or seeds it when nothing has been
/// selected yet.
fn evaluate(
    table: &FeatureTable,
    expression: &FilterExpression,
    selection: &mut Option<SelectionVector>,
) -> Result<(), DecodeError> {
    match expression {
        FilterExpression::All(children) => {
            let ordered = children
                .iter()
                .filter(|c| c.is_geometry_filter())
                .chain(children.iter().filter(|c| !c.is_geometry_filter()));
            for child in ordered {
                evaluate(table, child, selection)?;
                if selection.as_ref().is_some_and(SelectionVector::is_empty) {
                    trace!(
                        target: "mlt_decoder::filter",
                        table = table.name(),
                        "Selection exhausted, skipping remaining filters"
                    );
                    break;
                }
            }
            Ok(())
        }
        FilterExpression::Any(_) => Err(DecodeError::UnsupportedOperation(
            "'any' filter expressions".into(),
        )),
        FilterExpression::GeometryType { types, negated } => {
            let geometry = table.geometry();
            match (types.as_slice(), *negated, selection.as_mut()) {
                ([single], false, None) => *selection = Some(geometry.filter(*single)),
                ([single], false, Some(s)) => geometry.filter_selected(*single, s),
                (_, _, Some(s)) => s.retain(|i| matches_types(geometry, i, types) != *negated),
                (_, _, None) => {
                    *selection = Some(
                        (0..geometry.size())
                            .filter(|&i| matches_types(geometry, i, types) != *negated)
                            .collect(),
                    )
                }
            }
            Ok(())
        }
        FilterExpression::Compare { key, op, literal } => {
            narrow_column(table, key, &compare_predicate(*op, literal), selection)
        }
        FilterExpression::In {
            key,
            literals,
            negated,
        } => {
            let refs: Vec<&JsonValue> = literals.iter().collect();
            let predicate = if *negated {
                Predicate::NotIn(refs)
            } else {
                Predicate::In(refs)
            };
            narrow_column(table, key, &predicate, selection)
        }
        FilterExpression::Has { key, negated } => {
            match table.property(key) {
                None => apply_missing(table, key, *negated, selection),
                Some(vector) => match selection.as_mut() {
                    Some(s) => vector.narrow_presence(!negated, s),
                    None => *selection = Some(vector.select_presence(!negated)),
                },
            }
            Ok(())
        }
    }
}

fn narrow_column(
    table: &FeatureTable,
    key: &str,
    predicate: &Predicate<'_, JsonValue>,
    selection: &mut Option<SelectionVector>,
) -> Result<(), DecodeError> {
    match table.property(key) {
        None => apply_missing(table, key, predicate.accepts_null(), selection),
        Some(vector) => match selection.as_mut() {
            Some(s) => vector.narrow(predicate, s)?,
            None => *selection = Some(vector.select(predicate)?),
        },
    }
    Ok(())
}

fn compare_predicate(op: CompareOp, literal: &JsonValue) -> Predicate<'_, JsonValue> {
    match op {
        CompareOp::Eq => Predicate::Eq(literal),
        CompareOp::Neq => Predicate::NotEq(literal),
        CompareOp::Gt => Predicate::Gt(literal),
        CompareOp::Gte => Predicate::Gte(literal),
        CompareOp::Lt => Predicate::Lt(literal),
        CompareOp::Lte => Predicate::Lte(literal),
    }
}

fn matches_types(geometry: &GeometryVector, index: usize, types: &[GeometryType]) -> bool {
    geometry.geometry_type(index).is_some_and(|t| {
        types
            .iter()
            .any(|wanted| wanted.single_part() == t.single_part())
    })
}

/// A column absent from the table keeps every row for negated operators
/// and none for the rest.
fn apply_missing(
    table: &FeatureTable,
    key: &str,
    keep_all: bool,
    selection: &mut Option<SelectionVector>,
) {
    trace!(
        target: "mlt_decoder::filter",
        table = table.name(),
        column = key,
        keep_all,
        "Filter names a missing column"
    );
    match (keep_all, selection.as_mut()) {
        (true, Some(_)) => {}
        (true, None) => *selection = Some(SelectionVector::all(table.num_features())),
        (false, Some(s)) => s.set_limit(0),
        (false, None) => *selection = Some(SelectionVector::empty()),
    }
}
