use crate::engine::core::vector::GeometryType;
use crate::engine::errors::DecodeError;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Keys that address the geometry column instead of a property.
pub const GEOMETRY_TYPE_KEYS: [&str; 2] = ["$type", "geometry-type"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "==" => Some(CompareOp::Eq),
            "!=" => Some(CompareOp::Neq),
            ">" => Some(CompareOp::Gt),
            ">=" => Some(CompareOp::Gte),
            "<" => Some(CompareOp::Lt),
            "<=" => Some(CompareOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        }
    }
}

/// A style filter, parsed from its JSON array form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "JsonValue")]
pub enum FilterExpression {
    /// Every child must match.
    All(Vec<FilterExpression>),
    /// Parsed for completeness; evaluation is not supported.
    Any(Vec<FilterExpression>),
    Compare {
        key: String,
        op: CompareOp,
        literal: JsonValue,
    },
    In {
        key: String,
        literals: Vec<JsonValue>,
        negated: bool,
    },
    Has {
        key: String,
        negated: bool,
    },
    /// `$type` comparison; single-part types also match their multi-part
    /// counterparts.
    GeometryType {
        types: Vec<GeometryType>,
        negated: bool,
    },
}

impl FilterExpression {
    pub fn parse(value: &JsonValue) -> Result<Self, DecodeError> {
        let items = value
            .as_array()
            .ok_or_else(|| invalid(format!("expected an array, got {}", value)))?;
        let (head, args) = items
            .split_first()
            .ok_or_else(|| invalid("empty expression"))?;
        let op = head
            .as_str()
            .ok_or_else(|| invalid(format!("operator must be a string, got {}", head)))?;

        match op {
            "all" => Ok(FilterExpression::All(parse_children(args)?)),
            "any" => Ok(FilterExpression::Any(parse_children(args)?)),
            "in" | "!in" => parse_in(args, op == "!in"),
            "has" | "!has" => match args {
                [key] => Ok(FilterExpression::Has {
                    key: parse_key(key)?,
                    negated: op == "!has",
                }),
                _ => Err(invalid(format!("'{}' takes exactly one key", op))),
            },
            _ => match CompareOp::parse(op) {
                Some(compare) => parse_compare(args, compare),
                None => Err(invalid(format!("unknown operator '{}'", op))),
            },
        }
    }

    /// Geometry type filters are evaluated before property filters.
    pub fn is_geometry_filter(&self) -> bool {
        matches!(self, FilterExpression::GeometryType { .. })
    }
}

fn invalid(detail: impl Into<String>) -> DecodeError {
    DecodeError::InvalidFilter(detail.into())
}

fn parse_children(args: &[JsonValue]) -> Result<Vec<FilterExpression>, DecodeError> {
    args.iter().map(FilterExpression::parse).collect()
}

fn parse_key(key: &JsonValue) -> Result<String, DecodeError> {
    key.as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(format!("key must be a string, got {}", key)))
}

fn parse_literal(literal: &JsonValue) -> Result<JsonValue, DecodeError> {
    match literal {
        JsonValue::Array(_) | JsonValue::Object(_) => {
            Err(invalid(format!("literal must be a scalar, got {}", literal)))
        }
        other => Ok(other.clone()),
    }
}

fn parse_geometry_type(literal: &JsonValue) -> Result<GeometryType, DecodeError> {
    literal
        .as_str()
        .and_then(GeometryType::from_filter_name)
        .ok_or_else(|| invalid(format!("invalid geometry type {}", literal)))
}

fn is_geometry_key(key: &str) -> bool {
    GEOMETRY_TYPE_KEYS.contains(&key)
}

fn parse_compare(args: &[JsonValue], op: CompareOp) -> Result<FilterExpression, DecodeError> {
    let [key, literal] = args else {
        return Err(invalid(format!("'{}' takes a key and one literal", op.as_str())));
    };
    let key = parse_key(key)?;
    if is_geometry_key(&key) {
        let negated = match op {
            CompareOp::Eq => false,
            CompareOp::Neq => true,
            other => {
                return Err(invalid(format!(
                    "'{}' is not defined for geometry types",
                    other.as_str()
                )));
            }
        };
        return Ok(FilterExpression::GeometryType {
            types: vec![parse_geometry_type(literal)?],
            negated,
        });
    }
    Ok(FilterExpression::Compare {
        key,
        op,
        literal: parse_literal(literal)?,
    })
}

fn parse_in(args: &[JsonValue], negated: bool) -> Result<FilterExpression, DecodeError> {
    let (key, literals) = args
        .split_first()
        .ok_or_else(|| invalid("'in' needs a key"))?;
    let key = parse_key(key)?;
    if is_geometry_key(&key) {
        return Ok(FilterExpression::GeometryType {
            types: literals
                .iter()
                .map(parse_geometry_type)
                .collect::<Result<_, _>>()?,
            negated,
        });
    }
    Ok(FilterExpression::In {
        key,
        literals: literals.iter().map(parse_literal).collect::<Result<_, _>>()?,
        negated,
    })
}

impl TryFrom<JsonValue> for FilterExpression {
    type Error = DecodeError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        FilterExpression::parse(&value)
    }
}

impl FromStr for FilterExpression {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: JsonValue = serde_json::from_str(s).map_err(|e| invalid(e.to_string()))?;
        FilterExpression::parse(&value)
    }
}
