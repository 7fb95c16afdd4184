pub mod algebra;
pub mod bit_vector;
pub mod boolean;
pub mod geometry;
pub mod nullability;
pub mod numeric;
pub mod selection;
pub mod string;
pub mod value;

pub use algebra::{FilterAlgebra, Predicate};
pub use bit_vector::BitVector;
pub use boolean::BooleanVector;
pub use geometry::{Coordinate, Geometry, GeometryType, GeometryVector};
pub use nullability::Nullability;
pub use numeric::{NumericData, NumericElement, NumericVector};
pub use selection::SelectionVector;
pub use string::{Dictionary, StringData, StringVector};
pub use value::Value;

use crate::engine::errors::DecodeError;
use serde_json::{Number, Value as JsonValue};

#[cfg(test)]
mod bit_vector_test;
#[cfg(test)]
mod geometry_test;

/// A decoded column of one feature table.
#[derive(Clone, Debug)]
pub enum Vector {
    Int(NumericVector<i32>),
    UInt(NumericVector<u32>),
    Long(NumericVector<i64>),
    ULong(NumericVector<u64>),
    Float(NumericVector<f32>),
    Double(NumericVector<f64>),
    Boolean(BooleanVector),
    String(StringVector),
}

macro_rules! each_vector {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            Vector::Int($v) => $body,
            Vector::UInt($v) => $body,
            Vector::Long($v) => $body,
            Vector::ULong($v) => $body,
            Vector::Float($v) => $body,
            Vector::Double($v) => $body,
            Vector::Boolean($v) => $body,
            Vector::String($v) => $body,
        }
    };
}

impl Vector {
    pub fn name(&self) -> &str {
        each_vector!(self, v => v.name())
    }

    pub fn size(&self) -> usize {
        each_vector!(self, v => v.size())
    }

    pub fn is_present(&self, index: usize) -> bool {
        each_vector!(self, v => v.is_present(index))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Vector::Int(_) => "int",
            Vector::UInt(_) => "uint",
            Vector::Long(_) => "long",
            Vector::ULong(_) => "ulong",
            Vector::Float(_) => "float",
            Vector::Double(_) => "double",
            Vector::Boolean(_) => "boolean",
            Vector::String(_) => "string",
        }
    }

    pub fn get(&self, index: usize) -> Result<Option<Value>, DecodeError> {
        Ok(match self {
            Vector::Int(v) => v.get(index).map(NumericElement::into_value),
            Vector::UInt(v) => v.get(index).map(NumericElement::into_value),
            Vector::Long(v) => v.get(index).map(NumericElement::into_value),
            Vector::ULong(v) => v.get(index).map(NumericElement::into_value),
            Vector::Float(v) => v.get(index).map(NumericElement::into_value),
            Vector::Double(v) => v.get(index).map(NumericElement::into_value),
            Vector::Boolean(v) => v.get(index).map(Value::Bool),
            Vector::String(v) => v.get(index)?.map(|s| Value::Str(s.into_owned())),
        })
    }

    /// Evaluates a predicate over JSON literals from scratch. A literal of
    /// the wrong type never equals a row, so `!=`/`!in` keep every row and
    /// the other operators keep none.
    pub fn select(
        &self,
        predicate: &Predicate<'_, JsonValue>,
    ) -> Result<SelectionVector, DecodeError> {
        match self {
            Vector::Int(v) => select_typed(v, v.size(), typed(predicate, as_number)),
            Vector::UInt(v) => select_typed(v, v.size(), typed(predicate, as_number)),
            Vector::Long(v) => select_typed(v, v.size(), typed(predicate, as_number)),
            Vector::ULong(v) => select_typed(v, v.size(), typed(predicate, as_number)),
            Vector::Float(v) => select_typed(v, v.size(), typed(predicate, as_number)),
            Vector::Double(v) => select_typed(v, v.size(), typed(predicate, as_number)),
            Vector::Boolean(v) => select_typed(v, v.size(), typed(predicate, as_bool)),
            Vector::String(v) => select_typed(v, v.size(), typed(predicate, JsonValue::as_str)),
        }
    }

    pub fn narrow(
        &self,
        predicate: &Predicate<'_, JsonValue>,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        match self {
            Vector::Int(v) => narrow_typed(v, typed(predicate, as_number), selection),
            Vector::UInt(v) => narrow_typed(v, typed(predicate, as_number), selection),
            Vector::Long(v) => narrow_typed(v, typed(predicate, as_number), selection),
            Vector::ULong(v) => narrow_typed(v, typed(predicate, as_number), selection),
            Vector::Float(v) => narrow_typed(v, typed(predicate, as_number), selection),
            Vector::Double(v) => narrow_typed(v, typed(predicate, as_number), selection),
            Vector::Boolean(v) => narrow_typed(v, typed(predicate, as_bool), selection),
            Vector::String(v) => narrow_typed(v, typed(predicate, JsonValue::as_str), selection),
        }
    }

    /// Rows with a value (`present == true`) or without one.
    pub fn select_presence(&self, present: bool) -> SelectionVector {
        (0..self.size())
            .filter(|&i| self.is_present(i) == present)
            .collect()
    }

    pub fn narrow_presence(&self, present: bool, selection: &mut SelectionVector) {
        selection.retain(|i| self.is_present(i) == present);
    }
}

fn as_number(v: &JsonValue) -> Option<&Number> {
    match v {
        JsonValue::Number(n) => Some(n),
        _ => None,
    }
}

fn as_bool(v: &JsonValue) -> Option<&bool> {
    match v {
        JsonValue::Bool(b) => Some(b),
        _ => None,
    }
}

enum Typed<'a, L: ?Sized> {
    Predicate(Predicate<'a, L>),
    Uniform(bool),
}

fn typed<'a, L: ?Sized>(
    predicate: &Predicate<'a, JsonValue>,
    cast: impl Fn(&'a JsonValue) -> Option<&'a L>,
) -> Typed<'a, L> {
    match predicate {
        Predicate::Eq(v) => one(cast(*v), Predicate::Eq, false),
        Predicate::NotEq(v) => one(cast(*v), Predicate::NotEq, true),
        Predicate::Gt(v) => one(cast(*v), Predicate::Gt, false),
        Predicate::Gte(v) => one(cast(*v), Predicate::Gte, false),
        Predicate::Lt(v) => one(cast(*v), Predicate::Lt, false),
        Predicate::Lte(v) => one(cast(*v), Predicate::Lte, false),
        Predicate::In(vs) => many(vs.iter().filter_map(|v| cast(*v)).collect(), Predicate::In, false),
        Predicate::NotIn(vs) => {
            many(vs.iter().filter_map(|v| cast(*v)).collect(), Predicate::NotIn, true)
        }
    }
}

fn one<'a, L: ?Sized>(
    literal: Option<&'a L>,
    wrap: fn(&'a L) -> Predicate<'a, L>,
    mismatch: bool,
) -> Typed<'a, L> {
    literal.map_or(Typed::Uniform(mismatch), |l| Typed::Predicate(wrap(l)))
}

fn many<'a, L: ?Sized>(
    literals: Vec<&'a L>,
    wrap: fn(Vec<&'a L>) -> Predicate<'a, L>,
    mismatch: bool,
) -> Typed<'a, L> {
    if literals.is_empty() {
        Typed::Uniform(mismatch)
    } else {
        Typed::Predicate(wrap(literals))
    }
}

fn select_typed<L: ?Sized>(
    vector: &impl FilterAlgebra<L>,
    size: usize,
    typed: Typed<'_, L>,
) -> Result<SelectionVector, DecodeError> {
    match typed {
        Typed::Predicate(p) => vector.select(&p),
        Typed::Uniform(true) => Ok(SelectionVector::all(size)),
        Typed::Uniform(false) => Ok(SelectionVector::empty()),
    }
}

fn narrow_typed<L: ?Sized>(
    vector: &impl FilterAlgebra<L>,
    typed: Typed<'_, L>,
    selection: &mut SelectionVector,
) -> Result<(), DecodeError> {
    match typed {
        Typed::Predicate(p) => vector.narrow(&p, selection),
        Typed::Uniform(true) => Ok(()),
        Typed::Uniform(false) => {
            selection.set_limit(0);
            Ok(())
        }
    }
}
