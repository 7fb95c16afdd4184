use crate::engine::core::vector::algebra::{
    FilterAlgebra, Predicate, narrow_rows, narrow_uniform, select_rows, select_uniform, unsupported,
};
use crate::engine::core::vector::nullability::Nullability;
use crate::engine::core::vector::selection::SelectionVector;
use crate::engine::core::vector::value::Value;
use crate::engine::errors::DecodeError;
use serde_json::Number;
use std::cmp::Ordering;
use std::fmt::Debug;

/// Element types a numeric column can hold.
pub trait NumericElement: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    fn into_value(self) -> Value;

    /// Exact ordering of `self` against a JSON literal.
    fn compare_literal(self, literal: &Number) -> Option<Ordering>;

    /// The `k` in `[0, size)` with `base + k * delta == target`, if any.
    fn sequence_index(base: Self, delta: Self, target: &Number, size: usize) -> Option<usize>;

    fn sequence_value(base: Self, delta: Self, index: usize) -> Self;

    fn is_zero(self) -> bool {
        self == Self::default()
    }
}

/// Exact integer value of a literal, rejecting fractions.
pub(crate) fn literal_to_i128(literal: &Number) -> Option<i128> {
    if let Some(v) = literal.as_i64() {
        return Some(v as i128);
    }
    if let Some(v) = literal.as_u64() {
        return Some(v as i128);
    }
    let f = literal.as_f64()?;
    (f.fract() == 0.0 && f.abs() < 1e38).then_some(f as i128)
}

fn compare_integer(value: i128, literal: &Number) -> Option<Ordering> {
    if let Some(v) = literal.as_i64() {
        return Some(value.cmp(&(v as i128)));
    }
    if let Some(v) = literal.as_u64() {
        return Some(value.cmp(&(v as i128)));
    }
    let f = literal.as_f64()?;
    if f.is_nan() {
        return None;
    }
    if f >= 1e38 {
        return Some(Ordering::Less);
    }
    if f <= -1e38 {
        return Some(Ordering::Greater);
    }
    let floor = f.floor();
    match value.cmp(&(floor as i128)) {
        // value == floor(f) < f when f has a fractional part
        Ordering::Equal if floor != f => Some(Ordering::Less),
        ord => Some(ord),
    }
}

macro_rules! integer_element {
    ($t:ty, $variant:ident, $wide:ty) => {
        impl NumericElement for $t {
            fn into_value(self) -> Value {
                Value::$variant(self as $wide)
            }

            fn compare_literal(self, literal: &Number) -> Option<Ordering> {
                compare_integer(self as i128, literal)
            }

            fn sequence_index(base: Self, delta: Self, target: &Number, size: usize) -> Option<usize> {
                let target = literal_to_i128(target)?;
                let (base, delta) = (base as i128, delta as i128);
                if delta == 0 {
                    return None;
                }
                let diff = target - base;
                if diff % delta != 0 {
                    return None;
                }
                let k = diff / delta;
                (k >= 0 && k < size as i128).then_some(k as usize)
            }

            fn sequence_value(base: Self, delta: Self, index: usize) -> Self {
                (base as i128).wrapping_add((index as i128).wrapping_mul(delta as i128)) as $t
            }
        }
    };
}

integer_element!(i32, Int, i64);
integer_element!(u32, UInt, u64);
integer_element!(i64, Int, i64);
integer_element!(u64, UInt, u64);

macro_rules! float_element {
    ($t:ty, $variant:ident) => {
        impl NumericElement for $t {
            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            // Literals are narrowed to the column width before comparing.
            fn compare_literal(self, literal: &Number) -> Option<Ordering> {
                self.partial_cmp(&(literal.as_f64()? as $t))
            }

            fn sequence_index(base: Self, delta: Self, target: &Number, size: usize) -> Option<usize> {
                let target = target.as_f64()? as $t;
                if delta == 0.0 {
                    return None;
                }
                let k = (target - base) / delta;
                if k.fract() != 0.0 || k < 0.0 || k >= size as $t {
                    return None;
                }
                let k = k as usize;
                (Self::sequence_value(base, delta, k) == target).then_some(k)
            }

            fn sequence_value(base: Self, delta: Self, index: usize) -> Self {
                base + index as $t * delta
            }
        }
    };
}

float_element!(f32, Float);
float_element!(f64, Double);

#[derive(Clone, Debug, PartialEq)]
pub enum NumericData<T> {
    Flat(Vec<T>),
    Const(T),
    /// `base + i * delta`, nothing materialised.
    Sequence { base: T, delta: T },
}

/// Named numeric column over one of the three storage shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericVector<T> {
    name: String,
    size: usize,
    nullability: Nullability,
    data: NumericData<T>,
}

impl<T: NumericElement> NumericVector<T> {
    pub fn flat(name: impl Into<String>, values: Vec<T>, nullability: Nullability) -> Self {
        Self {
            name: name.into(),
            size: values.len(),
            nullability,
            data: NumericData::Flat(values),
        }
    }

    pub fn constant(
        name: impl Into<String>,
        size: usize,
        value: T,
        nullability: Nullability,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            nullability,
            data: NumericData::Const(value),
        }
    }

    pub fn sequence(
        name: impl Into<String>,
        size: usize,
        base: T,
        delta: T,
        nullability: Nullability,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            nullability,
            data: NumericData::Sequence { base, delta },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn data(&self) -> &NumericData<T> {
        &self.data
    }

    pub fn nullability(&self) -> &Nullability {
        &self.nullability
    }

    pub fn is_present(&self, index: usize) -> bool {
        index < self.size && self.nullability.is_present(index)
    }

    /// Stored value regardless of presence; the default outside `[0, size)`.
    pub fn value_at(&self, index: usize) -> T {
        if index >= self.size {
            return T::default();
        }
        match &self.data {
            NumericData::Flat(values) => values.get(index).copied().unwrap_or_default(),
            NumericData::Const(value) => *value,
            NumericData::Sequence { base, delta } => T::sequence_value(*base, *delta, index),
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.is_present(index).then(|| self.value_at(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        (0..self.size).map(|i| self.get(i))
    }

    fn sequence_hit(
        &self,
        base: T,
        delta: T,
        predicate: &Predicate<'_, Number>,
    ) -> Result<SequenceHit, DecodeError> {
        let Predicate::Eq(target) = predicate else {
            return Err(unsupported(predicate, "sequence", &self.name));
        };
        if delta.is_zero() {
            return Ok(SequenceHit::Uniform(
                base.compare_literal(target) == Some(Ordering::Equal),
            ));
        }
        Ok(match T::sequence_index(base, delta, target, self.size) {
            Some(k) => SequenceHit::Index(k),
            None => SequenceHit::Uniform(false),
        })
    }
}

enum SequenceHit {
    Uniform(bool),
    Index(usize),
}

impl<T: NumericElement> FilterAlgebra<Number> for NumericVector<T> {
    fn select(&self, predicate: &Predicate<'_, Number>) -> Result<SelectionVector, DecodeError> {
        let accepts_null = predicate.accepts_null();
        match &self.data {
            NumericData::Flat(values) => Ok(select_rows(
                self.size,
                &self.nullability,
                accepts_null,
                |i| predicate.test(|l| values[i].compare_literal(l)),
            )),
            NumericData::Const(value) => Ok(select_uniform(
                self.size,
                &self.nullability,
                accepts_null,
                predicate.test(|l| value.compare_literal(l)),
            )),
            NumericData::Sequence { base, delta } => {
                match self.sequence_hit(*base, *delta, predicate)? {
                    SequenceHit::Uniform(hit) => Ok(select_uniform(
                        self.size,
                        &self.nullability,
                        accepts_null,
                        hit,
                    )),
                    SequenceHit::Index(k) if self.nullability.is_present(k) => {
                        Ok(SelectionVector::new(vec![k as u32]))
                    }
                    SequenceHit::Index(_) => Ok(SelectionVector::empty()),
                }
            }
        }
    }

    fn narrow(
        &self,
        predicate: &Predicate<'_, Number>,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        let accepts_null = predicate.accepts_null();
        match &self.data {
            NumericData::Flat(values) => {
                narrow_rows(selection, &self.nullability, accepts_null, |i| {
                    values
                        .get(i)
                        .is_some_and(|v| predicate.test(|l| v.compare_literal(l)))
                });
            }
            NumericData::Const(value) => narrow_uniform(
                selection,
                &self.nullability,
                accepts_null,
                predicate.test(|l| value.compare_literal(l)),
            ),
            NumericData::Sequence { base, delta } => {
                match self.sequence_hit(*base, *delta, predicate)? {
                    SequenceHit::Uniform(hit) => {
                        narrow_uniform(selection, &self.nullability, accepts_null, hit)
                    }
                    SequenceHit::Index(k) => {
                        let present = self.nullability.is_present(k);
                        selection.retain(|i| present && i == k);
                    }
                }
            }
        }
        Ok(())
    }
}
