use crate::engine::core::vector::nullability::Nullability;
use crate::engine::core::vector::selection::SelectionVector;
use crate::engine::errors::DecodeError;
use std::cmp::Ordering;

/// A single comparison against literals of type `L`.
pub enum Predicate<'a, L: ?Sized> {
    Eq(&'a L),
    NotEq(&'a L),
    In(Vec<&'a L>),
    NotIn(Vec<&'a L>),
    Gt(&'a L),
    Gte(&'a L),
    Lt(&'a L),
    Lte(&'a L),
}

impl<'a, L: ?Sized> Predicate<'a, L> {
    /// Absent rows satisfy only the negated forms.
    pub fn accepts_null(&self) -> bool {
        matches!(self, Predicate::NotEq(_) | Predicate::NotIn(_))
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Predicate::Gt(_) | Predicate::Gte(_) | Predicate::Lt(_) | Predicate::Lte(_)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Predicate::Eq(_) => "filter",
            Predicate::NotEq(_) => "filter_not_equal",
            Predicate::In(_) => "match",
            Predicate::NotIn(_) => "none_match",
            Predicate::Gt(_) => "greater_than",
            Predicate::Gte(_) => "greater_than_or_equal_to",
            Predicate::Lt(_) => "smaller_than",
            Predicate::Lte(_) => "smaller_than_or_equal_to",
        }
    }

    /// Evaluates the predicate for one present value. `compare` orders the
    /// value against a literal; `None` means the two are incomparable.
    pub fn test(&self, compare: impl Fn(&L) -> Option<Ordering>) -> bool {
        match self {
            Predicate::Eq(l) => compare(l) == Some(Ordering::Equal),
            Predicate::NotEq(l) => compare(l) != Some(Ordering::Equal),
            Predicate::In(ls) => ls.iter().any(|l| compare(l) == Some(Ordering::Equal)),
            Predicate::NotIn(ls) => !ls.iter().any(|l| compare(l) == Some(Ordering::Equal)),
            Predicate::Gt(l) => compare(l) == Some(Ordering::Greater),
            Predicate::Gte(l) => matches!(compare(l), Some(Ordering::Greater | Ordering::Equal)),
            Predicate::Lt(l) => compare(l) == Some(Ordering::Less),
            Predicate::Lte(l) => matches!(compare(l), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

/// Filter operations shared by every vector shape. Implementors provide
/// `select` (from scratch) and `narrow` (in place); the named operations
/// are thin wrappers.
pub trait FilterAlgebra<L: ?Sized> {
    fn select(&self, predicate: &Predicate<'_, L>) -> Result<SelectionVector, DecodeError>;

    fn narrow(
        &self,
        predicate: &Predicate<'_, L>,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError>;

    fn filter(&self, value: &L) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::Eq(value))
    }

    fn filter_selected(&self, value: &L, selection: &mut SelectionVector) -> Result<(), DecodeError> {
        self.narrow(&Predicate::Eq(value), selection)
    }

    fn filter_not_equal(&self, value: &L) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::NotEq(value))
    }

    fn filter_not_equal_selected(
        &self,
        value: &L,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        self.narrow(&Predicate::NotEq(value), selection)
    }

    fn match_values(&self, values: &[&L]) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::In(values.to_vec()))
    }

    fn match_selected(&self, values: &[&L], selection: &mut SelectionVector) -> Result<(), DecodeError> {
        self.narrow(&Predicate::In(values.to_vec()), selection)
    }

    fn none_match(&self, values: &[&L]) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::NotIn(values.to_vec()))
    }

    fn none_match_selected(
        &self,
        values: &[&L],
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        self.narrow(&Predicate::NotIn(values.to_vec()), selection)
    }

    fn greater_than(&self, value: &L) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::Gt(value))
    }

    fn greater_than_selected(
        &self,
        value: &L,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        self.narrow(&Predicate::Gt(value), selection)
    }

    fn greater_than_or_equal_to(&self, value: &L) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::Gte(value))
    }

    fn greater_than_or_equal_to_selected(
        &self,
        value: &L,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        self.narrow(&Predicate::Gte(value), selection)
    }

    fn smaller_than(&self, value: &L) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::Lt(value))
    }

    fn smaller_than_selected(
        &self,
        value: &L,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        self.narrow(&Predicate::Lt(value), selection)
    }

    fn smaller_than_or_equal_to(&self, value: &L) -> Result<SelectionVector, DecodeError> {
        self.select(&Predicate::Lte(value))
    }

    fn smaller_than_or_equal_to_selected(
        &self,
        value: &L,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        self.narrow(&Predicate::Lte(value), selection)
    }
}

/// Row-by-row selection over a flat vector.
pub(crate) fn select_rows(
    size: usize,
    nullability: &Nullability,
    accepts_null: bool,
    mut matches: impl FnMut(usize) -> bool,
) -> SelectionVector {
    (0..size)
        .filter(|&i| {
            if nullability.is_present(i) {
                matches(i)
            } else {
                accepts_null
            }
        })
        .collect()
}

pub(crate) fn narrow_rows(
    selection: &mut SelectionVector,
    nullability: &Nullability,
    accepts_null: bool,
    mut matches: impl FnMut(usize) -> bool,
) {
    selection.retain(|i| {
        if nullability.is_present(i) {
            matches(i)
        } else {
            accepts_null
        }
    });
}

/// Selection for a vector whose present rows all share one outcome `hit`.
pub(crate) fn select_uniform(
    size: usize,
    nullability: &Nullability,
    accepts_null: bool,
    hit: bool,
) -> SelectionVector {
    if hit == accepts_null || !nullability.has_nulls() {
        return if hit {
            SelectionVector::all(size)
        } else {
            SelectionVector::empty()
        };
    }
    select_rows(size, nullability, accepts_null, |_| hit)
}

pub(crate) fn narrow_uniform(
    selection: &mut SelectionVector,
    nullability: &Nullability,
    accepts_null: bool,
    hit: bool,
) {
    if hit == accepts_null || !nullability.has_nulls() {
        if !hit {
            selection.set_limit(0);
        }
        return;
    }
    narrow_rows(selection, nullability, accepts_null, |_| hit);
}

pub(crate) fn unsupported<L: ?Sized>(
    predicate: &Predicate<'_, L>,
    shape: &str,
    column: &str,
) -> DecodeError {
    DecodeError::UnsupportedOperation(format!(
        "{} on {} vector '{}'",
        predicate.name(),
        shape,
        column
    ))
}
