use crate::engine::core::vector::algebra::{
    FilterAlgebra, Predicate, narrow_rows, select_rows, unsupported,
};
use crate::engine::core::vector::bit_vector::BitVector;
use crate::engine::core::vector::nullability::Nullability;
use crate::engine::core::vector::selection::SelectionVector;
use crate::engine::errors::DecodeError;

#[derive(Clone, Debug, PartialEq)]
pub struct BooleanVector {
    name: String,
    nullability: Nullability,
    values: BitVector,
}

impl BooleanVector {
    pub fn new(name: impl Into<String>, values: BitVector, nullability: Nullability) -> Self {
        Self {
            name: name.into(),
            nullability,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.values.size()
    }

    pub fn nullability(&self) -> &Nullability {
        &self.nullability
    }

    pub fn is_present(&self, index: usize) -> bool {
        index < self.size() && self.nullability.is_present(index)
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.is_present(index).then(|| self.values.get(index))
    }
}

impl FilterAlgebra<bool> for BooleanVector {
    fn select(&self, predicate: &Predicate<'_, bool>) -> Result<SelectionVector, DecodeError> {
        if predicate.is_ordering() {
            return Err(unsupported(predicate, "boolean", &self.name));
        }
        Ok(select_rows(
            self.size(),
            &self.nullability,
            predicate.accepts_null(),
            |i| predicate.test(|l| Some(self.values.get(i).cmp(l))),
        ))
    }

    fn narrow(
        &self,
        predicate: &Predicate<'_, bool>,
        selection: &mut SelectionVector,
    ) -> Result<(), DecodeError> {
        if predicate.is_ordering() {
            return Err(unsupported(predicate, "boolean", &self.name));
        }
        let size = self.size();
        narrow_rows(selection, &self.nullability, predicate.accepts_null(), |i| {
            i < size && predicate.test(|l| Some(self.values.get(i).cmp(l)))
        });
        Ok(())
    }
}
