use crate::engine::core::vector::bit_vector::BitVector;

/// Present mask shared by every vector shape. `None` means all rows present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Nullability {
    present: Option<BitVector>,
}

impl Nullability {
    pub fn new(present: Option<BitVector>) -> Self {
        Self { present }
    }

    pub fn all_present() -> Self {
        Self { present: None }
    }

    #[inline]
    pub fn is_present(&self, index: usize) -> bool {
        match &self.present {
            Some(bits) => bits.get(index),
            None => true,
        }
    }

    pub fn has_nulls(&self) -> bool {
        self.present.is_some()
    }

    pub fn present(&self) -> Option<&BitVector> {
        self.present.as_ref()
    }
}
