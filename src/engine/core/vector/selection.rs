/// Row indices produced by a filter, with a logical `limit` that can shrink
/// below the physical capacity. Narrowing is always stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionVector {
    indices: Vec<u32>,
    limit: usize,
}

impl SelectionVector {
    pub fn new(indices: Vec<u32>) -> Self {
        let limit = indices.len();
        Self { indices, limit }
    }

    /// Selects every row in `0..size`.
    pub fn all(size: usize) -> Self {
        Self::new((0..size as u32).collect())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Clamped to the capacity; the limit never exceeds the stored indices.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.min(self.indices.len());
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.limit == 0
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.indices[..self.limit]
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.as_slice().iter().map(|&i| i as usize)
    }

    /// In-place compaction of the valid prefix, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(usize) -> bool) {
        let mut write = 0;
        for read in 0..self.limit {
            let index = self.indices[read];
            if keep(index as usize) {
                self.indices[write] = index;
                write += 1;
            }
        }
        self.limit = write;
    }
}

impl FromIterator<usize> for SelectionVector {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|i| i as u32).collect())
    }
}
