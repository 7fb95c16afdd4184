/// Bit-packed booleans backing present streams and boolean columns.
///
/// Bit `i` lives in byte `i / 8` at bit position `i % 8` (LSB first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitVector {
    bytes: Vec<u8>,
    size: usize,
}

impl BitVector {
    pub fn new(bytes: Vec<u8>, size: usize) -> Self {
        let size = size.min(bytes.len() * 8);
        Self { bytes, size }
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (i, bit) in bits.iter().enumerate() {
            if *bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Self {
            bytes,
            size: bits.len(),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < self.size && (self.bytes[index / 8] >> (index % 8)) & 1 == 1
    }

    pub fn set(&mut self, index: usize, value: bool) {
        if index >= self.size {
            return;
        }
        if value {
            self.bytes[index / 8] |= 1 << (index % 8);
        } else {
            self.bytes[index / 8] &= !(1 << (index % 8));
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn count_ones(&self) -> usize {
        (0..self.size).filter(|&i| self.get(i)).count()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
