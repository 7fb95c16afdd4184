use crate::engine::core::metadata::{
    DictionaryType, LengthType, LogicalLevelTechnique, OffsetType, PhysicalLevelTechnique,
    PhysicalStreamType,
};

pub fn encode_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

pub fn zigzag_i32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

pub fn zigzag_i64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Byte-RLE literal blocks (at most 128 bytes each).
pub fn encode_byte_rle_literals(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in bytes.chunks(128) {
        out.push((256 - chunk.len()) as u8);
        out.extend_from_slice(chunk);
    }
    out
}

/// Builds one encoded stream: metadata header followed by its payload.
pub struct StreamFactory {
    physical_stream_type: PhysicalStreamType,
    logical_nibble: u8,
    technique1: LogicalLevelTechnique,
    technique2: LogicalLevelTechnique,
    physical_technique: PhysicalLevelTechnique,
    num_values: u32,
    rle: Option<(u32, u32)>,
    morton: Option<(u32, u32)>,
    payload: Vec<u8>,
}

impl StreamFactory {
    fn new(physical_stream_type: PhysicalStreamType, logical_nibble: u8) -> Self {
        Self {
            physical_stream_type,
            logical_nibble,
            technique1: LogicalLevelTechnique::None,
            technique2: LogicalLevelTechnique::None,
            physical_technique: PhysicalLevelTechnique::Varint,
            num_values: 0,
            rle: None,
            morton: None,
            payload: Vec::new(),
        }
    }

    pub fn present() -> Self {
        Self::new(PhysicalStreamType::Present, 0)
    }

    pub fn data(dictionary_type: DictionaryType) -> Self {
        Self::new(PhysicalStreamType::Data, dictionary_type.into())
    }

    pub fn offset(offset_type: OffsetType) -> Self {
        Self::new(PhysicalStreamType::Offset, offset_type.into())
    }

    pub fn length(length_type: LengthType) -> Self {
        Self::new(PhysicalStreamType::Length, length_type.into())
    }

    pub fn with_logical(
        mut self,
        technique1: LogicalLevelTechnique,
        technique2: LogicalLevelTechnique,
    ) -> Self {
        self.technique1 = technique1;
        self.technique2 = technique2;
        self
    }

    pub fn with_physical(mut self, technique: PhysicalLevelTechnique) -> Self {
        self.physical_technique = technique;
        self
    }

    pub fn with_rle(mut self, runs: u32, num_rle_values: u32) -> Self {
        self.rle = Some((runs, num_rle_values));
        self
    }

    pub fn with_morton(mut self, num_bits: u32, coordinate_shift: u32) -> Self {
        self.technique1 = LogicalLevelTechnique::Morton;
        self.morton = Some((num_bits, coordinate_shift));
        self
    }

    pub fn with_varints(mut self, values: &[u32]) -> Self {
        self.physical_technique = PhysicalLevelTechnique::Varint;
        self.num_values = values.len() as u32;
        self.payload.clear();
        for &v in values {
            encode_varint(&mut self.payload, v as u64);
        }
        self
    }

    pub fn with_signed_varints(self, values: &[i32]) -> Self {
        let encoded: Vec<u32> = values.iter().map(|&v| zigzag_i32(v)).collect();
        self.with_varints(&encoded)
    }

    pub fn with_varints_u64(mut self, values: &[u64]) -> Self {
        self.physical_technique = PhysicalLevelTechnique::Varint;
        self.num_values = values.len() as u32;
        self.payload.clear();
        for &v in values {
            encode_varint(&mut self.payload, v);
        }
        self
    }

    /// Raw payload; `num_values` is written to the header as given.
    pub fn with_bytes(mut self, bytes: &[u8], num_values: u32) -> Self {
        self.physical_technique = PhysicalLevelTechnique::None;
        self.num_values = num_values;
        self.payload = bytes.to_vec();
        self
    }

    /// LSB-first bitmap written as byte-RLE literals.
    pub fn with_booleans(mut self, bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        self.technique1 = LogicalLevelTechnique::Rle;
        self.physical_technique = PhysicalLevelTechnique::None;
        self.num_values = bits.len() as u32;
        self.payload = encode_byte_rle_literals(&bytes);
        self
    }

    pub fn create(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 16);
        out.push((u8::from(self.physical_stream_type) << 4) | self.logical_nibble);
        out.push(
            (u8::from(self.technique1) << 5)
                | (u8::from(self.technique2) << 2)
                | u8::from(self.physical_technique),
        );
        encode_varint(&mut out, self.num_values as u64);
        encode_varint(&mut out, self.payload.len() as u64);

        let rle_encoded = (self.technique1 == LogicalLevelTechnique::Rle
            || self.technique2 == LogicalLevelTechnique::Rle)
            && self.physical_technique != PhysicalLevelTechnique::None;
        if self.technique1 == LogicalLevelTechnique::Morton {
            let (bits, shift) = self.morton.unwrap_or((16, 0));
            encode_varint(&mut out, bits as u64);
            encode_varint(&mut out, shift as u64);
        } else if rle_encoded {
            let (runs, values) = self.rle.unwrap_or((0, 0));
            encode_varint(&mut out, runs as u64);
            encode_varint(&mut out, values as u64);
        }
        out.extend_from_slice(&self.payload);
        out
    }
}
