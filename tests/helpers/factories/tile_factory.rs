use super::stream_factory::{encode_varint, zigzag_i32};

/// Varint stream count followed by the encoded streams.
pub fn encode_column(streams: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(&mut out, streams.len() as u64);
    for stream in streams {
        out.extend_from_slice(stream);
    }
    out
}

struct TableBlock {
    id: u32,
    extent: u32,
    num_features: u32,
    body: Vec<u8>,
}

/// Concatenates feature table blocks into a tile buffer.
pub struct TileFactory {
    version: u8,
    tables: Vec<TableBlock>,
}

impl TileFactory {
    pub fn new() -> Self {
        Self {
            version: 1,
            tables: Vec::new(),
        }
    }

    /// `columns` are already encoded with [`encode_column`] (or by hand for
    /// struct columns), in schema order.
    pub fn with_table(
        mut self,
        id: u32,
        extent: u32,
        num_features: u32,
        columns: Vec<Vec<u8>>,
    ) -> Self {
        self.tables.push(TableBlock {
            id,
            extent,
            num_features,
            body: columns.concat(),
        });
        self
    }

    pub fn create(self) -> Vec<u8> {
        let mut out = Vec::new();
        for table in self.tables {
            out.push(self.version);
            encode_varint(&mut out, table.id as u64);
            encode_varint(&mut out, table.body.len() as u64);
            encode_varint(&mut out, table.extent as u64);
            encode_varint(&mut out, zigzag_i32(table.extent as i32) as u64);
            encode_varint(&mut out, table.num_features as u64);
            out.extend_from_slice(&table.body);
        }
        out
    }
}
