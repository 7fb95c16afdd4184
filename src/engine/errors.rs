use thiserror::Error;
use tracing::{debug, error};

/// Errors raised while decoding a tile. Every variant aborts the current
/// decode call; no partial feature tables are returned.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid {kind} tag: {value}")]
    InvalidStreamTag { kind: &'static str, value: u32 },

    #[error("Unsupported scalar type for column '{column}': {detail}")]
    UnsupportedScalarType { column: String, detail: String },

    #[error("Dictionary index {index} out of range for dictionary of {size} entries")]
    CorruptDictionaryIndex { index: u32, size: usize },

    #[error("No feature table metadata for table id {0}")]
    MissingTableMetadata(u32),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Unexpected end of buffer at offset {offset} (needed {needed} bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("Varint exceeds {0} bits")]
    VarintOverflow(u32),

    #[error("Corrupt stream: {0}")]
    CorruptStream(String),

    #[error("Invalid filter expression: {0}")]
    InvalidFilter(String),

    #[error("Tileset metadata decode failed: {0}")]
    Metadata(#[from] prost::DecodeError),

    #[error("FastPFOR codec failed: {0}")]
    FastPfor(#[from] fastpfor::cpp::Exception),
}

impl DecodeError {
    pub fn log_error(&self) {
        match self {
            DecodeError::InvalidStreamTag { kind, value } => {
                error!("Invalid stream tag: {} = {}", kind, value);
                debug!("Stream metadata rejected; the tile is unusable");
            }
            DecodeError::UnsupportedScalarType { column, detail } => {
                error!("Unsupported scalar type in column '{}'", column);
                debug!("Scalar type details: {}", detail);
            }
            DecodeError::CorruptDictionaryIndex { index, size } => {
                error!("Corrupt dictionary index: {}", index);
                debug!("Dictionary holds {} entries", size);
            }
            DecodeError::MissingTableMetadata(id) => {
                error!("Missing feature table metadata for id {}", id);
                debug!("Tileset metadata does not declare table {}", id);
            }
            DecodeError::UnsupportedOperation(e) => {
                error!("Unsupported operation: {}", e);
                debug!("Unsupported operation details: {:?}", e);
            }
            DecodeError::UnsupportedEncoding(e) => {
                error!("Unsupported encoding: {}", e);
                debug!("Unsupported encoding details: {:?}", e);
            }
            DecodeError::UnexpectedEof { offset, needed } => {
                error!("Unexpected end of tile buffer at offset {}", offset);
                debug!("Read of {} bytes overran the buffer", needed);
            }
            DecodeError::VarintOverflow(bits) => {
                error!("Varint overflow");
                debug!("Varint longer than {} bits", bits);
            }
            DecodeError::CorruptStream(e) => {
                error!("Corrupt stream: {}", e);
                debug!("Corrupt stream details: {:?}", e);
            }
            DecodeError::InvalidFilter(e) => {
                error!("Invalid filter expression: {}", e);
                debug!("Filter parse details: {:?}", e);
            }
            DecodeError::Metadata(e) => {
                error!("Tileset metadata decode failed: {}", e);
                debug!("Protobuf error details: {:?}", e);
            }
            DecodeError::FastPfor(e) => {
                error!("FastPFOR codec failed: {}", e);
                debug!("Codec exception details: {:?}", e);
            }
        }
    }
}
