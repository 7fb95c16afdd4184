pub mod stream_metadata;
pub mod stream_types;
pub mod tileset;

pub use stream_metadata::{RleInfo, StreamMetadata};
pub use stream_types::{
    DictionaryType, LengthType, LogicalLevelTechnique, LogicalStreamType, OffsetType,
    PhysicalLevelTechnique, PhysicalStreamType,
};
