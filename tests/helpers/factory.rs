pub use super::factories::{MetadataFactory, StreamFactory, TileFactory};
use crate::engine::core::metadata::{DictionaryType, LengthType, OffsetType};

pub struct Factory;

impl Factory {
    pub fn present_stream() -> StreamFactory {
        StreamFactory::present()
    }

    pub fn data_stream(dictionary_type: DictionaryType) -> StreamFactory {
        StreamFactory::data(dictionary_type)
    }

    pub fn offset_stream(offset_type: OffsetType) -> StreamFactory {
        StreamFactory::offset(offset_type)
    }

    pub fn length_stream(length_type: LengthType) -> StreamFactory {
        StreamFactory::length(length_type)
    }

    pub fn tile() -> TileFactory {
        TileFactory::new()
    }

    pub fn metadata() -> MetadataFactory {
        MetadataFactory::new()
    }
}
