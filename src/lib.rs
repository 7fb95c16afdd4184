pub mod engine;
pub mod logging;
pub mod shared;

pub use engine::core::filter::{FilterExpression, filter_feature_table};
pub use engine::core::metadata::tileset::{TileSetMetadata, decode_metadata};
pub use engine::errors::DecodeError;
pub use engine::tile::{DecodeOptions, FeatureTable, RescaleConfig, decode_tile, decode_tiles};

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
