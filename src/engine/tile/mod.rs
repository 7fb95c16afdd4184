pub mod decoder;
pub mod feature_table;

pub use decoder::{
    BlockHeader, DecodeOptions, RescaleConfig, decode_feature_table, decode_tile, decode_tiles,
};
pub use feature_table::{Feature, FeatureTable, Features, MAX_SAFE_INTEGER};
