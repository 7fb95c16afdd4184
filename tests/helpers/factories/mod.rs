pub mod metadata_factory;
pub mod stream_factory;
pub mod tile_factory;

pub use metadata_factory::MetadataFactory;
pub use stream_factory::StreamFactory;
pub use tile_factory::TileFactory;

#[cfg(test)]
mod metadata_factory_test;
#[cfg(test)]
mod stream_factory_test;
#[cfg(test)]
mod tile_factory_test;
