pub mod bit_stream;
pub mod geometry_decoder;
pub mod integer_stream;
pub mod property_decoder;
pub mod string_decoder;

pub use geometry_decoder::decode_geometry_column;
pub use integer_stream::{Scaling, VectorType};
pub use property_decoder::decode_property_column;

#[cfg(test)]
mod bit_stream_test;
#[cfg(test)]
mod string_decoder_test;
