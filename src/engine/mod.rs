pub mod core;
pub mod errors;
pub mod tile;

pub use errors::*;
