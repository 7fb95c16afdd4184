pub mod column;
pub mod encoding;
pub mod filter;
pub mod metadata;
pub mod vector;
