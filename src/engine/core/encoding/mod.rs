pub mod byte_rle;
pub mod fastpfor;
pub mod fsst;
pub mod morton;
pub mod slice_cursor;
pub mod varint;
pub mod zigzag;

pub use slice_cursor::SliceCursor;

#[cfg(test)]
mod byte_rle_test;
#[cfg(test)]
mod morton_test;
