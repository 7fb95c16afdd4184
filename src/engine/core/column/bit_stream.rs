use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::encoding::byte_rle::{bytes_for_bits, decode_byte_rle};
use crate::engine::core::metadata::StreamMetadata;
use crate::engine::core::vector::BitVector;
use crate::engine::errors::DecodeError;

/// Decodes a byte-RLE bitmap (present or boolean stream) of `num_values` bits.
pub fn decode_bit_stream(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
) -> Result<BitVector, DecodeError> {
    let start = cursor.position();
    let num_bits = metadata.num_values as usize;
    let bytes = decode_byte_rle(cursor, bytes_for_bits(num_bits))?;
    cursor.set_position(start + metadata.byte_length as usize)?;
    Ok(BitVector::new(bytes, num_bits))
}
