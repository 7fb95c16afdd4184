use super::slice_cursor::SliceCursor;
use crate::engine::errors::DecodeError;
use integer_encoding::VarInt;

/// Decodes one varint of at most `bits` significant bits at the cursor and
/// advances past it. Encodings longer than `ceil(bits / 7)` bytes overflow.
fn read_varint(cursor: &mut SliceCursor<'_>, bits: u32) -> Result<u64, DecodeError> {
    let max_len = (bits as usize).div_ceil(7);
    let window = cursor.clone().read_bytes(cursor.remaining().min(max_len))?;
    let Some((value, size)) = u64::decode_var(window) else {
        return Err(if window.len() < max_len {
            DecodeError::UnexpectedEof {
                offset: cursor.position() + window.len(),
                needed: 1,
            }
        } else {
            DecodeError::VarintOverflow(bits)
        });
    };
    // The last byte of a full-length encoding may only fill the top bits.
    let spare = bits as usize - 7 * (max_len - 1);
    if size == max_len && u32::from(window[size - 1]) >> spare != 0 {
        return Err(DecodeError::VarintOverflow(bits));
    }
    cursor.advance(size)?;
    Ok(value)
}

/// Reads one LEB128 varint of at most 32 significant bits.
pub fn decode_varint_u32(cursor: &mut SliceCursor<'_>) -> Result<u32, DecodeError> {
    read_varint(cursor, 32).map(|v| v as u32)
}

pub fn decode_varint_u64(cursor: &mut SliceCursor<'_>) -> Result<u64, DecodeError> {
    read_varint(cursor, 64)
}

pub fn decode_varints_u32(
    cursor: &mut SliceCursor<'_>,
    count: usize,
) -> Result<Vec<u32>, DecodeError> {
    let mut out = Vec::with_capacity(count.min(cursor.remaining()));
    for _ in 0..count {
        out.push(decode_varint_u32(cursor)?);
    }
    Ok(out)
}

pub fn decode_varints_u64(
    cursor: &mut SliceCursor<'_>,
    count: usize,
) -> Result<Vec<u64>, DecodeError> {
    let mut out = Vec::with_capacity(count.min(cursor.remaining()));
    for _ in 0..count {
        out.push(decode_varint_u64(cursor)?);
    }
    Ok(out)
}

/// Reads a varint that is used as a length or count.
pub fn decode_varint_usize(cursor: &mut SliceCursor<'_>) -> Result<usize, DecodeError> {
    decode_varint_u32(cursor).map(|v| v as usize)
}
