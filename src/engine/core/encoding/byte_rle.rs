use super::slice_cursor::SliceCursor;
use crate::engine::errors::DecodeError;

const MIN_REPEAT: usize = 3;
/// Longest expansion of a two-byte run, halved per input byte.
const MAX_BYTES_PER_INPUT: usize = (0x7f + MIN_REPEAT).div_ceil(2);

/// Byte run-length decoding as used by boolean and present streams.
///
/// A control byte `<= 0x7f` introduces a run of `control + 3` copies of the
/// following byte; any other control byte introduces `256 - control` literal
/// bytes. Decoding stops once `num_bytes` have been produced.
pub fn decode_byte_rle(
    cursor: &mut SliceCursor<'_>,
    num_bytes: usize,
) -> Result<Vec<u8>, DecodeError> {
    let mut out =
        Vec::with_capacity(num_bytes.min(cursor.remaining().saturating_mul(MAX_BYTES_PER_INPUT)));
    while out.len() < num_bytes {
        let control = cursor.read_u8()?;
        let wanted = num_bytes - out.len();
        if control <= 0x7f {
            let run = control as usize + MIN_REPEAT;
            let value = cursor.read_u8()?;
            out.resize(out.len() + run.min(wanted), value);
        } else {
            let literals = 256 - control as usize;
            let bytes = cursor.read_bytes(literals)?;
            out.extend_from_slice(&bytes[..literals.min(wanted)]);
        }
    }
    Ok(out)
}

#[inline]
pub fn bytes_for_bits(num_bits: usize) -> usize {
    num_bits.div_ceil(8)
}
