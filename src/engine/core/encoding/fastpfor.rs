use super::slice_cursor::SliceCursor;
use crate::engine::errors::DecodeError;
use fastpfor::cpp::{Codec32 as _, FastPFor256Codec};
use tracing::trace;

const BLOCK_SIZE: usize = 256;
/// Fewest values a single metadata byte can account for in a page.
const VALUES_PER_BYTE: usize = BLOCK_SIZE / 2;
/// Zero words appended behind the stream. The codec may read ahead while
/// unpacking exception arrays; zero bytes never finish a VariableByte value.
const READ_AHEAD_WORDS: usize = 33;

/// Decodes a FastPFOR + VariableByte composition.
///
/// The stream is `byte_length` bytes of big-endian 32-bit words. Word 0 holds
/// the number of values covered by FastPFOR pages (a multiple of 256); the
/// remaining values are VariableByte coded in the words that follow the pages.
/// Both counts are checked against the stream size before any buffer is
/// sized from them.
pub fn decode_fastpfor(
    cursor: &mut SliceCursor<'_>,
    num_values: usize,
    byte_length: usize,
) -> Result<Vec<u32>, DecodeError> {
    let bytes = cursor.read_bytes(byte_length)?;
    if num_values == 0 {
        return Ok(Vec::new());
    }
    let mut words: Vec<u32> = bytes
        .chunks(4)
        .map(|chunk| {
            let mut b = [0u8; 4];
            b[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(b)
        })
        .collect();
    let Some(&packed_len) = words.first() else {
        return Err(DecodeError::CorruptStream(
            "empty FastPFOR stream with values declared".into(),
        ));
    };
    let packed_len = packed_len as usize;
    check_counts(packed_len, num_values, byte_length)?;

    words.resize(words.len() + READ_AHEAD_WORDS, 0);
    let mut out = vec![0u32; num_values + words.len() * 4];
    let decoded = FastPFor256Codec::new().decode32(&words, &mut out)?.len();
    if decoded < num_values {
        return Err(DecodeError::CorruptStream(format!(
            "FastPFOR stream produced {} of {} values",
            decoded, num_values
        )));
    }
    trace!(packed = packed_len, rest = num_values - packed_len, "decoded FastPFOR pages");

    out.truncate(num_values);
    Ok(out)
}

/// Every 256-value block costs at least two metadata bytes and every
/// VariableByte value at least one byte.
fn check_counts(packed_len: usize, num_values: usize, byte_length: usize) -> Result<(), DecodeError> {
    if packed_len > num_values || packed_len % BLOCK_SIZE != 0 {
        return Err(DecodeError::CorruptStream(format!(
            "FastPFOR header declares {} values of {}",
            packed_len, num_values
        )));
    }
    let packed_fits = packed_len / VALUES_PER_BYTE <= byte_length;
    let tail_fits = num_values - packed_len <= byte_length;
    if !packed_fits || !tail_fits {
        return Err(DecodeError::CorruptStream(format!(
            "FastPFOR stream of {} bytes cannot hold {} values",
            byte_length, num_values
        )));
    }
    Ok(())
}
