use crate::engine::errors::DecodeError;

pub const ESCAPE: u8 = 255;

/// Expands FSST-compressed bytes against a static symbol table.
///
/// `symbols` is the concatenation of every symbol, `symbol_lengths[s]` the
/// length of symbol `s`. Byte 255 escapes the next byte as a literal.
pub fn decode_fsst(
    symbols: &[u8],
    symbol_lengths: &[u32],
    compressed: &[u8],
) -> Result<Vec<u8>, DecodeError> {
    let mut symbol_offsets = Vec::with_capacity(symbol_lengths.len());
    let mut acc = 0usize;
    for &len in symbol_lengths {
        symbol_offsets.push(acc);
        acc += len as usize;
    }
    if acc > symbols.len() {
        return Err(DecodeError::CorruptStream(format!(
            "FSST symbol lengths cover {} bytes but table holds {}",
            acc,
            symbols.len()
        )));
    }

    let mut out = Vec::with_capacity(compressed.len().saturating_mul(2));
    let mut i = 0;
    while i < compressed.len() {
        let code = compressed[i];
        if code == ESCAPE {
            let literal = compressed.get(i + 1).ok_or_else(|| {
                DecodeError::CorruptStream("FSST escape at end of input".into())
            })?;
            out.push(*literal);
            i += 2;
            continue;
        }

        let s = code as usize;
        let (Some(&start), Some(&len)) = (symbol_offsets.get(s), symbol_lengths.get(s)) else {
            return Err(DecodeError::CorruptStream(format!(
                "FSST symbol {} outside table of {} symbols",
                s,
                symbol_lengths.len()
            )));
        };
        out.extend_from_slice(&symbols[start..start + len as usize]);
        i += 1;
    }
    Ok(out)
}
