use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::encoding::fastpfor::decode_fastpfor;
use crate::engine::core::encoding::varint::{decode_varints_u32, decode_varints_u64};
use crate::engine::core::encoding::zigzag::{decode_zigzag_i32, decode_zigzag_i64};
use crate::engine::core::metadata::{LogicalLevelTechnique, PhysicalLevelTechnique, StreamMetadata};
use crate::engine::core::vector::{BitVector, NumericElement, NumericVector, Nullability};
use crate::engine::errors::DecodeError;
use tracing::{debug, trace};

/// Most values one RLE stream may expand to.
pub const MAX_RLE_VALUES: usize = 1 << 24;

/// Storage shape chosen for an integer stream before its payload is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorType {
    Flat,
    Const,
    Sequence,
}

/// Vertex rescaling applied while decoding componentwise-delta streams.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaling {
    pub scale: f64,
    pub min: i32,
    pub max: i32,
}

impl Scaling {
    fn apply(&self, value: i64) -> i32 {
        let scaled = (value as f64 * self.scale).round();
        scaled.clamp(self.min as f64, self.max as f64) as i32
    }
}

/// Physical word of an integer stream.
pub trait PhysicalWord: Copy + Default + PartialEq + std::fmt::Debug {
    const BITS: u32;

    fn decode_physical(
        cursor: &mut SliceCursor<'_>,
        metadata: &StreamMetadata,
    ) -> Result<Vec<Self>, DecodeError>;

    /// Zig-zag decoded value, reinterpreted as the unsigned word.
    fn zigzag(self) -> Self;

    fn wrapping_add(self, rhs: Self) -> Self;

    fn as_usize(self) -> usize;

    fn from_u8(v: u8) -> Self;
}

impl PhysicalWord for u32 {
    const BITS: u32 = 32;

    fn decode_physical(
        cursor: &mut SliceCursor<'_>,
        metadata: &StreamMetadata,
    ) -> Result<Vec<Self>, DecodeError> {
        let start = cursor.position();
        let count = metadata.num_values as usize;
        let values = match metadata.physical_level_technique {
            PhysicalLevelTechnique::Varint => decode_varints_u32(cursor, count)?,
            PhysicalLevelTechnique::FastPfor => {
                decode_fastpfor(cursor, count, metadata.byte_length as usize)?
            }
            PhysicalLevelTechnique::None => {
                let mut out = Vec::with_capacity(count.min(cursor.remaining() / 4));
                for _ in 0..count {
                    out.push(cursor.read_u32_le()?);
                }
                out
            }
            PhysicalLevelTechnique::Alp => {
                return Err(DecodeError::UnsupportedEncoding(
                    "ALP on an integer stream".into(),
                ));
            }
        };
        seek_stream_end(cursor, start, metadata)?;
        Ok(values)
    }

    fn zigzag(self) -> Self {
        decode_zigzag_i32(self) as u32
    }

    fn wrapping_add(self, rhs: Self) -> Self {
        u32::wrapping_add(self, rhs)
    }

    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_u8(v: u8) -> Self {
        v as u32
    }
}

impl PhysicalWord for u64 {
    const BITS: u32 = 64;

    fn decode_physical(
        cursor: &mut SliceCursor<'_>,
        metadata: &StreamMetadata,
    ) -> Result<Vec<Self>, DecodeError> {
        let start = cursor.position();
        let count = metadata.num_values as usize;
        let values = match metadata.physical_level_technique {
            PhysicalLevelTechnique::Varint => decode_varints_u64(cursor, count)?,
            PhysicalLevelTechnique::None => {
                let mut out = Vec::with_capacity(count.min(cursor.remaining() / 8));
                for _ in 0..count {
                    out.push(cursor.read_u64_le()?);
                }
                out
            }
            other => {
                return Err(DecodeError::UnsupportedEncoding(format!(
                    "{:?} on a 64-bit integer stream",
                    other
                )));
            }
        };
        seek_stream_end(cursor, start, metadata)?;
        Ok(values)
    }

    fn zigzag(self) -> Self {
        decode_zigzag_i64(self) as u64
    }

    fn wrapping_add(self, rhs: Self) -> Self {
        u64::wrapping_add(self, rhs)
    }

    fn as_usize(self) -> usize {
        self as usize
    }

    fn from_u8(v: u8) -> Self {
        v as u64
    }
}

/// Leaves the cursor at `start + byte_length` whatever the payload consumed.
pub(crate) fn seek_stream_end(
    cursor: &mut SliceCursor<'_>,
    start: usize,
    metadata: &StreamMetadata,
) -> Result<(), DecodeError> {
    let end = start + metadata.byte_length as usize;
    if cursor.position() != end {
        trace!(
            consumed = cursor.position() - start,
            byte_length = metadata.byte_length,
            "Stream payload length differs from header"
        );
    }
    cursor.set_position(end)
}

/// Element type of an integer column and the word it is stored in.
pub trait IntegerElement: NumericElement {
    type Word: PhysicalWord;
    const SIGNED: bool;

    fn from_word(word: Self::Word) -> Self;
}

macro_rules! integer_element {
    ($t:ty, $word:ty, $signed:literal) => {
        impl IntegerElement for $t {
            type Word = $word;
            const SIGNED: bool = $signed;

            fn from_word(word: $word) -> Self {
                word as $t
            }
        }
    };
}

integer_element!(i32, u32, true);
integer_element!(u32, u32, false);
integer_element!(i64, u64, true);
integer_element!(u64, u64, false);

/// Picks the storage shape without consuming the payload.
pub fn vector_type<W: PhysicalWord>(
    metadata: &StreamMetadata,
    num_rows: usize,
    cursor: &SliceCursor<'_>,
) -> Result<VectorType, DecodeError> {
    let by_count = if metadata.num_values == 1 {
        VectorType::Const
    } else {
        VectorType::Flat
    };

    if metadata.logical_level_technique1 == LogicalLevelTechnique::Rle {
        return Ok(match metadata.rle {
            Some(rle) if rle.runs == 1 => VectorType::Const,
            _ => VectorType::Flat,
        });
    }

    let rle = match metadata.rle {
        Some(rle) if metadata.is_delta_rle() => rle,
        _ => return Ok(by_count),
    };
    if rle.num_rle_values as usize != num_rows {
        return Ok(VectorType::Flat);
    }
    match rle.runs {
        1 => Ok(VectorType::Sequence),
        2 => {
            let mut peek = cursor.clone();
            let values = W::decode_physical(&mut peek, metadata)?;
            // zigzag(1) == 2
            let two = W::from_u8(2);
            if values.len() >= 4 && values[2] == two && values[3] == two {
                Ok(VectorType::Sequence)
            } else {
                Ok(by_count)
            }
        }
        _ => Ok(by_count),
    }
}

fn decode_rle<W: PhysicalWord>(
    values: &[W],
    metadata: &StreamMetadata,
) -> Result<Vec<W>, DecodeError> {
    let (runs, expected) = match metadata.rle {
        Some(rle) => (rle.runs as usize, Some(rle.num_rle_values as usize)),
        None => (values.len() / 2, None),
    };
    if values.len() < runs * 2 {
        return Err(DecodeError::CorruptStream(format!(
            "RLE stream declares {} runs but holds {} values",
            runs,
            values.len()
        )));
    }
    let limit = expected.unwrap_or(MAX_RLE_VALUES);
    if limit > MAX_RLE_VALUES {
        return Err(DecodeError::CorruptStream(format!(
            "RLE stream declares {} values, limit is {}",
            limit, MAX_RLE_VALUES
        )));
    }

    let mut out = Vec::with_capacity(expected.unwrap_or(runs).min(limit));
    for (run, value) in values[..runs].iter().zip(&values[runs..runs * 2]) {
        let end = out.len().saturating_add(run.as_usize());
        if end > limit {
            return Err(DecodeError::CorruptStream(format!(
                "RLE runs expand past {} values",
                limit
            )));
        }
        out.resize(end, *value);
    }
    if let Some(expected) = expected {
        if out.len() != expected {
            return Err(DecodeError::CorruptStream(format!(
                "RLE runs expand to {} values, header says {}",
                out.len(),
                expected
            )));
        }
    }
    Ok(out)
}

fn zigzag_in_place<W: PhysicalWord>(values: &mut [W]) {
    for v in values.iter_mut() {
        *v = v.zigzag();
    }
}

fn zigzag_delta_in_place<W: PhysicalWord>(values: &mut [W]) {
    let mut acc = W::default();
    for v in values.iter_mut() {
        acc = acc.wrapping_add(v.zigzag());
        *v = acc;
    }
}

fn delta_in_place<W: PhysicalWord>(values: &mut [W]) {
    let mut acc = W::default();
    for v in values.iter_mut() {
        acc = acc.wrapping_add(*v);
        *v = acc;
    }
}

fn componentwise_delta_in_place<W: PhysicalWord>(values: &mut [W]) {
    let (mut x, mut y) = (W::default(), W::default());
    for pair in values.chunks_mut(2) {
        x = x.wrapping_add(pair[0].zigzag());
        pair[0] = x;
        if let Some(v) = pair.get_mut(1) {
            y = y.wrapping_add(v.zigzag());
            *v = y;
        }
    }
}

/// Physical plus logical decoding into raw words.
fn decode_words<W: PhysicalWord>(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
    signed: bool,
) -> Result<Vec<W>, DecodeError> {
    let mut values = W::decode_physical(cursor, metadata)?;
    use LogicalLevelTechnique as L;
    match (metadata.logical_level_technique1, metadata.logical_level_technique2) {
        (L::None, L::None) => {
            if signed {
                zigzag_in_place(&mut values);
            }
        }
        (L::Delta, L::None) => zigzag_delta_in_place(&mut values),
        (L::Delta, L::Rle) => {
            values = decode_rle(&values, metadata)?;
            zigzag_delta_in_place(&mut values);
        }
        (L::Rle, _) => {
            values = decode_rle(&values, metadata)?;
            if signed {
                zigzag_in_place(&mut values);
            }
        }
        (L::Morton, _) if W::BITS == 32 => delta_in_place(&mut values),
        (L::ComponentwiseDelta, _) if W::BITS == 32 => {
            componentwise_delta_in_place(&mut values)
        }
        (first, second) => {
            return Err(DecodeError::UnsupportedEncoding(format!(
                "{:?}/{:?} on a {}-bit stream",
                first,
                second,
                W::BITS
            )));
        }
    }
    Ok(values)
}

/// Fully materialised integer stream.
pub fn decode_integers<T: IntegerElement>(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
) -> Result<Vec<T>, DecodeError> {
    let words = decode_words::<T::Word>(cursor, metadata, T::SIGNED)?;
    Ok(words.into_iter().map(T::from_word).collect())
}

/// Value of a stream that holds a single logical value.
pub fn decode_const<T: IntegerElement>(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
) -> Result<T, DecodeError> {
    let values = T::Word::decode_physical(cursor, metadata)?;
    let word = match values.as_slice() {
        [single] => *single,
        [_, value, ..] => *value,
        [] => return Err(DecodeError::CorruptStream("empty const stream".into())),
    };
    let zigzagged =
        T::SIGNED || metadata.logical_level_technique1 == LogicalLevelTechnique::Delta;
    Ok(T::from_word(if zigzagged { word.zigzag() } else { word }))
}

/// `(base, delta)` of a delta-RLE stream describing an arithmetic sequence.
pub fn decode_sequence<T: IntegerElement>(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
) -> Result<(T, T), DecodeError> {
    let values = T::Word::decode_physical(cursor, metadata)?;
    let (base, delta) = match values.as_slice() {
        [_, delta] => (delta.zigzag(), delta.zigzag()),
        [_, _, base, delta, ..] => (base.zigzag(), delta.zigzag()),
        _ => {
            return Err(DecodeError::CorruptStream(format!(
                "sequence stream holds {} values",
                values.len()
            )));
        }
    };
    Ok((T::from_word(base), T::from_word(delta)))
}

/// Spreads one value per present row over all rows; absent rows get the default.
pub fn expand_nullable<T: Copy + Default>(
    values: Vec<T>,
    present: &BitVector,
) -> Result<Vec<T>, DecodeError> {
    if values.len() == present.size() {
        return Ok(values);
    }
    let mut source = values.into_iter();
    let mut out = Vec::with_capacity(present.size());
    for row in 0..present.size() {
        if present.get(row) {
            let value = source.next().ok_or_else(|| {
                DecodeError::CorruptStream(format!(
                    "present stream marks more rows than the data stream holds (row {})",
                    row
                ))
            })?;
            out.push(value);
        } else {
            out.push(T::default());
        }
    }
    Ok(out)
}

/// Decodes a data stream into the cheapest numeric vector shape.
pub fn decode_integer_vector<T: IntegerElement>(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
    name: &str,
    num_rows: usize,
    present: Option<BitVector>,
) -> Result<NumericVector<T>, DecodeError> {
    let shape = vector_type::<T::Word>(metadata, num_rows, cursor)?;
    debug!(target: "mlt_decoder::column", column = name, ?shape, "Integer column shape");
    let nullability = Nullability::new(present);
    match shape {
        VectorType::Const => {
            let value = decode_const::<T>(cursor, metadata)?;
            Ok(NumericVector::constant(name, num_rows, value, nullability))
        }
        VectorType::Sequence => {
            let (base, delta) = decode_sequence::<T>(cursor, metadata)?;
            Ok(NumericVector::sequence(name, num_rows, base, delta, nullability))
        }
        VectorType::Flat => {
            let mut values = decode_integers::<T>(cursor, metadata)?;
            if let Some(present) = nullability.present() {
                values = expand_nullable(values, present)?;
            }
            Ok(NumericVector::flat(name, values, nullability))
        }
    }
}

/// Turns a length stream into an offset buffer starting at zero.
pub fn decode_length_stream_to_offsets(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
) -> Result<Vec<u32>, DecodeError> {
    let lengths = decode_integers::<u32>(cursor, metadata)?;
    Ok(lengths_to_offsets(&lengths))
}

pub fn lengths_to_offsets(lengths: &[u32]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(lengths.len() + 1);
    let mut acc = 0u32;
    offsets.push(acc);
    for &len in lengths {
        acc = acc.wrapping_add(len);
        offsets.push(acc);
    }
    offsets
}

/// Vertex stream with optional rescaling of componentwise-delta coordinates.
pub fn decode_vertices(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
    scaling: Option<Scaling>,
) -> Result<Vec<i32>, DecodeError> {
    let Some(scaling) = scaling.filter(|_| {
        metadata.logical_level_technique1 == LogicalLevelTechnique::ComponentwiseDelta
    }) else {
        return decode_integers::<i32>(cursor, metadata);
    };

    let words = u32::decode_physical(cursor, metadata)?;
    let (mut x, mut y) = (0i64, 0i64);
    let mut out = Vec::with_capacity(words.len());
    for pair in words.chunks(2) {
        x += decode_zigzag_i32(pair[0]) as i64;
        out.push(scaling.apply(x));
        if let Some(&w) = pair.get(1) {
            y += decode_zigzag_i32(w) as i64;
            out.push(scaling.apply(y));
        }
    }
    Ok(out)
}

pub fn decode_f32_stream(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
) -> Result<Vec<f32>, DecodeError> {
    let start = cursor.position();
    let mut out = Vec::with_capacity((metadata.num_values as usize).min(cursor.remaining() / 4));
    for _ in 0..metadata.num_values {
        out.push(cursor.read_f32_le()?);
    }
    seek_stream_end(cursor, start, metadata)?;
    Ok(out)
}

pub fn decode_f64_stream(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
) -> Result<Vec<f64>, DecodeError> {
    let start = cursor.position();
    let mut out = Vec::with_capacity((metadata.num_values as usize).min(cursor.remaining() / 8));
    for _ in 0..metadata.num_values {
        out.push(cursor.read_f64_le()?);
    }
    seek_stream_end(cursor, start, metadata)?;
    Ok(out)
}
