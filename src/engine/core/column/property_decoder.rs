use crate::engine::core::column::bit_stream::decode_bit_stream;
use crate::engine::core::column::integer_stream::{
    decode_f32_stream, decode_f64_stream, decode_integer_vector, expand_nullable,
};
use crate::engine::core::column::string_decoder::{decode_shared_dictionary, decode_string_column};
use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::metadata::StreamMetadata;
use crate::engine::core::metadata::stream_metadata::skip_column;
use crate::engine::core::metadata::tileset::{Column, ColumnKind, ComplexType, ScalarType};
use crate::engine::core::vector::{
    BitVector, BooleanVector, NumericElement, NumericVector, Nullability, Vector,
};
use crate::engine::errors::DecodeError;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Decodes one property column. An empty result means the column is absent
/// from this table or was pruned by `column_filter`.
pub fn decode_property_column(
    cursor: &mut SliceCursor<'_>,
    column: &Column,
    num_streams: usize,
    num_rows: usize,
    column_filter: Option<&HashSet<String>>,
) -> Result<Vec<Vector>, DecodeError> {
    match column.kind() {
        ColumnKind::Scalar(scalar_type) => {
            if column_filter.is_some_and(|wanted| !wanted.contains(&column.name)) {
                debug!(target: "mlt_decoder::column", column = %column.name, "Skipping pruned column");
                skip_column(cursor, num_streams)?;
                return Ok(Vec::new());
            }
            if num_streams == 0 {
                return Ok(Vec::new());
            }
            decode_scalar_column(cursor, column, scalar_type, num_streams, num_rows)
                .map(|vector| vec![vector])
        }
        ColumnKind::Complex(Some(ComplexType::Struct)) => match num_streams {
            0 => Ok(Vec::new()),
            1 => Ok(decode_shared_dictionary(cursor, column, column_filter)?
                .into_iter()
                .map(Vector::String)
                .collect()),
            n => Err(DecodeError::UnsupportedScalarType {
                column: column.name.clone(),
                detail: format!("struct column declares {} stream groups", n),
            }),
        },
        other => Err(DecodeError::UnsupportedScalarType {
            column: column.name.clone(),
            detail: format!("{:?}", other),
        }),
    }
}

fn decode_scalar_column(
    cursor: &mut SliceCursor<'_>,
    column: &Column,
    scalar_type: ScalarType,
    num_streams: usize,
    num_rows: usize,
) -> Result<Vector, DecodeError> {
    let present = if column.nullable {
        let metadata = StreamMetadata::decode(cursor)?;
        Some(decode_bit_stream(cursor, &metadata)?)
    } else {
        None
    };
    let data_streams = num_streams - usize::from(column.nullable);
    let name = column.name.as_str();

    if scalar_type == ScalarType::String {
        return decode_string_column(cursor, name, data_streams, present).map(Vector::String);
    }
    if data_streams == 0 {
        return Err(DecodeError::CorruptStream(format!(
            "column '{}' has no data stream",
            name
        )));
    }

    let metadata = StreamMetadata::decode(cursor)?;
    let vector = decode_data_stream(cursor, &metadata, scalar_type, name, num_rows, present)?;

    for _ in 1..data_streams {
        let extra = StreamMetadata::decode(cursor)?;
        warn!(
            target: "mlt_decoder::column",
            column = name,
            physical = ?extra.physical_stream_type,
            "Skipping unexpected stream"
        );
        extra.skip_payload(cursor)?;
    }
    Ok(vector)
}

fn decode_data_stream(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
    scalar_type: ScalarType,
    name: &str,
    num_rows: usize,
    present: Option<BitVector>,
) -> Result<Vector, DecodeError> {
    Ok(match scalar_type {
        ScalarType::Int8 | ScalarType::Int32 => Vector::Int(decode_integer_vector(
            cursor, metadata, name, num_rows, present,
        )?),
        ScalarType::Uint8 | ScalarType::Uint32 => Vector::UInt(decode_integer_vector(
            cursor, metadata, name, num_rows, present,
        )?),
        ScalarType::Int64 => Vector::Long(decode_integer_vector(
            cursor, metadata, name, num_rows, present,
        )?),
        ScalarType::Uint64 => Vector::ULong(decode_integer_vector(
            cursor, metadata, name, num_rows, present,
        )?),
        ScalarType::Float => {
            let values = decode_f32_stream(cursor, metadata)?;
            Vector::Float(float_column(name, values, present)?)
        }
        ScalarType::Double => {
            let values = decode_f64_stream(cursor, metadata)?;
            Vector::Double(float_column(name, values, present)?)
        }
        ScalarType::Boolean => {
            let mut values = decode_bit_stream(cursor, metadata)?;
            if let Some(present) = &present {
                if values.size() != present.size() {
                    let bits: Vec<bool> = (0..values.size()).map(|i| values.get(i)).collect();
                    values = BitVector::from_bools(&expand_nullable(bits, present)?);
                }
            }
            Vector::Boolean(BooleanVector::new(name, values, Nullability::new(present)))
        }
        ScalarType::String => {
            return Err(DecodeError::UnsupportedScalarType {
                column: name.to_string(),
                detail: "string data outside a string column".into(),
            });
        }
    })
}

fn float_column<T: NumericElement>(
    name: &str,
    values: Vec<T>,
    present: Option<BitVector>,
) -> Result<NumericVector<T>, DecodeError> {
    let values = match &present {
        Some(present) => expand_nullable(values, present)?,
        None => values,
    };
    Ok(NumericVector::flat(name, values, Nullability::new(present)))
}
