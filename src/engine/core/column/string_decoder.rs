use crate::engine::core::column::bit_stream::decode_bit_stream;
use crate::engine::core::column::integer_stream::{decode_integers, expand_nullable, lengths_to_offsets};
use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::encoding::varint::decode_varint_usize;
use crate::engine::core::metadata::stream_metadata::skip_column;
use crate::engine::core::metadata::tileset::{Column, ScalarType};
use crate::engine::core::metadata::{
    DictionaryType, LengthType, LogicalStreamType, PhysicalStreamType, StreamMetadata,
};
use crate::engine::core::vector::{BitVector, Dictionary, Nullability, StringVector};
use crate::engine::errors::DecodeError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

pub const CHILD_SEPARATOR: char = ':';
pub const DEFAULT_CHILD: &str = "default";

/// Streams collected while walking a string column.
#[derive(Default)]
struct StringStreams<'a> {
    indices: Option<Vec<u32>>,
    lengths: Option<Vec<u32>>,
    dictionary_lengths: Option<Vec<u32>>,
    symbol_lengths: Option<Vec<u32>>,
    data: Option<&'a [u8]>,
    dictionary: Option<&'a [u8]>,
    symbols: Option<&'a [u8]>,
}

impl<'a> StringStreams<'a> {
    /// Reads one stream; returns true when it was a shared dictionary data stream.
    fn read(
        &mut self,
        cursor: &mut SliceCursor<'a>,
        metadata: &StreamMetadata,
    ) -> Result<bool, DecodeError> {
        match (metadata.physical_stream_type, metadata.logical_stream_type) {
            (PhysicalStreamType::Offset, _) => {
                self.indices = Some(decode_integers::<u32>(cursor, metadata)?);
            }
            (PhysicalStreamType::Length, LogicalStreamType::Length(length_type)) => {
                let lengths = decode_integers::<u32>(cursor, metadata)?;
                match length_type {
                    LengthType::Dictionary => self.dictionary_lengths = Some(lengths),
                    LengthType::Symbol => self.symbol_lengths = Some(lengths),
                    _ => self.lengths = Some(lengths),
                }
            }
            (PhysicalStreamType::Data, LogicalStreamType::Dictionary(dictionary_type)) => {
                let bytes = cursor.read_bytes(metadata.byte_length as usize)?;
                match dictionary_type {
                    DictionaryType::Single | DictionaryType::Shared => {
                        self.dictionary = Some(bytes);
                        return Ok(true);
                    }
                    DictionaryType::Fsst => self.symbols = Some(bytes),
                    DictionaryType::None => self.data = Some(bytes),
                    other => warn!(
                        target: "mlt_decoder::column",
                        dictionary_type = ?other,
                        "Skipping unexpected data stream in string column"
                    ),
                }
            }
            (physical, _) => {
                warn!(
                    target: "mlt_decoder::column",
                    ?physical,
                    "Skipping unexpected stream in string column"
                );
                metadata.skip_payload(cursor)?;
            }
        }
        Ok(false)
    }

    fn build_dictionary(&mut self) -> Result<Option<Dictionary>, DecodeError> {
        let Some(bytes) = self.dictionary else {
            return Ok(None);
        };
        let offsets = lengths_to_offsets(self.dictionary_lengths.as_deref().unwrap_or_default());
        match (self.symbols, self.symbol_lengths.take()) {
            (Some(symbols), Some(symbol_lengths)) => Ok(Some(Dictionary::fsst(
                offsets,
                symbols.to_vec(),
                symbol_lengths,
                bytes.to_vec(),
            ))),
            (Some(_), None) => Err(DecodeError::CorruptStream(
                "FSST symbol table without symbol lengths".into(),
            )),
            _ => Dictionary::raw(offsets, bytes.to_vec()).map(Some),
        }
    }
}

/// Decodes a string column of `num_streams` streams following the optional
/// present stream.
pub fn decode_string_column(
    cursor: &mut SliceCursor<'_>,
    name: &str,
    num_streams: usize,
    present: Option<BitVector>,
) -> Result<StringVector, DecodeError> {
    let mut streams = StringStreams::default();
    for _ in 0..num_streams {
        let metadata = StreamMetadata::decode(cursor)?;
        if metadata.byte_length == 0 {
            continue;
        }
        streams.read(cursor, &metadata)?;
    }

    let nullability = Nullability::new(present);
    if let Some(dictionary) = streams.build_dictionary()? {
        let mut indices = streams.indices.take().ok_or_else(|| {
            DecodeError::CorruptStream(format!("dictionary column '{}' has no index stream", name))
        })?;
        if let Some(present) = nullability.present() {
            indices = expand_nullable(indices, present)?;
        }
        debug!(
            target: "mlt_decoder::column",
            column = name,
            entries = dictionary.len(),
            fsst = dictionary.is_fsst(),
            "Decoded string dictionary"
        );
        return StringVector::dictionary(name, indices, Arc::new(dictionary), nullability);
    }

    let mut lengths = streams.lengths.take().unwrap_or_default();
    if let Some(present) = nullability.present() {
        lengths = expand_nullable(lengths, present)?;
    }
    let data = streams.data.unwrap_or_default().to_vec();
    StringVector::plain(name, lengths_to_offsets(&lengths), data, nullability)
}

fn child_column_name(parent: &str, child: &str) -> String {
    if child == DEFAULT_CHILD {
        parent.to_string()
    } else {
        format!("{}{}{}", parent, CHILD_SEPARATOR, child)
    }
}

/// Decodes a struct column whose string children share one dictionary.
pub fn decode_shared_dictionary(
    cursor: &mut SliceCursor<'_>,
    column: &Column,
    column_filter: Option<&HashSet<String>>,
) -> Result<Vec<StringVector>, DecodeError> {
    let mut streams = StringStreams::default();
    loop {
        let metadata = StreamMetadata::decode(cursor)?;
        if streams.read(cursor, &metadata)? {
            break;
        }
    }
    let dictionary = Arc::new(streams.build_dictionary()?.ok_or_else(|| {
        DecodeError::CorruptStream(format!("column '{}' has no shared dictionary", column.name))
    })?);

    let mut vectors = Vec::with_capacity(column.children().len());
    for child in column.children() {
        let num_streams = decode_varint_usize(cursor)?;
        if num_streams == 0 {
            continue;
        }

        let name = child_column_name(&column.name, &child.name);
        if column_filter.is_some_and(|wanted| !wanted.contains(&name)) {
            skip_column(cursor, num_streams)?;
            continue;
        }

        if num_streams != 2 || child.scalar_type() != Some(ScalarType::String) {
            return Err(DecodeError::UnsupportedScalarType {
                column: name,
                detail: format!(
                    "shared dictionary children must be nullable strings with 2 streams, got {} streams",
                    num_streams
                ),
            });
        }

        let present_metadata = StreamMetadata::decode(cursor)?;
        let present = decode_bit_stream(cursor, &present_metadata)?;
        let index_metadata = StreamMetadata::decode(cursor)?;
        let indices = decode_integers::<u32>(cursor, &index_metadata)?;
        let indices = expand_nullable(indices, &present)?;
        vectors.push(StringVector::dictionary(
            name,
            indices,
            Arc::clone(&dictionary),
            Nullability::new(Some(present)),
        )?);
    }

    debug!(
        target: "mlt_decoder::column",
        column = %column.name,
        children = vectors.len(),
        "Decoded shared dictionary"
    );
    Ok(vectors)
}
