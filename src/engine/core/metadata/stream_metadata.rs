use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::encoding::morton::MortonSettings;
use crate::engine::core::encoding::varint::decode_varint_u32;
use crate::engine::core::metadata::stream_types::{
    LogicalLevelTechnique, LogicalStreamType, PhysicalLevelTechnique, PhysicalStreamType,
};
use crate::engine::errors::DecodeError;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RleInfo {
    pub runs: u32,
    pub num_rle_values: u32,
}

/// Header that precedes every physical stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamMetadata {
    pub physical_stream_type: PhysicalStreamType,
    pub logical_stream_type: LogicalStreamType,
    pub logical_level_technique1: LogicalLevelTechnique,
    pub logical_level_technique2: LogicalLevelTechnique,
    pub physical_level_technique: PhysicalLevelTechnique,
    pub num_values: u32,
    pub byte_length: u32,
    pub morton: Option<MortonSettings>,
    pub rle: Option<RleInfo>,
}

impl StreamMetadata {
    pub fn decode(cursor: &mut SliceCursor<'_>) -> Result<Self, DecodeError> {
        let type_byte = cursor.read_u8()?;
        let physical_stream_type = PhysicalStreamType::try_from(type_byte >> 4)?;
        let logical_stream_type =
            LogicalStreamType::from_nibble(physical_stream_type, type_byte & 0x0f)?;

        let technique_byte = cursor.read_u8()?;
        let logical_level_technique1 = LogicalLevelTechnique::try_from(technique_byte >> 5)?;
        let logical_level_technique2 =
            LogicalLevelTechnique::try_from((technique_byte >> 2) & 0x07)?;
        let physical_level_technique = PhysicalLevelTechnique::try_from(technique_byte & 0x03)?;

        let num_values = decode_varint_u32(cursor)?;
        let byte_length = decode_varint_u32(cursor)?;

        let mut metadata = StreamMetadata {
            physical_stream_type,
            logical_stream_type,
            logical_level_technique1,
            logical_level_technique2,
            physical_level_technique,
            num_values,
            byte_length,
            morton: None,
            rle: None,
        };

        if logical_level_technique1 == LogicalLevelTechnique::Morton {
            metadata.morton = Some(MortonSettings {
                num_bits: decode_varint_u32(cursor)?,
                coordinate_shift: decode_varint_u32(cursor)?,
            });
        } else if (logical_level_technique1 == LogicalLevelTechnique::Rle
            || logical_level_technique2 == LogicalLevelTechnique::Rle)
            && physical_level_technique != PhysicalLevelTechnique::None
        {
            metadata.rle = Some(RleInfo {
                runs: decode_varint_u32(cursor)?,
                num_rle_values: decode_varint_u32(cursor)?,
            });
        }

        trace!(
            physical = ?metadata.physical_stream_type,
            logical = ?metadata.logical_stream_type,
            num_values = metadata.num_values,
            byte_length = metadata.byte_length,
            "stream metadata"
        );
        Ok(metadata)
    }

    /// Number of logical values the stream expands to.
    pub fn logical_value_count(&self) -> usize {
        match self.rle {
            Some(rle) => rle.num_rle_values as usize,
            None => self.num_values as usize,
        }
    }

    pub fn is_delta_rle(&self) -> bool {
        self.logical_level_technique1 == LogicalLevelTechnique::Delta
            && self.logical_level_technique2 == LogicalLevelTechnique::Rle
    }

    /// Skips the payload using `byte_length` alone.
    pub fn skip_payload(&self, cursor: &mut SliceCursor<'_>) -> Result<(), DecodeError> {
        cursor.advance(self.byte_length as usize)
    }
}

/// Skips `num_streams` streams without interpreting their payloads.
pub fn skip_column(cursor: &mut SliceCursor<'_>, num_streams: usize) -> Result<(), DecodeError> {
    for _ in 0..num_streams {
        let metadata = StreamMetadata::decode(cursor)?;
        metadata.skip_payload(cursor)?;
    }
    Ok(())
}
