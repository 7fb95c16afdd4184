use crate::engine::core::column::bit_stream::decode_bit_stream;
use crate::engine::core::column::integer_stream::{
    decode_integer_vector, decode_integers, expand_nullable, vector_type,
};
use crate::engine::core::column::{Scaling, VectorType, decode_geometry_column, decode_property_column};
use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::encoding::varint::{decode_varint_u32, decode_varint_usize};
use crate::engine::core::encoding::zigzag::decode_zigzag_i32;
use crate::engine::core::metadata::StreamMetadata;
use crate::engine::core::metadata::tileset::{
    Column, ColumnKind, FeatureTableSchema, ScalarType, TileSetMetadata,
};
use crate::engine::core::vector::{BitVector, Nullability, NumericVector, Vector};
use crate::engine::errors::DecodeError;
use crate::engine::tile::feature_table::FeatureTable;
use crate::shared::config::DecoderConfig;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Target extent for vertex rescaling; scaled coordinates are clamped to
/// `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RescaleConfig {
    pub target_extent: u32,
    pub min: i32,
    pub max: i32,
}

impl RescaleConfig {
    pub fn new(target_extent: u32) -> Self {
        Self {
            target_extent,
            min: i32::MIN,
            max: i32::MAX,
        }
    }

    fn scaling(&self, tile_extent: u32) -> Option<Scaling> {
        if tile_extent == 0 {
            warn!(target: "mlt_decoder::tile", "Tile extent is zero, rescaling disabled");
            return None;
        }
        Some(Scaling {
            scale: f64::from(self.target_extent) / f64::from(tile_extent),
            min: self.min,
            max: self.max,
        })
    }
}

#[derive(Clone, Debug)]
pub struct DecodeOptions {
    /// Table name to wanted property columns. A supplied map skips every
    /// table it does not name.
    pub column_filter: Option<HashMap<String, HashSet<String>>>,
    pub rescale: Option<RescaleConfig>,
    /// Decode flat 64-bit id columns as doubles.
    pub id_within_max_safe_integer: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            column_filter: None,
            rescale: None,
            id_within_max_safe_integer: true,
        }
    }
}

impl From<&DecoderConfig> for DecodeOptions {
    fn from(config: &DecoderConfig) -> Self {
        Self {
            column_filter: None,
            rescale: config.target_extent.map(RescaleConfig::new),
            id_within_max_safe_integer: config.id_within_max_safe_integer,
        }
    }
}

/// Fixed header in front of every feature table block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u8,
    pub table_id: u32,
    pub body_size: usize,
    pub extent: u32,
    pub max_extent: i32,
    pub num_features: usize,
}

impl BlockHeader {
    pub fn decode(cursor: &mut SliceCursor<'_>) -> Result<Self, DecodeError> {
        Ok(Self {
            version: cursor.read_u8()?,
            table_id: decode_varint_u32(cursor)?,
            body_size: decode_varint_usize(cursor)?,
            extent: decode_varint_u32(cursor)?,
            max_extent: decode_zigzag_i32(decode_varint_u32(cursor)?),
            num_features: decode_varint_usize(cursor)?,
        })
    }
}

/// Decodes every feature table block of `tile`.
#[instrument(target = "mlt_decoder::tile", level = "debug", skip_all, fields(bytes = tile.len()))]
pub fn decode_tile(
    tile: &[u8],
    metadata: &TileSetMetadata,
    options: &DecodeOptions,
) -> Result<Vec<FeatureTable>, DecodeError> {
    let mut cursor = SliceCursor::new(tile);
    let mut tables = Vec::new();

    while !cursor.is_at_end() {
        let header = BlockHeader::decode(&mut cursor)?;
        let schema = metadata
            .feature_table(header.table_id)
            .ok_or(DecodeError::MissingTableMetadata(header.table_id))?;
        let body_end = cursor
            .position()
            .checked_add(header.body_size)
            .ok_or_else(|| DecodeError::CorruptStream("block body size overflows".into()))?;

        let column_filter = match &options.column_filter {
            Some(filter) => match filter.get(&schema.name) {
                Some(columns) => Some(columns),
                None => {
                    debug!(
                        target: "mlt_decoder::tile",
                        table = %schema.name,
                        body_size = header.body_size,
                        "Skipping table not named in the column filter"
                    );
                    cursor.set_position(body_end)?;
                    continue;
                }
            },
            None => None,
        };

        let table = decode_feature_table(&mut cursor, schema, &header, column_filter, options)?;
        if cursor.position() != body_end {
            debug!(
                target: "mlt_decoder::tile",
                table = %schema.name,
                declared_end = body_end,
                actual_end = cursor.position(),
                "Block body size disagrees with decoded columns"
            );
        }
        tables.push(table);
    }

    info!(
        target: "mlt_decoder::tile",
        tables = tables.len(),
        bytes = tile.len(),
        "Decoded tile"
    );
    Ok(tables)
}

/// Decodes independent tiles on the rayon pool. Results keep input order.
pub fn decode_tiles<T>(
    tiles: &[T],
    metadata: &TileSetMetadata,
    options: &DecodeOptions,
) -> Vec<Result<Vec<FeatureTable>, DecodeError>>
where
    T: AsRef<[u8]> + Sync,
{
    tiles
        .par_iter()
        .map(|tile| decode_tile(tile.as_ref(), metadata, options))
        .collect()
}

/// Decodes the columns of one block; the cursor sits right after the header.
#[instrument(
    target = "mlt_decoder::tile",
    level = "debug",
    skip_all,
    fields(table = %schema.name, table_id = header.table_id, features = header.num_features)
)]
pub fn decode_feature_table(
    cursor: &mut SliceCursor<'_>,
    schema: &FeatureTableSchema,
    header: &BlockHeader,
    column_filter: Option<&HashSet<String>>,
    options: &DecodeOptions,
) -> Result<FeatureTable, DecodeError> {
    let num_features = header.num_features;
    let scaling = options.rescale.and_then(|r| r.scaling(header.extent));
    let mut id = None;
    let mut geometry = None;
    let mut properties = Vec::new();

    for column in &schema.columns {
        let num_streams = decode_varint_usize(cursor)?;
        if column.is_id() {
            id = decode_id_column(
                cursor,
                column,
                num_streams,
                num_features,
                options.id_within_max_safe_integer,
            )?;
        } else if column.is_geometry() {
            let vector = decode_geometry_column(cursor, num_streams, num_features, scaling)?;
            if vector.size() != num_features {
                return Err(DecodeError::CorruptStream(format!(
                    "feature table '{}' declares {} features but its geometry column holds {}",
                    schema.name,
                    num_features,
                    vector.size()
                )));
            }
            geometry = Some(vector);
        } else {
            properties.extend(decode_property_column(
                cursor,
                column,
                num_streams,
                num_features,
                column_filter,
            )?);
        }
    }

    let geometry = geometry.ok_or_else(|| {
        DecodeError::CorruptStream(format!("feature table '{}' has no geometry column", schema.name))
    })?;
    debug!(
        target: "mlt_decoder::tile",
        table = %schema.name,
        version = header.version,
        features = num_features,
        properties = properties.len(),
        "Decoded feature table"
    );
    Ok(FeatureTable::new(
        schema.name.as_str(),
        header.extent,
        geometry,
        id,
        properties,
    ))
}

/// Ids are unsigned on the wire. Two streams mean a present stream first.
fn decode_id_column(
    cursor: &mut SliceCursor<'_>,
    column: &Column,
    num_streams: usize,
    num_rows: usize,
    narrow_to_double: bool,
) -> Result<Option<Vector>, DecodeError> {
    if num_streams == 0 {
        return Ok(None);
    }
    let present = if num_streams > 1 {
        let metadata = StreamMetadata::decode(cursor)?;
        Some(decode_bit_stream(cursor, &metadata)?)
    } else {
        None
    };
    let metadata = StreamMetadata::decode(cursor)?;
    let name = column.name.as_str();

    let vector = match column.kind() {
        ColumnKind::Scalar(ScalarType::Uint32 | ScalarType::Int32) => Vector::UInt(
            decode_integer_vector(cursor, &metadata, name, num_rows, present)?,
        ),
        ColumnKind::Scalar(ScalarType::Uint64 | ScalarType::Int64) => {
            if narrow_to_double && vector_type::<u64>(&metadata, num_rows, cursor)? == VectorType::Flat
            {
                Vector::Double(decode_id_doubles(cursor, &metadata, name, present)?)
            } else {
                Vector::ULong(decode_integer_vector(cursor, &metadata, name, num_rows, present)?)
            }
        }
        other => {
            return Err(DecodeError::UnsupportedScalarType {
                column: name.to_string(),
                detail: format!("id column of kind {:?}", other),
            });
        }
    };

    for _ in 2..num_streams {
        let extra = StreamMetadata::decode(cursor)?;
        warn!(target: "mlt_decoder::tile", column = name, "Skipping unexpected id stream");
        extra.skip_payload(cursor)?;
    }
    Ok(Some(vector))
}

fn decode_id_doubles(
    cursor: &mut SliceCursor<'_>,
    metadata: &StreamMetadata,
    name: &str,
    present: Option<BitVector>,
) -> Result<NumericVector<f64>, DecodeError> {
    let mut values: Vec<f64> = decode_integers::<u64>(cursor, metadata)?
        .into_iter()
        .map(|id| id as f64)
        .collect();
    if let Some(present) = &present {
        values = expand_nullable(values, present)?;
    }
    Ok(NumericVector::flat(name, values, Nullability::new(present)))
}
