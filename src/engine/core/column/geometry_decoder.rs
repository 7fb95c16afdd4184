use crate::engine::core::column::integer_stream::{
    Scaling, VectorType, decode_const, decode_integers, decode_vertices, lengths_to_offsets,
    vector_type,
};
use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::metadata::{
    DictionaryType, LengthType, LogicalStreamType, OffsetType, StreamMetadata,
};
use crate::engine::core::vector::geometry::{GeometryTypes, Topology, VertexBuffer};
use crate::engine::core::vector::{GeometryType, GeometryVector};
use crate::engine::errors::DecodeError;
use tracing::{debug, trace, warn};

/// Raw streams of a geometry column before normalisation.
#[derive(Default)]
struct GeometryStreams {
    geometries: Option<Vec<u32>>,
    parts: Option<Vec<u32>>,
    rings: Option<Vec<u32>>,
    vertex_offsets: Option<Vec<u32>>,
    vertices: Option<VertexBuffer>,
}

impl GeometryStreams {
    fn read(
        cursor: &mut SliceCursor<'_>,
        num_streams: usize,
        scaling: Option<Scaling>,
    ) -> Result<Self, DecodeError> {
        let mut streams = GeometryStreams::default();
        for _ in 0..num_streams {
            let metadata = StreamMetadata::decode(cursor)?;
            match metadata.logical_stream_type {
                LogicalStreamType::Length(length_type) => {
                    let slot = match length_type {
                        LengthType::Geometries => &mut streams.geometries,
                        LengthType::Parts => &mut streams.parts,
                        LengthType::Rings => &mut streams.rings,
                        other => {
                            trace!(length_type = ?other, "Skipping tessellation stream");
                            metadata.skip_payload(cursor)?;
                            continue;
                        }
                    };
                    *slot = Some(decode_integers::<u32>(cursor, &metadata)?);
                }
                LogicalStreamType::Offset(OffsetType::Vertex) => {
                    streams.vertex_offsets = Some(decode_integers::<u32>(cursor, &metadata)?);
                }
                LogicalStreamType::Dictionary(DictionaryType::Vertex) => {
                    streams.vertices =
                        Some(VertexBuffer::Vec2(decode_vertices(cursor, &metadata, scaling)?));
                }
                LogicalStreamType::Dictionary(DictionaryType::Morton) => {
                    let settings = metadata.morton.ok_or_else(|| {
                        DecodeError::CorruptStream("morton stream without settings".into())
                    })?;
                    streams.vertices = Some(VertexBuffer::Morton {
                        codes: decode_integers::<u32>(cursor, &metadata)?,
                        settings,
                    });
                }
                LogicalStreamType::Offset(OffsetType::Index) => {
                    trace!("Skipping tessellation index stream");
                    metadata.skip_payload(cursor)?;
                }
                other => {
                    warn!(
                        target: "mlt_decoder::geometry",
                        logical = ?other,
                        "Skipping unexpected stream in geometry column"
                    );
                    metadata.skip_payload(cursor)?;
                }
            }
        }
        Ok(streams)
    }

    fn num_vertex_refs(&self) -> usize {
        match (&self.vertex_offsets, &self.vertices) {
            (Some(offsets), _) => offsets.len(),
            (None, Some(vertices)) => vertices.num_vertices(),
            (None, None) => 0,
        }
    }
}

/// Decodes a geometry column: a geometry type stream followed by
/// `num_streams - 1` topology and vertex streams.
pub fn decode_geometry_column(
    cursor: &mut SliceCursor<'_>,
    num_streams: usize,
    num_rows: usize,
    scaling: Option<Scaling>,
) -> Result<GeometryVector, DecodeError> {
    if num_streams == 0 {
        return Err(DecodeError::CorruptStream("geometry column without streams".into()));
    }
    let type_metadata = StreamMetadata::decode(cursor)?;
    let shape = vector_type::<u32>(&type_metadata, num_rows, cursor)?;

    if shape == VectorType::Const {
        let geometry_type = GeometryType::try_from(decode_const::<u32>(cursor, &type_metadata)?)?;
        let streams = GeometryStreams::read(cursor, num_streams - 1, scaling)?;
        debug!(
            target: "mlt_decoder::geometry",
            geometry_type = geometry_type.name(),
            rows = num_rows,
            "Decoded const geometry column"
        );
        let topology = Topology {
            geometry_offsets: streams.geometries.as_deref().map(lengths_to_offsets),
            part_offsets: streams.parts.as_deref().map(lengths_to_offsets),
            ring_offsets: streams.rings.as_deref().map(lengths_to_offsets),
        };
        let encoded = [
            &topology.geometry_offsets,
            &topology.part_offsets,
            &topology.ring_offsets,
        ]
        .into_iter()
        .flatten()
        .next()
        .map_or_else(|| streams.num_vertex_refs(), |o| o.len() - 1);
        if num_rows > encoded {
            return Err(DecodeError::CorruptStream(format!(
                "const geometry column declares {} rows but encodes {}",
                num_rows, encoded
            )));
        }
        return Ok(GeometryVector::new(
            num_rows,
            GeometryTypes::Const(geometry_type),
            topology,
            streams.vertex_offsets,
            streams.vertices.unwrap_or(VertexBuffer::Vec2(Vec::new())),
        ));
    }

    let types = decode_integers::<u32>(cursor, &type_metadata)?
        .into_iter()
        .map(GeometryType::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let streams = GeometryStreams::read(cursor, num_streams - 1, scaling)?;
    let vertex_refs = streams.num_vertex_refs();
    let topology = normalize_topology(
        &types,
        streams.geometries,
        streams.parts,
        streams.rings,
        vertex_refs,
    )?;
    debug!(
        target: "mlt_decoder::geometry",
        rows = types.len(),
        "Decoded mixed geometry column"
    );
    Ok(GeometryVector::new(
        types.len(),
        GeometryTypes::Flat(types),
        topology,
        streams.vertex_offsets,
        streams.vertices.unwrap_or(VertexBuffer::Vec2(Vec::new())),
    ))
}

/// Converts the length streams of a mixed column into offsets where every
/// geometry owns an entry on each present level. No level may hold more
/// items than `vertex_refs` plus the items of the level above.
fn normalize_topology(
    types: &[GeometryType],
    geometries: Option<Vec<u32>>,
    parts: Option<Vec<u32>>,
    rings: Option<Vec<u32>>,
    vertex_refs: usize,
) -> Result<Topology, DecodeError> {
    Ok(match (geometries, parts, rings) {
        (Some(geometries), parts, rings) => {
            let geometry_offsets = root_offsets(types, &geometries, GeometryType::Polygon)?;
            let (part_offsets, ring_offsets) = match (parts, rings) {
                (Some(parts), Some(rings)) => {
                    let part_offsets =
                        level1_offsets(types, &geometry_offsets, &parts, vertex_refs, |t| {
                            matches!(t, GeometryType::Polygon | GeometryType::MultiPolygon)
                        })?;
                    let ring_offsets = level2_offsets(
                        types,
                        &geometry_offsets,
                        &part_offsets,
                        &rings,
                        vertex_refs,
                    )?;
                    (Some(part_offsets), Some(ring_offsets))
                }
                (Some(parts), None) => {
                    let part_offsets =
                        level1_offsets(types, &geometry_offsets, &parts, vertex_refs, |t| {
                            matches!(t, GeometryType::LineString | GeometryType::MultiLineString)
                        })?;
                    (Some(part_offsets), None)
                }
                (None, rings) => (None, rings.as_deref().map(lengths_to_offsets)),
            };
            Topology {
                geometry_offsets: Some(geometry_offsets),
                part_offsets,
                ring_offsets,
            }
        }
        (None, Some(parts), Some(rings)) => {
            let part_offsets = root_offsets(types, &parts, GeometryType::LineString)?;
            let ring_offsets = level1_offsets(types, &part_offsets, &rings, vertex_refs, |t| {
                !matches!(t, GeometryType::Point | GeometryType::MultiPoint)
            })?;
            Topology {
                geometry_offsets: None,
                part_offsets: Some(part_offsets),
                ring_offsets: Some(ring_offsets),
            }
        }
        (None, Some(parts), None) => Topology {
            geometry_offsets: None,
            part_offsets: Some(root_offsets(types, &parts, GeometryType::Point)?),
            ring_offsets: None,
        },
        (None, None, rings) => Topology {
            geometry_offsets: None,
            part_offsets: None,
            ring_offsets: rings.as_deref().map(lengths_to_offsets),
        },
    })
}

struct Lengths<'a> {
    values: &'a [u32],
    next: usize,
}

impl<'a> Lengths<'a> {
    fn new(values: &'a [u32]) -> Self {
        Self { values, next: 0 }
    }

    fn take(&mut self) -> Result<u32, DecodeError> {
        let value = self.values.get(self.next).copied().ok_or_else(|| {
            DecodeError::CorruptStream(format!(
                "geometry length stream exhausted after {} entries",
                self.next
            ))
        })?;
        self.next += 1;
        Ok(value)
    }
}

fn checked_add(acc: u32, n: u32) -> Result<u32, DecodeError> {
    acc.checked_add(n)
        .ok_or_else(|| DecodeError::CorruptStream("geometry offsets overflow u32".into()))
}

/// Item count of an offset buffer, bounded by `limit`.
fn bounded_total(offsets: &[u32], limit: usize) -> Result<usize, DecodeError> {
    let total = offsets.last().map_or(0, |&n| n as usize);
    if total > limit {
        return Err(DecodeError::CorruptStream(format!(
            "geometry offsets reach {} items, vertices allow {}",
            total, limit
        )));
    }
    Ok(total)
}

fn span(offsets: &[u32], index: usize) -> Result<usize, DecodeError> {
    match (offsets.get(index), offsets.get(index + 1)) {
        (Some(&start), Some(&end)) if end >= start => Ok((end - start) as usize),
        _ => Err(DecodeError::CorruptStream(format!(
            "geometry offsets malformed at {}",
            index
        ))),
    }
}

/// Types above `threshold` read a length; the others count as one item.
fn root_offsets(
    types: &[GeometryType],
    lengths: &[u32],
    threshold: GeometryType,
) -> Result<Vec<u32>, DecodeError> {
    let mut lengths = Lengths::new(lengths);
    let mut offsets = Vec::with_capacity(types.len() + 1);
    let mut acc = 0u32;
    offsets.push(acc);
    for &t in types {
        let n = if t as u8 > threshold as u8 { lengths.take()? } else { 1 };
        acc = checked_add(acc, n)?;
        offsets.push(acc);
    }
    Ok(offsets)
}

fn level1_offsets(
    types: &[GeometryType],
    root: &[u32],
    lengths: &[u32],
    vertex_refs: usize,
    has_length: impl Fn(GeometryType) -> bool,
) -> Result<Vec<u32>, DecodeError> {
    let total = bounded_total(root, vertex_refs.saturating_add(types.len()))?;
    let mut lengths = Lengths::new(lengths);
    let mut offsets = Vec::with_capacity(total + 1);
    let mut acc = 0u32;
    offsets.push(acc);
    for (i, &t) in types.iter().enumerate() {
        for _ in 0..span(root, i)? {
            let n = if has_length(t) { lengths.take()? } else { 1 };
            acc = checked_add(acc, n)?;
            offsets.push(acc);
        }
    }
    Ok(offsets)
}

fn level2_offsets(
    types: &[GeometryType],
    root: &[u32],
    level1: &[u32],
    lengths: &[u32],
    vertex_refs: usize,
) -> Result<Vec<u32>, DecodeError> {
    let root_total = bounded_total(root, vertex_refs.saturating_add(types.len()))?;
    let total = bounded_total(level1, vertex_refs.saturating_add(root_total))?;
    let mut lengths = Lengths::new(lengths);
    let mut offsets = Vec::with_capacity(total + 1);
    let mut acc = 0u32;
    offsets.push(acc);
    let mut level1_index = 0;
    for (i, &t) in types.iter().enumerate() {
        let pointlike = matches!(t, GeometryType::Point | GeometryType::MultiPoint);
        for _ in 0..span(root, i)? {
            if pointlike {
                acc = checked_add(acc, 1)?;
                offsets.push(acc);
            } else {
                for _ in 0..span(level1, level1_index)? {
                    acc = checked_add(acc, lengths.take()?)?;
                    offsets.push(acc);
                }
            }
            level1_index += 1;
        }
    }
    Ok(offsets)
}
