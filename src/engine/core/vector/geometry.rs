use crate::engine::core::encoding::morton::{MortonSettings, decode_morton};
use crate::engine::core::vector::selection::SelectionVector;
use crate::engine::errors::DecodeError;
use once_cell::sync::OnceCell;
use serde::Serialize;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum GeometryType {
    Point = 0,
    LineString = 1,
    Polygon = 2,
    MultiPoint = 3,
    MultiLineString = 4,
    MultiPolygon = 5,
}

impl GeometryType {
    pub fn single_part(self) -> GeometryType {
        match self {
            GeometryType::Point | GeometryType::MultiPoint => GeometryType::Point,
            GeometryType::LineString | GeometryType::MultiLineString => GeometryType::LineString,
            GeometryType::Polygon | GeometryType::MultiPolygon => GeometryType::Polygon,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPoint => "MultiPoint",
            GeometryType::MultiLineString => "MultiLineString",
            GeometryType::MultiPolygon => "MultiPolygon",
        }
    }

    /// Parses the single-part names used by style filters.
    pub fn from_filter_name(name: &str) -> Option<GeometryType> {
        match name {
            "Point" => Some(GeometryType::Point),
            "LineString" => Some(GeometryType::LineString),
            "Polygon" => Some(GeometryType::Polygon),
            _ => None,
        }
    }
}

impl TryFrom<u32> for GeometryType {
    type Error = DecodeError;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(GeometryType::Point),
            1 => Ok(GeometryType::LineString),
            2 => Ok(GeometryType::Polygon),
            3 => Ok(GeometryType::MultiPoint),
            4 => Ok(GeometryType::MultiLineString),
            5 => Ok(GeometryType::MultiPolygon),
            other => Err(DecodeError::InvalidStreamTag {
                kind: "geometry type",
                value: other,
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Materialised geometry. Polygon rings are closed (first vertex repeated).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    Polygon(Vec<Vec<Coordinate>>),
    MultiPoint(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
}

#[derive(Clone, Debug, PartialEq)]
pub enum GeometryTypes {
    Const(GeometryType),
    Flat(Vec<GeometryType>),
}

/// Offset buffers; entry `k + 1` minus entry `k` is the length of item `k`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Topology {
    pub geometry_offsets: Option<Vec<u32>>,
    pub part_offsets: Option<Vec<u32>>,
    pub ring_offsets: Option<Vec<u32>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VertexBuffer {
    /// Interleaved x/y pairs.
    Vec2(Vec<i32>),
    Morton {
        codes: Vec<u32>,
        settings: MortonSettings,
    },
}

impl VertexBuffer {
    pub fn num_vertices(&self) -> usize {
        match self {
            VertexBuffer::Vec2(xy) => xy.len() / 2,
            VertexBuffer::Morton { codes, .. } => codes.len(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GeometryVector {
    size: usize,
    types: GeometryTypes,
    topology: Topology,
    vertex_offsets: Option<Vec<u32>>,
    vertices: VertexBuffer,
    geometries: OnceCell<Vec<Geometry>>,
}

impl GeometryVector {
    pub fn new(
        size: usize,
        types: GeometryTypes,
        topology: Topology,
        vertex_offsets: Option<Vec<u32>>,
        vertices: VertexBuffer,
    ) -> Self {
        let size = match &types {
            GeometryTypes::Const(_) => size,
            GeometryTypes::Flat(t) => t.len(),
        };
        Self {
            size,
            types,
            topology,
            vertex_offsets,
            vertices,
            geometries: OnceCell::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn types(&self) -> &GeometryTypes {
        &self.types
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    /// Vertices the geometries can reference, counting repeats through
    /// vertex offsets.
    pub fn num_vertex_refs(&self) -> usize {
        self.vertex_offsets
            .as_ref()
            .map_or_else(|| self.vertices.num_vertices(), Vec::len)
    }

    pub fn geometry_type(&self, index: usize) -> Option<GeometryType> {
        if index >= self.size {
            return None;
        }
        match &self.types {
            GeometryTypes::Const(t) => Some(*t),
            GeometryTypes::Flat(types) => types.get(index).copied(),
        }
    }

    fn matches(&self, index: usize, geometry_type: GeometryType) -> bool {
        self.geometry_type(index)
            .is_some_and(|t| t.single_part() == geometry_type.single_part())
    }

    /// Rows whose type is `geometry_type` or its multi-part counterpart.
    pub fn filter(&self, geometry_type: GeometryType) -> SelectionVector {
        match &self.types {
            GeometryTypes::Const(t) if t.single_part() == geometry_type.single_part() => {
                SelectionVector::all(self.size)
            }
            GeometryTypes::Const(_) => SelectionVector::empty(),
            GeometryTypes::Flat(_) => (0..self.size)
                .filter(|&i| self.matches(i, geometry_type))
                .collect(),
        }
    }

    pub fn filter_selected(&self, geometry_type: GeometryType, selection: &mut SelectionVector) {
        selection.retain(|i| self.matches(i, geometry_type));
    }

    /// Materialises all geometries on first call.
    pub fn geometries(&self) -> Result<&[Geometry], DecodeError> {
        self.geometries
            .get_or_try_init(|| GeometryBuilder::new(self).build())
            .map(Vec::as_slice)
    }

    pub fn geometry(&self, index: usize) -> Result<Option<&Geometry>, DecodeError> {
        Ok(self.geometries()?.get(index))
    }
}

/// Walks one offset buffer with a running position.
struct OffsetCursor<'a> {
    offsets: Option<&'a [u32]>,
    next: usize,
    name: &'static str,
}

impl<'a> OffsetCursor<'a> {
    fn new(offsets: Option<&'a Vec<u32>>, name: &'static str) -> Self {
        Self {
            offsets: offsets.map(Vec::as_slice),
            next: 1,
            name,
        }
    }

    fn is_present(&self) -> bool {
        self.offsets.is_some()
    }

    /// Length of the next item, advancing the cursor.
    fn take(&mut self) -> Result<usize, DecodeError> {
        let offsets = self.offsets.ok_or_else(|| {
            DecodeError::CorruptStream(format!("geometry needs missing {} offsets", self.name))
        })?;
        let (Some(&end), Some(&start)) = (offsets.get(self.next), offsets.get(self.next - 1))
        else {
            return Err(DecodeError::CorruptStream(format!(
                "{} offsets exhausted at {}",
                self.name, self.next
            )));
        };
        self.next += 1;
        end.checked_sub(start).map(|n| n as usize).ok_or_else(|| {
            DecodeError::CorruptStream(format!("{} offsets decrease at {}", self.name, self.next))
        })
    }

    fn skip(&mut self) {
        if self.offsets.is_some() {
            self.next += 1;
        }
    }
}

struct GeometryBuilder<'a> {
    vector: &'a GeometryVector,
    geometries: OffsetCursor<'a>,
    parts: OffsetCursor<'a>,
    rings: OffsetCursor<'a>,
    vertex: usize,
}

impl<'a> GeometryBuilder<'a> {
    fn new(vector: &'a GeometryVector) -> Self {
        let topology = &vector.topology;
        Self {
            vector,
            geometries: OffsetCursor::new(topology.geometry_offsets.as_ref(), "geometry"),
            parts: OffsetCursor::new(topology.part_offsets.as_ref(), "part"),
            rings: OffsetCursor::new(topology.ring_offsets.as_ref(), "ring"),
            vertex: 0,
        }
    }

    fn build(mut self) -> Result<Vec<Geometry>, DecodeError> {
        let mut out = Vec::with_capacity(self.capacity_for(self.vector.size));
        for i in 0..self.vector.size {
            let geometry_type = self.vector.geometry_type(i).ok_or_else(|| {
                DecodeError::CorruptStream(format!("missing geometry type for row {}", i))
            })?;
            out.push(self.next_geometry(geometry_type)?);
        }
        Ok(out)
    }

    /// Caps a length read from offsets by the vertices still unread.
    fn capacity_for(&self, n: usize) -> usize {
        n.min(self.vector.num_vertex_refs().saturating_sub(self.vertex))
    }

    fn next_geometry(&mut self, geometry_type: GeometryType) -> Result<Geometry, DecodeError> {
        Ok(match geometry_type {
            GeometryType::Point => {
                let point = self.next_vertex()?;
                self.geometries.skip();
                self.parts.skip();
                self.rings.skip();
                Geometry::Point(point)
            }
            GeometryType::MultiPoint => {
                let n = self.geometries.take()?;
                let mut points = Vec::with_capacity(self.capacity_for(n));
                for _ in 0..n {
                    points.push(self.next_vertex()?);
                    self.parts.skip();
                    self.rings.skip();
                }
                Geometry::MultiPoint(points)
            }
            GeometryType::LineString => {
                let line = self.next_line_string()?;
                self.geometries.skip();
                Geometry::LineString(line)
            }
            GeometryType::MultiLineString => {
                let n = self.geometries.take()?;
                let mut lines = Vec::with_capacity(self.capacity_for(n));
                for _ in 0..n {
                    lines.push(self.next_line_string()?);
                }
                Geometry::MultiLineString(lines)
            }
            GeometryType::Polygon => {
                let polygon = self.next_polygon()?;
                self.geometries.skip();
                Geometry::Polygon(polygon)
            }
            GeometryType::MultiPolygon => {
                let n = self.geometries.take()?;
                let mut polygons = Vec::with_capacity(self.capacity_for(n));
                for _ in 0..n {
                    polygons.push(self.next_polygon()?);
                }
                Geometry::MultiPolygon(polygons)
            }
        })
    }

    // Line vertex counts live in the ring buffer whenever one exists.
    fn next_line_string(&mut self) -> Result<Vec<Coordinate>, DecodeError> {
        let n = if self.rings.is_present() {
            let n = self.rings.take()?;
            self.parts.skip();
            n
        } else {
            self.parts.take()?
        };
        self.next_vertices(n, false)
    }

    fn next_polygon(&mut self) -> Result<Vec<Vec<Coordinate>>, DecodeError> {
        let num_rings = self.parts.take()?;
        let mut rings = Vec::with_capacity(self.capacity_for(num_rings));
        for _ in 0..num_rings {
            let n = self.rings.take()?;
            rings.push(self.next_vertices(n, true)?);
        }
        Ok(rings)
    }

    fn next_vertices(&mut self, n: usize, close: bool) -> Result<Vec<Coordinate>, DecodeError> {
        let mut out = Vec::with_capacity(self.capacity_for(n) + close as usize);
        for _ in 0..n {
            out.push(self.next_vertex()?);
        }
        if close {
            if let Some(&first) = out.first() {
                out.push(first);
            }
        }
        Ok(out)
    }

    fn next_vertex(&mut self) -> Result<Coordinate, DecodeError> {
        let k = self.vertex;
        self.vertex += 1;
        let index = match &self.vector.vertex_offsets {
            Some(offsets) => *offsets.get(k).ok_or_else(|| {
                DecodeError::CorruptStream(format!("vertex offsets exhausted at {}", k))
            })? as usize,
            None => k,
        };
        let out_of_range =
            || DecodeError::CorruptStream(format!("vertex {} outside vertex buffer", index));
        match &self.vector.vertices {
            VertexBuffer::Vec2(xy) => {
                let x = *xy.get(2 * index).ok_or_else(out_of_range)?;
                let y = *xy.get(2 * index + 1).ok_or_else(out_of_range)?;
                Ok(Coordinate::new(x, y))
            }
            VertexBuffer::Morton { codes, settings } => {
                let code = *codes.get(index).ok_or_else(out_of_range)?;
                let (x, y) = decode_morton(code, *settings);
                Ok(Coordinate::new(x, y))
            }
        }
    }
}
