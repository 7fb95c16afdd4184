//! Tileset metadata, a protobuf document shipped alongside the tiles. It
//! describes every feature table and the type of each of its columns.

use crate::engine::errors::DecodeError;
use prost::Message;
use tracing::debug;

#[derive(Clone, PartialEq, prost::Message)]
pub struct TileSetMetadata {
    #[prost(int32, tag = "1")]
    pub version: i32,
    #[prost(message, repeated, tag = "2")]
    pub feature_tables: Vec<FeatureTableSchema>,
    #[prost(string, tag = "3")]
    pub name: String,
    #[prost(string, tag = "4")]
    pub description: String,
    #[prost(string, tag = "5")]
    pub attribution: String,
    #[prost(int32, tag = "6")]
    pub min_zoom: i32,
    #[prost(int32, tag = "7")]
    pub max_zoom: i32,
    #[prost(double, repeated, tag = "8")]
    pub bounds: Vec<f64>,
    #[prost(double, repeated, tag = "9")]
    pub center: Vec<f64>,
}

impl TileSetMetadata {
    pub fn feature_table(&self, id: u32) -> Option<&FeatureTableSchema> {
        self.feature_tables.get(id as usize)
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FeatureTableSchema {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(message, repeated, tag = "2")]
    pub columns: Vec<Column>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Column {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "2")]
    pub nullable: bool,
    #[prost(enumeration = "ColumnScope", tag = "3")]
    pub column_scope: i32,
    #[prost(oneof = "column::Type", tags = "4, 5")]
    pub r#type: Option<column::Type>,
}

pub mod column {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "4")]
        ScalarType(super::ScalarColumn),
        #[prost(message, tag = "5")]
        ComplexType(super::ComplexColumn),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ScalarColumn {
    #[prost(oneof = "scalar_column::Type", tags = "4, 5")]
    pub r#type: Option<scalar_column::Type>,
}

pub mod scalar_column {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Type {
        #[prost(enumeration = "super::ScalarType", tag = "4")]
        PhysicalType(i32),
        #[prost(enumeration = "super::LogicalScalarType", tag = "5")]
        LogicalType(i32),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ComplexColumn {
    #[prost(oneof = "complex_column::Type", tags = "4, 5")]
    pub r#type: Option<complex_column::Type>,
    #[prost(message, repeated, tag = "6")]
    pub children: Vec<Field>,
}

pub mod complex_column {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Type {
        #[prost(enumeration = "super::ComplexType", tag = "4")]
        PhysicalType(i32),
        #[prost(enumeration = "super::LogicalComplexType", tag = "5")]
        LogicalType(i32),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Field {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bool, tag = "2")]
    pub nullable: bool,
    #[prost(oneof = "field::Type", tags = "3, 4")]
    pub r#type: Option<field::Type>,
}

pub mod field {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "3")]
        ScalarField(super::ScalarField),
        #[prost(message, tag = "4")]
        ComplexField(super::ComplexField),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ScalarField {
    #[prost(oneof = "scalar_field::Type", tags = "1, 2")]
    pub r#type: Option<scalar_field::Type>,
}

pub mod scalar_field {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Type {
        #[prost(enumeration = "super::ScalarType", tag = "1")]
        PhysicalType(i32),
        #[prost(enumeration = "super::LogicalScalarType", tag = "2")]
        LogicalType(i32),
    }
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ComplexField {
    #[prost(oneof = "complex_field::Type", tags = "1, 2")]
    pub r#type: Option<complex_field::Type>,
    #[prost(message, repeated, tag = "3")]
    pub children: Vec<Field>,
}

pub mod complex_field {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Type {
        #[prost(enumeration = "super::ComplexType", tag = "1")]
        PhysicalType(i32),
        #[prost(enumeration = "super::LogicalComplexType", tag = "2")]
        LogicalType(i32),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ColumnScope {
    Feature = 0,
    Vertex = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ScalarType {
    Boolean = 0,
    Int8 = 1,
    Uint8 = 2,
    Int32 = 3,
    Uint32 = 4,
    Int64 = 5,
    Uint64 = 6,
    Float = 7,
    Double = 8,
    String = 9,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LogicalScalarType {
    Timestamp = 0,
    Date = 1,
    Json = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ComplexType {
    Vec2 = 0,
    Vec3 = 1,
    Geometry = 2,
    GeometryZ = 3,
    List = 4,
    Map = 5,
    Struct = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum LogicalComplexType {
    Binary = 0,
    RangeMap = 1,
}

/// Resolved shape of a column as seen by the tile decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Scalar(ScalarType),
    LogicalScalar(Option<LogicalScalarType>),
    Complex(Option<ComplexType>),
    LogicalComplex(Option<LogicalComplexType>),
    /// Unknown enum value or a column without a type.
    Unknown,
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match &self.r#type {
            Some(column::Type::ScalarType(s)) => match s.r#type {
                Some(scalar_column::Type::PhysicalType(t)) => ScalarType::try_from(t)
                    .map(ColumnKind::Scalar)
                    .unwrap_or(ColumnKind::Unknown),
                Some(scalar_column::Type::LogicalType(t)) => {
                    ColumnKind::LogicalScalar(LogicalScalarType::try_from(t).ok())
                }
                None => ColumnKind::Unknown,
            },
            Some(column::Type::ComplexType(c)) => match c.r#type {
                Some(complex_column::Type::PhysicalType(t)) => {
                    ColumnKind::Complex(ComplexType::try_from(t).ok())
                }
                Some(complex_column::Type::LogicalType(t)) => {
                    ColumnKind::LogicalComplex(LogicalComplexType::try_from(t).ok())
                }
                None => ColumnKind::Unknown,
            },
            None => ColumnKind::Unknown,
        }
    }

    pub fn is_id(&self) -> bool {
        self.name == "id"
    }

    pub fn is_geometry(&self) -> bool {
        self.name == "geometry"
    }

    /// Child fields of a complex column; empty for scalars.
    pub fn children(&self) -> &[Field] {
        match &self.r#type {
            Some(column::Type::ComplexType(c)) => &c.children,
            _ => &[],
        }
    }
}

impl Field {
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match &self.r#type {
            Some(field::Type::ScalarField(ScalarField {
                r#type: Some(scalar_field::Type::PhysicalType(t)),
            })) => ScalarType::try_from(*t).ok(),
            _ => None,
        }
    }
}

/// Decodes a protobuf-encoded tileset metadata document.
pub fn decode_metadata(bytes: &[u8]) -> Result<TileSetMetadata, DecodeError> {
    let metadata = TileSetMetadata::decode(bytes)?;
    debug!(
        target: "mlt_decoder::metadata",
        tables = metadata.feature_tables.len(),
        "Decoded tileset metadata"
    );
    Ok(metadata)
}
