use crate::engine::core::metadata::tileset::{
    Column, ComplexColumn, ComplexType, FeatureTableSchema, Field, ScalarColumn, ScalarField,
    ScalarType, TileSetMetadata, column, complex_column, field, scalar_column, scalar_field,
};

/// Builds tileset schemas; table ids follow insertion order.
pub struct MetadataFactory {
    tables: Vec<FeatureTableSchema>,
}

impl MetadataFactory {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn with_table(mut self, name: &str, columns: Vec<Column>) -> Self {
        self.tables.push(FeatureTableSchema {
            name: name.to_string(),
            columns,
        });
        self
    }

    pub fn create(self) -> TileSetMetadata {
        TileSetMetadata {
            version: 1,
            feature_tables: self.tables,
            name: "test tileset".to_string(),
            ..Default::default()
        }
    }

    pub fn scalar(name: &str, scalar_type: ScalarType, nullable: bool) -> Column {
        Column {
            name: name.to_string(),
            nullable,
            column_scope: 0,
            r#type: Some(column::Type::ScalarType(ScalarColumn {
                r#type: Some(scalar_column::Type::PhysicalType(scalar_type as i32)),
            })),
        }
    }

    pub fn id(scalar_type: ScalarType, nullable: bool) -> Column {
        Self::scalar("id", scalar_type, nullable)
    }

    pub fn geometry() -> Column {
        Self::complex("geometry", ComplexType::Geometry, Vec::new())
    }

    /// Struct column whose nullable string children share one dictionary.
    pub fn shared_struct(name: &str, children: &[&str]) -> Column {
        let children = children
            .iter()
            .map(|child| Field {
                name: child.to_string(),
                nullable: true,
                r#type: Some(field::Type::ScalarField(ScalarField {
                    r#type: Some(scalar_field::Type::PhysicalType(ScalarType::String as i32)),
                })),
            })
            .collect();
        Self::complex(name, ComplexType::Struct, children)
    }

    fn complex(name: &str, complex_type: ComplexType, children: Vec<Field>) -> Column {
        Column {
            name: name.to_string(),
            nullable: false,
            column_scope: 0,
            r#type: Some(column::Type::ComplexType(ComplexColumn {
                r#type: Some(complex_column::Type::PhysicalType(complex_type as i32)),
                children,
            })),
        }
    }
}
