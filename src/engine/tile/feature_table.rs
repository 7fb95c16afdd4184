use crate::engine::core::vector::{Geometry, GeometryVector, NumericElement, NumericVector, Value, Vector};
use crate::engine::errors::DecodeError;
use serde::Serialize;

/// Largest integer an IEEE double represents exactly (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// The decoded columns of one layer in a tile.
#[derive(Clone, Debug)]
pub struct FeatureTable {
    name: String,
    extent: u32,
    geometry: GeometryVector,
    id: Option<Vector>,
    properties: Vec<Vector>,
}

impl FeatureTable {
    pub fn new(
        name: impl Into<String>,
        extent: u32,
        geometry: GeometryVector,
        id: Option<Vector>,
        properties: Vec<Vector>,
    ) -> Self {
        Self {
            name: name.into(),
            extent,
            geometry,
            id,
            properties,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extent(&self) -> u32 {
        self.extent
    }

    /// Feature count, taken from the geometry column.
    pub fn num_features(&self) -> usize {
        self.geometry.size()
    }

    pub fn geometry(&self) -> &GeometryVector {
        &self.geometry
    }

    pub fn id(&self) -> Option<&Vector> {
        self.id.as_ref()
    }

    pub fn properties(&self) -> &[Vector] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Vector> {
        self.properties.iter().find(|v| v.name() == name)
    }

    /// Whether every id can be handed out as a double without losing
    /// precision.
    pub fn contains_max_safe_integer_values(&self) -> bool {
        match &self.id {
            None => false,
            Some(Vector::Int(_) | Vector::UInt(_) | Vector::Double(_)) => true,
            Some(Vector::Long(v)) => all_within(v, |id| id.unsigned_abs() <= MAX_SAFE_INTEGER),
            Some(Vector::ULong(v)) => all_within(v, |id| id <= MAX_SAFE_INTEGER),
            Some(Vector::Float(_) | Vector::Boolean(_) | Vector::String(_)) => false,
        }
    }

    /// A fresh iterator over all features; tables can be walked any number
    /// of times.
    pub fn features(&self) -> Features<'_> {
        Features {
            table: self,
            next: 0,
            failed: false,
        }
    }

    pub fn feature(&self, index: usize) -> Result<Option<Feature<'_>>, DecodeError> {
        let Some(geometry) = self.geometry.geometry(index)? else {
            return Ok(None);
        };
        let id = match &self.id {
            Some(id) => id.get(index)?,
            None => None,
        };
        let mut properties = Vec::with_capacity(self.properties.len());
        for vector in &self.properties {
            if let Some(value) = vector.get(index)? {
                properties.push((vector.name(), value));
            }
        }
        Ok(Some(Feature {
            id,
            geometry,
            properties,
        }))
    }
}

fn all_within<T: NumericElement>(vector: &NumericVector<T>, fits: impl Fn(T) -> bool) -> bool {
    vector.iter().flatten().all(fits)
}

/// One row of a feature table. Absent properties are left out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Feature<'a> {
    pub id: Option<Value>,
    pub geometry: &'a Geometry,
    pub properties: Vec<(&'a str, Value)>,
}

impl Feature<'_> {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

/// Iterator over the rows of a table. Stops at the first error.
pub struct Features<'a> {
    table: &'a FeatureTable,
    next: usize,
    failed: bool,
}

impl<'a> Iterator for Features<'a> {
    type Item = Result<Feature<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next >= self.table.num_features() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let item = self.table.feature(index).transpose();
        self.failed = matches!(item, Some(Err(_)) | None);
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let left = self.table.num_features().saturating_sub(self.next);
        (0, Some(left))
    }
}

impl std::iter::FusedIterator for Features<'_> {}
