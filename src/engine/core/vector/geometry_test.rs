use crate::engine::core::encoding::morton::MortonSettings;
use crate::engine::core::vector::geometry::{
    Coordinate, Geometry, GeometryType, GeometryTypes, GeometryVector, Topology, VertexBuffer,
};
use crate::engine::core::vector::SelectionVector;
use crate::engine::errors::DecodeError;

fn c(x: i32, y: i32) -> Coordinate {
    Coordinate::new(x, y)
}

#[test]
fn const_points_read_vertices_in_order() {
    let v = GeometryVector::new(
        2,
        GeometryTypes::Const(GeometryType::Point),
        Topology::default(),
        None,
        VertexBuffer::Vec2(vec![1, 2, 3, 4]),
    );
    assert_eq!(v.size(), 2);
    assert_eq!(v.geometry_type(1), Some(GeometryType::Point));
    assert_eq!(v.geometry(0).unwrap(), Some(&Geometry::Point(c(1, 2))));
    assert_eq!(v.geometry(1).unwrap(), Some(&Geometry::Point(c(3, 4))));
    assert_eq!(v.geometry(2).unwrap(), None);
}

#[test]
fn polygon_rings_are_closed() {
    let v = GeometryVector::new(
        1,
        GeometryTypes::Const(GeometryType::Polygon),
        Topology {
            geometry_offsets: None,
            part_offsets: Some(vec![0, 1]),
            ring_offsets: Some(vec![0, 3]),
        },
        None,
        VertexBuffer::Vec2(vec![0, 0, 10, 0, 10, 10]),
    );
    assert_eq!(
        v.geometries().unwrap(),
        &[Geometry::Polygon(vec![vec![
            c(0, 0),
            c(10, 0),
            c(10, 10),
            c(0, 0)
        ]])]
    );
}

fn mixed() -> GeometryVector {
    GeometryVector::new(
        0,
        GeometryTypes::Flat(vec![
            GeometryType::Point,
            GeometryType::LineString,
            GeometryType::MultiPoint,
            GeometryType::Polygon,
        ]),
        Topology {
            geometry_offsets: Some(vec![0, 1, 2, 4, 5]),
            part_offsets: Some(vec![0, 1, 2, 3, 4, 5]),
            ring_offsets: Some(vec![0, 1, 3, 4, 5, 8]),
        },
        None,
        VertexBuffer::Vec2(vec![
            1, 1, // point
            2, 2, 3, 3, // line
            4, 4, 5, 5, // multipoint
            0, 0, 6, 0, 6, 6, // polygon
        ]),
    )
}

#[test]
fn mixed_types_walk_normalized_offsets() {
    let v = mixed();
    assert_eq!(v.size(), 4);
    let geometries = v.geometries().unwrap();
    assert_eq!(geometries[0], Geometry::Point(c(1, 1)));
    assert_eq!(geometries[1], Geometry::LineString(vec![c(2, 2), c(3, 3)]));
    assert_eq!(geometries[2], Geometry::MultiPoint(vec![c(4, 4), c(5, 5)]));
    assert_eq!(
        geometries[3],
        Geometry::Polygon(vec![vec![c(0, 0), c(6, 0), c(6, 6), c(0, 0)]])
    );
}

#[test]
fn type_filter_includes_multi_part_counterpart() {
    let v = mixed();
    assert_eq!(v.filter(GeometryType::Point).as_slice(), &[0, 2]);
    assert_eq!(v.filter(GeometryType::LineString).as_slice(), &[1]);

    let mut sel = SelectionVector::new(vec![3, 2, 1]);
    v.filter_selected(GeometryType::Polygon, &mut sel);
    assert_eq!(sel.as_slice(), &[3]);
}

#[test]
fn const_type_filter_is_all_or_nothing() {
    let v = GeometryVector::new(
        3,
        GeometryTypes::Const(GeometryType::MultiLineString),
        Topology::default(),
        None,
        VertexBuffer::Vec2(Vec::new()),
    );
    assert_eq!(v.filter(GeometryType::LineString).limit(), 3);
    assert_eq!(v.filter(GeometryType::Point).limit(), 0);
}

#[test]
fn morton_vertices_resolve_through_vertex_offsets() {
    let v = GeometryVector::new(
        1,
        GeometryTypes::Const(GeometryType::LineString),
        Topology {
            geometry_offsets: None,
            part_offsets: Some(vec![0, 3]),
            ring_offsets: None,
        },
        Some(vec![0, 1, 0]),
        VertexBuffer::Morton {
            codes: vec![0, 3],
            settings: MortonSettings {
                num_bits: 2,
                coordinate_shift: 0,
            },
        },
    );
    assert_eq!(
        v.geometry(0).unwrap(),
        Some(&Geometry::LineString(vec![c(0, 0), c(1, 1), c(0, 0)]))
    );
}

#[test]
fn dangling_vertex_offset_is_corrupt() {
    let v = GeometryVector::new(
        1,
        GeometryTypes::Const(GeometryType::Point),
        Topology::default(),
        Some(vec![4]),
        VertexBuffer::Vec2(vec![1, 2]),
    );
    assert!(matches!(v.geometries(), Err(DecodeError::CorruptStream(_))));
}

#[test]
fn multi_point_span_beyond_the_vertices_is_corrupt() {
    let v = GeometryVector::new(
        1,
        GeometryTypes::Const(GeometryType::MultiPoint),
        Topology {
            geometry_offsets: Some(vec![0, u32::MAX]),
            part_offsets: None,
            ring_offsets: None,
        },
        None,
        VertexBuffer::Vec2(vec![1, 2]),
    );
    assert_eq!(v.num_vertex_refs(), 1);
    assert!(matches!(v.geometries(), Err(DecodeError::CorruptStream(_))));
}

#[test]
fn const_rows_beyond_the_vertices_are_corrupt() {
    let v = GeometryVector::new(
        usize::MAX / 2,
        GeometryTypes::Const(GeometryType::Point),
        Topology::default(),
        None,
        VertexBuffer::Vec2(Vec::new()),
    );
    assert!(matches!(v.geometries(), Err(DecodeError::CorruptStream(_))));
}

#[test]
fn vertex_refs_count_offsets_when_present() {
    let v = GeometryVector::new(
        3,
        GeometryTypes::Const(GeometryType::Point),
        Topology::default(),
        Some(vec![0, 0, 0]),
        VertexBuffer::Vec2(vec![5, 6]),
    );
    assert_eq!(v.num_vertex_refs(), 3);
    assert_eq!(v.vertices().num_vertices(), 1);
    assert_eq!(v.geometry(2).unwrap(), Some(&Geometry::Point(c(5, 6))));
}
