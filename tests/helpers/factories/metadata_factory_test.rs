use crate::engine::core::metadata::tileset::{ColumnKind, ComplexType, ScalarType};
use crate::test_helpers::factories::MetadataFactory;
use crate::test_helpers::factory::Factory;

#[test]
fn test_metadata_factory_builds_tables_in_order() {
    let metadata = Factory::metadata()
        .with_table("roads", vec![MetadataFactory::geometry()])
        .with_table(
            "pois",
            vec![
                MetadataFactory::id(ScalarType::Uint32, false),
                MetadataFactory::scalar("rank", ScalarType::Int32, true),
            ],
        )
        .create();

    assert_eq!(metadata.feature_table(0).unwrap().name, "roads");
    let pois = metadata.feature_table(1).unwrap();
    assert!(pois.columns[0].is_id());
    assert_eq!(pois.columns[1].kind(), ColumnKind::Scalar(ScalarType::Int32));
    assert!(pois.columns[1].nullable);
}

#[test]
fn test_shared_struct_has_string_children() {
    let column = MetadataFactory::shared_struct("name", &["default", "en"]);
    assert_eq!(column.kind(), ColumnKind::Complex(Some(ComplexType::Struct)));
    assert_eq!(column.children().len(), 2);
    assert_eq!(column.children()[1].scalar_type(), Some(ScalarType::String));
}
