use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::metadata::{
    DictionaryType, LogicalLevelTechnique, PhysicalLevelTechnique, PhysicalStreamType,
    StreamMetadata,
};
use crate::test_helpers::factories::stream_factory::{encode_varint, zigzag_i32};
use crate::test_helpers::factory::Factory;

#[test]
fn test_stream_factory_header_round_trips() {
    let bytes = Factory::data_stream(DictionaryType::None)
        .with_logical(LogicalLevelTechnique::Delta, LogicalLevelTechnique::Rle)
        .with_rle(1, 5)
        .with_varints(&[5, 2])
        .create();

    let mut cursor = SliceCursor::new(&bytes);
    let metadata = StreamMetadata::decode(&mut cursor).unwrap();
    assert_eq!(metadata.physical_stream_type, PhysicalStreamType::Data);
    assert_eq!(metadata.physical_level_technique, PhysicalLevelTechnique::Varint);
    assert_eq!(metadata.num_values, 2);
    assert_eq!(metadata.byte_length, 2);
    assert_eq!(metadata.rle.map(|r| (r.runs, r.num_rle_values)), Some((1, 5)));
    assert_eq!(cursor.remaining(), 2);
}

#[test]
fn test_stream_factory_booleans_are_literal_rle() {
    let bytes = Factory::present_stream()
        .with_booleans(&[true, false, true])
        .create();
    // header(2) + num_values + byte_length + literal header + one byte
    assert_eq!(bytes[4..], [0xff, 0b0000_0101]);
}

#[test]
fn test_varint_and_zigzag_helpers() {
    let mut out = Vec::new();
    encode_varint(&mut out, 300);
    assert_eq!(out, vec![0xac, 0x02]);
    assert_eq!(zigzag_i32(-1), 1);
    assert_eq!(zigzag_i32(1), 2);
    assert_eq!(zigzag_i32(-3), 5);
}
