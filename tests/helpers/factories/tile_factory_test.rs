use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::encoding::varint::decode_varint_u32;
use crate::test_helpers::factories::tile_factory::encode_column;
use crate::test_helpers::factory::Factory;

#[test]
fn test_tile_factory_writes_block_header() {
    let column = encode_column(&[vec![0xaa, 0xbb]]);
    let tile = Factory::tile().with_table(3, 4096, 7, vec![column]).create();

    let mut cursor = SliceCursor::new(&tile);
    assert_eq!(cursor.read_u8().unwrap(), 1);
    assert_eq!(decode_varint_u32(&mut cursor).unwrap(), 3);
    assert_eq!(decode_varint_u32(&mut cursor).unwrap(), 3);
    assert_eq!(decode_varint_u32(&mut cursor).unwrap(), 4096);
    assert_eq!(decode_varint_u32(&mut cursor).unwrap(), 8192);
    assert_eq!(decode_varint_u32(&mut cursor).unwrap(), 7);
    assert_eq!(cursor.remaining(), 3);
}

#[test]
fn test_encode_column_prefixes_stream_count() {
    assert_eq!(encode_column(&[vec![1], vec![2, 3]]), vec![2, 1, 2, 3]);
    assert_eq!(encode_column(&[]), vec![0]);
}
