use crate::engine::core::column::bit_stream::decode_bit_stream;
use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::metadata::StreamMetadata;
use crate::test_helpers::factory::Factory;

#[test]
fn decodes_lsb_first_bitmap() {
    let bits = [true, false, true, true, false, false, false, false, true, false];
    let bytes = Factory::present_stream().with_booleans(&bits).create();
    let mut cursor = SliceCursor::new(&bytes);
    let metadata = StreamMetadata::decode(&mut cursor).unwrap();

    let vector = decode_bit_stream(&mut cursor, &metadata).unwrap();
    assert_eq!(vector.size(), 10);
    for (i, &bit) in bits.iter().enumerate() {
        assert_eq!(vector.get(i), bit, "bit {}", i);
    }
    assert!(cursor.is_at_end());
}

#[test]
fn cursor_lands_on_declared_stream_end() {
    // run of three 0xff, only one byte needed for 8 bits, plus a trailing pad byte
    let bytes = Factory::present_stream()
        .with_bytes(&[0x00, 0xff, 0xee], 8)
        .create();
    let mut cursor = SliceCursor::new(&bytes);
    let metadata = StreamMetadata::decode(&mut cursor).unwrap();

    let vector = decode_bit_stream(&mut cursor, &metadata).unwrap();
    assert_eq!(vector.count_ones(), 8);
    assert!(cursor.is_at_end());
}
