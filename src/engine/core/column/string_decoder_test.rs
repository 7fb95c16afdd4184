use crate::engine::core::column::string_decoder::{decode_shared_dictionary, decode_string_column};
use crate::engine::core::encoding::SliceCursor;
use crate::engine::core::metadata::{DictionaryType, LengthType, OffsetType};
use crate::engine::core::vector::{BitVector, StringData};
use crate::engine::errors::DecodeError;
use crate::test_helpers::factories::MetadataFactory;
use crate::test_helpers::factories::stream_factory::encode_varint;
use crate::test_helpers::factory::Factory;
use std::collections::HashSet;

fn values(vector: &crate::engine::core::vector::StringVector) -> Vec<Option<String>> {
    (0..vector.size())
        .map(|i| vector.get(i).unwrap().map(|s| s.into_owned()))
        .collect()
}

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

#[test]
fn plain_strings() {
    let bytes = [
        Factory::length_stream(LengthType::VarBinary)
            .with_varints(&[3, 0, 5])
            .create(),
        Factory::data_stream(DictionaryType::None)
            .with_bytes(b"foohello", 8)
            .create(),
    ]
    .concat();
    let mut cursor = SliceCursor::new(&bytes);
    let vector = decode_string_column(&mut cursor, "name", 2, None).unwrap();

    assert_eq!(values(&vector), vec![some("foo"), some(""), some("hello")]);
    assert!(matches!(vector.data(), StringData::Plain { .. }));
    assert!(cursor.is_at_end());
}

#[test]
fn plain_strings_with_nulls() {
    let bytes = [
        Factory::length_stream(LengthType::VarBinary)
            .with_varints(&[2, 3])
            .create(),
        Factory::data_stream(DictionaryType::None)
            .with_bytes(b"abcde", 5)
            .create(),
    ]
    .concat();
    let present = BitVector::from_bools(&[true, false, true]);
    let vector =
        decode_string_column(&mut SliceCursor::new(&bytes), "name", 2, Some(present)).unwrap();

    assert_eq!(values(&vector), vec![some("ab"), None, some("cde")]);
}

#[test]
fn single_dictionary() {
    let bytes = [
        Factory::offset_stream(OffsetType::String)
            .with_varints(&[1, 0, 1])
            .create(),
        Factory::length_stream(LengthType::Dictionary)
            .with_varints(&[2, 3])
            .create(),
        Factory::data_stream(DictionaryType::Single)
            .with_bytes(b"abcde", 2)
            .create(),
    ]
    .concat();
    let vector = decode_string_column(&mut SliceCursor::new(&bytes), "class", 3, None).unwrap();

    assert_eq!(values(&vector), vec![some("cde"), some("ab"), some("cde")]);
    assert!(matches!(vector.data(), StringData::Dictionary { .. }));
}

#[test]
fn dictionary_index_out_of_range() {
    let bytes = [
        Factory::offset_stream(OffsetType::String)
            .with_varints(&[0, 2])
            .create(),
        Factory::length_stream(LengthType::Dictionary)
            .with_varints(&[2, 3])
            .create(),
        Factory::data_stream(DictionaryType::Single)
            .with_bytes(b"abcde", 2)
            .create(),
    ]
    .concat();
    let err = decode_string_column(&mut SliceCursor::new(&bytes), "class", 3, None).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::CorruptDictionaryIndex { index: 2, size: 2 }
    ));
}

#[test]
fn fsst_dictionary_expands_lazily() {
    // symbols "AB" and "C"; entries "ABC" and "xAB"
    let bytes = [
        Factory::data_stream(DictionaryType::Fsst)
            .with_bytes(b"ABC", 2)
            .create(),
        Factory::length_stream(LengthType::Symbol)
            .with_varints(&[2, 1])
            .create(),
        Factory::length_stream(LengthType::Dictionary)
            .with_varints(&[3, 3])
            .create(),
        Factory::data_stream(DictionaryType::Single)
            .with_bytes(&[0, 1, 255, b'x', 0], 2)
            .create(),
        Factory::offset_stream(OffsetType::String)
            .with_varints(&[1, 0])
            .create(),
    ]
    .concat();
    let vector = decode_string_column(&mut SliceCursor::new(&bytes), "name", 5, None).unwrap();

    let StringData::Dictionary { dictionary, .. } = vector.data() else {
        panic!("expected a dictionary vector");
    };
    assert!(dictionary.is_fsst());
    assert!(!dictionary.is_materialized());
    assert_eq!(values(&vector), vec![some("xAB"), some("ABC")]);
    assert!(dictionary.is_materialized());
}

#[test]
fn empty_streams_are_skipped() {
    let bytes = [
        Factory::offset_stream(OffsetType::String).with_varints(&[]).create(),
        Factory::length_stream(LengthType::VarBinary)
            .with_varints(&[1])
            .create(),
        Factory::data_stream(DictionaryType::None)
            .with_bytes(b"z", 1)
            .create(),
    ]
    .concat();
    let vector = decode_string_column(&mut SliceCursor::new(&bytes), "s", 3, None).unwrap();
    assert_eq!(values(&vector), vec![some("z")]);
}

fn shared_dictionary_bytes() -> Vec<u8> {
    let mut bytes = [
        Factory::length_stream(LengthType::Dictionary)
            .with_varints(&[3, 2])
            .create(),
        Factory::data_stream(DictionaryType::Shared)
            .with_bytes(b"fooba", 2)
            .create(),
    ]
    .concat();
    // default child: both rows present
    encode_varint(&mut bytes, 2);
    bytes.extend(Factory::present_stream().with_booleans(&[true, true]).create());
    bytes.extend(
        Factory::offset_stream(OffsetType::String)
            .with_varints(&[0, 1])
            .create(),
    );
    // "en" child: second row only
    encode_varint(&mut bytes, 2);
    bytes.extend(Factory::present_stream().with_booleans(&[false, true]).create());
    bytes.extend(
        Factory::offset_stream(OffsetType::String)
            .with_varints(&[1])
            .create(),
    );
    // "de" child absent from this tile
    encode_varint(&mut bytes, 0);
    bytes
}

#[test]
fn shared_dictionary_children() {
    let column = MetadataFactory::shared_struct("name", &["default", "en", "de"]);
    let bytes = shared_dictionary_bytes();
    let mut cursor = SliceCursor::new(&bytes);
    let vectors = decode_shared_dictionary(&mut cursor, &column, None).unwrap();

    assert_eq!(vectors.len(), 2);
    assert_eq!(vectors[0].name(), "name");
    assert_eq!(values(&vectors[0]), vec![some("foo"), some("ba")]);
    assert_eq!(vectors[1].name(), "name:en");
    assert_eq!(values(&vectors[1]), vec![None, some("ba")]);
    assert!(cursor.is_at_end());
}

#[test]
fn shared_dictionary_prunes_children() {
    let column = MetadataFactory::shared_struct("name", &["default", "en", "de"]);
    let bytes = shared_dictionary_bytes();
    let wanted: HashSet<String> = ["name:en".to_string()].into_iter().collect();
    let mut cursor = SliceCursor::new(&bytes);
    let vectors = decode_shared_dictionary(&mut cursor, &column, Some(&wanted)).unwrap();

    assert_eq!(vectors.len(), 1);
    assert_eq!(vectors[0].name(), "name:en");
    assert!(cursor.is_at_end());
}
