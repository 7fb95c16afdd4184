use crate::engine::core::encoding::byte_rle::{bytes_for_bits, decode_byte_rle};
use crate::engine::core::encoding::slice_cursor::SliceCursor;
use crate::engine::errors::DecodeError;

#[test]
fn expands_runs() {
    // run of 0 + 3 copies of 0xaa, run of 2 + 3 copies of 0x01
    let buf = [0x00, 0xaa, 0x02, 0x01];
    let mut c = SliceCursor::new(&buf);
    let out = decode_byte_rle(&mut c, 8).unwrap();
    assert_eq!(out, vec![0xaa, 0xaa, 0xaa, 0x01, 0x01, 0x01, 0x01, 0x01]);
    assert!(c.is_at_end());
}

#[test]
fn copies_literals() {
    // 0xfe = 2 literals
    let buf = [0xfe, 0x05, 0x07];
    let mut c = SliceCursor::new(&buf);
    assert_eq!(decode_byte_rle(&mut c, 2).unwrap(), vec![0x05, 0x07]);
}

#[test]
fn mixes_runs_and_literals() {
    let buf = [0xff, 0x0f, 0x01, 0xf0];
    let mut c = SliceCursor::new(&buf);
    assert_eq!(
        decode_byte_rle(&mut c, 5).unwrap(),
        vec![0x0f, 0xf0, 0xf0, 0xf0, 0xf0]
    );
}

#[test]
fn truncates_final_run_to_requested_length() {
    let buf = [0x7f, 0x11];
    let mut c = SliceCursor::new(&buf);
    let out = decode_byte_rle(&mut c, 4).unwrap();
    assert_eq!(out, vec![0x11; 4]);
    assert_eq!(c.position(), 2);
}

#[test]
fn truncated_input_is_error() {
    let buf = [0xfc, 0x01];
    let mut c = SliceCursor::new(&buf);
    assert!(decode_byte_rle(&mut c, 4).is_err());
}

#[test]
fn huge_byte_count_runs_out_of_input() {
    let buf = [0x7f, 0x01];
    let mut c = SliceCursor::new(&buf);
    assert!(matches!(
        decode_byte_rle(&mut c, usize::MAX / 2),
        Err(DecodeError::UnexpectedEof { .. })
    ));
}

#[test]
fn bit_counts_round_up() {
    assert_eq!(bytes_for_bits(0), 0);
    assert_eq!(bytes_for_bits(1), 1);
    assert_eq!(bytes_for_bits(8), 1);
    assert_eq!(bytes_for_bits(9), 2);
}
