use crate::engine::core::encoding::morton::{MortonSettings, decode_morton};

fn encode(x: u32, y: u32, num_bits: u32) -> u32 {
    let mut code = 0;
    for i in 0..num_bits {
        code |= ((x >> i) & 1) << (2 * i);
        code |= ((y >> i) & 1) << (2 * i + 1);
    }
    code
}

#[test]
fn interleaved_bits_round_back_to_coordinates() {
    let settings = MortonSettings {
        num_bits: 13,
        coordinate_shift: 0,
    };
    for (x, y) in [(0, 0), (1, 0), (0, 1), (4095, 17), (1234, 4321)] {
        assert_eq!(decode_morton(encode(x, y, 13), settings), (x as i32, y as i32));
    }
}

#[test]
fn coordinate_shift_restores_negative_values() {
    let settings = MortonSettings {
        num_bits: 8,
        coordinate_shift: 16,
    };
    assert_eq!(decode_morton(encode(6, 20, 8), settings), (-10, 4));
}
