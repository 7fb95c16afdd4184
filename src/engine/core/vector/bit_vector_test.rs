use crate::engine::core::vector::bit_vector::BitVector;

#[test]
fn reads_bits_lsb_first() {
    // 0b0000_0101 -> rows 0 and 2, 0b1000_0000 -> row 15
    let bits = BitVector::new(vec![0b0000_0101, 0b1000_0000], 16);
    let set: Vec<usize> = (0..16).filter(|&i| bits.get(i)).collect();
    assert_eq!(set, vec![0, 2, 15]);
    assert_eq!(bits.count_ones(), 3);
}

#[test]
fn size_caps_readable_bits() {
    let bits = BitVector::new(vec![0xff], 3);
    assert_eq!(bits.size(), 3);
    assert!(bits.get(2));
    assert!(!bits.get(3));
    assert!(!bits.get(100));
}

#[test]
fn from_bools_matches_wire_layout() {
    let bits = BitVector::from_bools(&[true, false, true, false, false, false, false, false, true]);
    assert_eq!(bits.bytes(), &[0b0000_0101, 0b0000_0001]);
    assert_eq!(bits.size(), 9);
}

#[test]
fn set_flips_single_bit() {
    let mut bits = BitVector::from_bools(&[false; 10]);
    bits.set(9, true);
    assert!(bits.get(9));
    bits.set(9, false);
    assert!(!bits.get(9));
    bits.set(42, true);
    assert_eq!(bits.count_ones(), 0);
}
