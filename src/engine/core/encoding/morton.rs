/// Z-order curve parameters attached to morton-encoded vertex streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MortonSettings {
    pub num_bits: u32,
    pub coordinate_shift: u32,
}

fn decode_component(code: u32, num_bits: u32) -> u32 {
    let mut coordinate = 0u32;
    for i in 0..num_bits.min(16) {
        coordinate |= (code & (1u32 << (2 * i))) >> i;
    }
    coordinate
}

/// Splits a morton code into its x/y coordinates.
pub fn decode_morton(code: u32, settings: MortonSettings) -> (i32, i32) {
    let shift = settings.coordinate_shift as i32;
    let x = decode_component(code, settings.num_bits) as i32 - shift;
    let y = decode_component(code >> 1, settings.num_bits) as i32 - shift;
    (x, y)
}
