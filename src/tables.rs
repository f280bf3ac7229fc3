//! Fixed tables used by the Implode and Reduce decoders

/// Match length bases for streams with uncoded literals (minimum match 2)
pub const CPLEN2: [u16; 64] = [
    2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27,
    28, 29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51,
    52, 53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 65,
];

/// Match length bases for streams with coded literals (minimum match 3)
pub const CPLEN3: [u16; 64] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28,
    29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45, 46, 47, 48, 49, 50, 51, 52,
    53, 54, 55, 56, 57, 58, 59, 60, 61, 62, 63, 64, 65, 66,
];

/// Extra bits per length symbol; only the last one carries an 8-bit extension
pub const EXTRA: [u8; 64] = {
    let mut table = [0u8; 64];
    table[63] = 8;
    table
};

/// Distance bases for the 4K window (6 uncoded low bits)
pub const CPDIST4: [u16; 64] = distance_bases(6);

/// Distance bases for the 8K window (7 uncoded low bits)
pub const CPDIST8: [u16; 64] = distance_bases(7);

const fn distance_bases(low_bits: u32) -> [u16; 64] {
    let mut table = [0u16; 64];
    let mut i = 0;
    while i < 64 {
        table[i] = ((i as u16) << low_bits) + 1;
        i += 1;
    }
    table
}

/// Bits needed to index a follower set of the given size (index 0 is unused)
pub const FOLLOWER_INDEX_BITS: [u8; 65] = {
    let mut table = [0u8; 65];
    table[0] = 8;
    let mut count = 1;
    while count < 65 {
        let mut bits = 1;
        while (1 << bits) < count {
            bits += 1;
        }
        table[count] = bits as u8;
        count += 1;
    }
    table
};
