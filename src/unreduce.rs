//! Unreduce: decoder for PKZIP methods 2-5 (Reduce)
//!
//! A reduced stream has two layers. The lower layer predicts every byte from
//! the byte before it: a preamble lists up to 63 likely followers for each
//! of the 256 byte values, and a byte is sent either as a short index into
//! that list or as a raw 8-bit value. The upper layer is a run-length style
//! expansion in which the escape byte `0x90` introduces a literal `0x90` or
//! a back-reference whose length and distance bits are split according to
//! the reduction factor.

use crate::bits::BitReader;
use crate::common::{check_output, ReduceFactor};
use crate::tables::FOLLOWER_INDEX_BITS;
use crate::window::{Window, WINDOW_SIZE};
use crate::Result;

/// Escape byte of the expansion layer
pub const DLE: u8 = 0x90;

/// Capacity of one follower set
pub const MAX_FOLLOWERS: usize = 64;

/// Shortest back-reference
pub const MIN_MATCH: usize = 3;

/// Mask applied to back-reference distances
pub const DISTANCE_MASK: usize = 0x3FFF;

/// Per-byte follower sets read from the stream preamble
#[derive(Debug, Clone)]
pub struct Followers {
    counts: [u8; 256],
    sets: Vec<[u8; MAX_FOLLOWERS]>,
}

impl Followers {
    /// Read the preamble: for every byte value from 255 down to 0, a 6-bit
    /// count followed by that many 8-bit followers
    pub fn read(reader: &mut BitReader<'_>) -> Self {
        let mut counts = [0u8; 256];
        let mut sets = vec![[0u8; MAX_FOLLOWERS]; 256];

        for byte in (0..256).rev() {
            let count = reader.read_bits(6) as usize;
            counts[byte] = count as u8;
            for slot in sets[byte].iter_mut().take(count) {
                *slot = reader.read_bits(8) as u8;
            }
        }

        Self { counts, sets }
    }

    /// Followers recorded for `last`
    pub fn of(&self, last: u8) -> &[u8] {
        let count = self.counts[last as usize] as usize;
        &self.sets[last as usize][..count]
    }

    /// Decode the byte following `last`
    pub fn next_byte(&self, reader: &mut BitReader<'_>, last: u8) -> u8 {
        let count = self.counts[last as usize] as usize;
        if count == 0 || reader.read_bits(1) != 0 {
            return reader.read_bits(8) as u8;
        }
        let index = reader.read_bits(FOLLOWER_INDEX_BITS[count] as u32) as usize;
        self.sets[last as usize][index]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Literal,
    Escape,
    LengthExtension,
    Distance,
}

/// Decode a reduced stream into `output[..size]`
///
/// `slide` is the working buffer (at least [`WINDOW_SIZE`] bytes, or the
/// call fails with [`InvalidWindow`](crate::DecodeError::InvalidWindow)). Decoding
/// stops when `size` bytes have been produced or the input runs out; the
/// return value is the number of bytes written, which the caller compares
/// against `size`.
pub fn unreduce(
    slide: &mut [u8],
    factor: ReduceFactor,
    input: &[u8],
    output: &mut [u8],
    size: usize,
) -> Result<usize> {
    check_output(size, output)?;

    let mut reader = BitReader::new(input);
    let followers = Followers::read(&mut reader);
    let mut window = Window::new(slide, WINDOW_SIZE, &mut output[..size])?;

    let mut state = State::Literal;
    let mut last = 0u8;
    let mut value = 0u8;
    let mut length = 0usize;

    while !reader.is_exhausted() && window.produced() < size {
        let byte = followers.next_byte(&mut reader, last);
        last = byte;

        state = match state {
            State::Literal if byte == DLE => State::Escape,
            State::Literal => {
                window.push(byte);
                State::Literal
            }
            State::Escape if byte == 0 => {
                window.push(DLE);
                State::Literal
            }
            State::Escape => {
                value = byte;
                length = factor.length(value);
                if length == factor.length_mask() {
                    State::LengthExtension
                } else {
                    State::Distance
                }
            }
            State::LengthExtension => {
                length += byte as usize;
                State::Distance
            }
            State::Distance => {
                let distance = factor.distance(value, byte) & DISTANCE_MASK;
                window.copy_match(distance, length + MIN_MATCH);
                State::Literal
            }
        };
    }

    Ok(window.finish())
}
