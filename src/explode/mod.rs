//! Explode: decoder for PKZIP method 6 (Implode)
//!
//! An imploded stream starts with two or three compressed code-length
//! descriptions (literal, length and distance trees) followed by a mix of
//! literals and distance/length pairs. Two bits of the zip general purpose
//! flag select Huffman coded literals and an 8K instead of a 4K window.
//!
//! The four stream variants share one decoder parameterized by
//! [`ExplodeConfig`](crate::ExplodeConfig).

mod decoder;
mod state;

pub use state::ExplodeState;

use crate::bits::BitReader;
use crate::common::{check_output, DecodeStats, ExplodeConfig};
use crate::window::{Window, WINDOW_SIZE};
use crate::Result;

/// Root table width for the literal tree
pub const LITERAL_TABLE_BITS: u32 = 9;

/// Root table width for the length tree
pub const LENGTH_TABLE_BITS: u32 = 7;

/// Root table width for the distance tree
pub const DISTANCE_TABLE_BITS: u32 = 7;

/// Root table width for the distance tree on large inputs
pub const LARGE_DISTANCE_TABLE_BITS: u32 = 8;

/// Compressed size above which the wider distance table is used
pub const LARGE_INPUT_THRESHOLD: usize = 200_000;

/// Number of literal symbols
pub const LITERAL_SYMBOLS: usize = 256;

/// Number of length and of distance symbols
pub const MATCH_SYMBOLS: usize = 64;

/// How the input cursor ended up relative to the compressed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplodeStatus {
    /// Input consumed exactly
    Complete = 0,
    /// Input over-read or left unread; output is still usable
    InputMismatch = 5,
}

impl ExplodeStatus {
    /// Numeric status in the historical encoding
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Result of a successful explode call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplodeOutcome {
    /// Bytes written to the output buffer
    pub written: usize,
    /// Input bytes read, including any read past the end
    pub consumed: usize,
    /// Whether the input was consumed exactly
    pub status: ExplodeStatus,
    /// Literal and match counts
    pub stats: DecodeStats,
}

/// Decode an imploded stream into `output[..size]`
///
/// `slide` is the working buffer; one shorter than [`WINDOW_SIZE`] fails
/// with [`InvalidWindow`](crate::DecodeError::InvalidWindow). `flags` is the general purpose bit
/// flag of the zip entry. `input` must
/// already be truncated to the entry's compressed size.
pub fn explode(
    slide: &mut [u8],
    flags: u16,
    input: &[u8],
    output: &mut [u8],
    size: usize,
) -> Result<ExplodeOutcome> {
    check_output(size, output)?;

    let config = ExplodeConfig::from_flags(flags);
    let mut reader = BitReader::new(input);
    let state = ExplodeState::read_trees(&mut reader, config)?;

    let mut window = Window::new(slide, WINDOW_SIZE, &mut output[..size])?;
    let stats = state.decode(&mut reader, &mut window, size)?;
    let written = window.finish();

    let consumed = reader.position();
    let status = if consumed == input.len() {
        ExplodeStatus::Complete
    } else {
        ExplodeStatus::InputMismatch
    };

    Ok(ExplodeOutcome {
        written,
        consumed,
        status,
        stats,
    })
}
