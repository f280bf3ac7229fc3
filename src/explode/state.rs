//! Code trees of an imploded stream
//!
//! This module reads the compressed code-length descriptions at the start of
//! the stream and builds the literal, length and distance decode tables.

use super::{
    DISTANCE_TABLE_BITS, LARGE_DISTANCE_TABLE_BITS, LARGE_INPUT_THRESHOLD, LENGTH_TABLE_BITS,
    LITERAL_SYMBOLS, LITERAL_TABLE_BITS, MATCH_SYMBOLS,
};
use crate::bits::BitReader;
use crate::common::ExplodeConfig;
use crate::huffman::{self, BuildStatus, HuffmanTable};
use crate::tables::{CPDIST4, CPDIST8, CPLEN2, CPLEN3, EXTRA};
use crate::{DecodeError, Result};
use log::debug;

/// Decode tables for one imploded stream
#[derive(Debug, Clone)]
pub struct ExplodeState {
    /// Stream variant
    pub config: ExplodeConfig,
    /// Literal table, present only with coded literals
    pub literal: Option<HuffmanTable>,
    /// Match length table
    pub length: HuffmanTable,
    /// High distance bits table
    pub distance: HuffmanTable,
}

impl ExplodeState {
    /// Read the code-length descriptions and build all tables
    pub fn read_trees(reader: &mut BitReader<'_>, config: ExplodeConfig) -> Result<Self> {
        let distance_bits = if reader.len() > LARGE_INPUT_THRESHOLD {
            LARGE_DISTANCE_TABLE_BITS
        } else {
            DISTANCE_TABLE_BITS
        };

        let literal = if config.coded_literals {
            let lengths = read_code_lengths(reader, LITERAL_SYMBOLS)?;
            Some(build_table(
                "literal",
                &lengths,
                LITERAL_SYMBOLS,
                &[],
                &[],
                LITERAL_TABLE_BITS,
            )?)
        } else {
            None
        };

        let lengths = read_code_lengths(reader, MATCH_SYMBOLS)?;
        let length_base: &[u16] = if config.coded_literals {
            &CPLEN3
        } else {
            &CPLEN2
        };
        let length = build_table(
            "length",
            &lengths,
            0,
            length_base,
            &EXTRA,
            LENGTH_TABLE_BITS,
        )?;

        let lengths = read_code_lengths(reader, MATCH_SYMBOLS)?;
        let distance_base: &[u16] = if config.large_window {
            &CPDIST8
        } else {
            &CPDIST4
        };
        let distance = build_table(
            "distance",
            &lengths,
            0,
            distance_base,
            &EXTRA,
            distance_bits,
        )?;

        Ok(Self {
            config,
            literal,
            length,
            distance,
        })
    }
}

/// Expand one compressed code-length description of `count` symbols
///
/// The first byte holds the number of following bytes minus one. Each of
/// those packs a code length minus one in its low nibble and a repeat count
/// minus one in its high nibble.
pub fn read_code_lengths(reader: &mut BitReader<'_>, count: usize) -> Result<Vec<u8>> {
    let pairs = reader.read_byte() as usize + 1;
    let mut lengths = Vec::with_capacity(count);

    for _ in 0..pairs {
        let byte = reader.read_byte();
        let bits = (byte & 0x0F) + 1;
        let repeat = (byte >> 4) as usize + 1;
        if lengths.len() + repeat > count {
            return Err(DecodeError::InvalidCodeLengths);
        }
        lengths.extend(std::iter::repeat(bits).take(repeat));
    }

    if lengths.len() != count {
        return Err(DecodeError::InvalidCodeLengths);
    }
    Ok(lengths)
}

fn build_table(
    name: &str,
    lengths: &[u8],
    simple: usize,
    base: &[u16],
    extra: &[u8],
    max_bits: u32,
) -> Result<HuffmanTable> {
    let table = huffman::build(lengths, simple, base, extra, max_bits)?;
    if table.status() == BuildStatus::Incomplete {
        debug!("{name} tree is incomplete; unused codes are invalid");
    }
    Ok(table)
}
