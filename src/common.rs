//! Common types and constants for the legacy PKZIP decoders
//!
//! This module defines the method identifiers, per-method parameters and the
//! buffer geometry shared by Explode, Unshrink and Unreduce.

use crate::{DecodeError, Result};

/// Capacity of a pooled slide buffer (32 KiB)
pub const WSIZE: usize = 0x8000;

/// Largest Shrink code width in bits
pub const MAX_BITS: u32 = 13;

/// Number of Shrink codes (2^13)
pub const HSIZE: usize = 1 << MAX_BITS;

/// Bit in the general purpose flag selecting the 8K window for Implode
pub const FLAG_LARGE_WINDOW: u16 = 0x0002;

/// Bit in the general purpose flag selecting Huffman coded literals for Implode
pub const FLAG_CODED_LITERALS: u16 = 0x0004;

/// Zip compression methods handled by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Method 1, dynamic LZW
    Shrunk = 1,
    /// Method 2, reduced with factor 1
    Reduced1 = 2,
    /// Method 3, reduced with factor 2
    Reduced2 = 3,
    /// Method 4, reduced with factor 3
    Reduced3 = 4,
    /// Method 5, reduced with factor 4
    Reduced4 = 5,
    /// Method 6, imploded
    Imploded = 6,
}

impl CompressionMethod {
    /// Create a CompressionMethod from the zip header method id
    pub fn from_u16(value: u16) -> Result<Self> {
        match value {
            1 => Ok(CompressionMethod::Shrunk),
            2 => Ok(CompressionMethod::Reduced1),
            3 => Ok(CompressionMethod::Reduced2),
            4 => Ok(CompressionMethod::Reduced3),
            5 => Ok(CompressionMethod::Reduced4),
            6 => Ok(CompressionMethod::Imploded),
            _ => Err(DecodeError::UnsupportedMethod(value)),
        }
    }

    /// Reduction factor for the Reduce methods, `None` otherwise
    pub fn reduce_factor(&self) -> Option<ReduceFactor> {
        match self {
            CompressionMethod::Reduced1 => Some(ReduceFactor::One),
            CompressionMethod::Reduced2 => Some(ReduceFactor::Two),
            CompressionMethod::Reduced3 => Some(ReduceFactor::Three),
            CompressionMethod::Reduced4 => Some(ReduceFactor::Four),
            _ => None,
        }
    }
}

/// Reduce compression factor (1-4)
///
/// The factor splits the byte following an escape into a length part and a
/// distance part: higher factors spend more bits on distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceFactor {
    /// Factor 1: 7 length bits, 1 distance bit
    One = 1,
    /// Factor 2: 6 length bits, 2 distance bits
    Two = 2,
    /// Factor 3: 5 length bits, 3 distance bits
    Three = 3,
    /// Factor 4: 4 length bits, 4 distance bits
    Four = 4,
}

impl ReduceFactor {
    /// Create a ReduceFactor from a raw value
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            1 => Ok(ReduceFactor::One),
            2 => Ok(ReduceFactor::Two),
            3 => Ok(ReduceFactor::Three),
            4 => Ok(ReduceFactor::Four),
            _ => Err(DecodeError::InvalidFactor(value)),
        }
    }

    /// Number of low bits carrying the match length
    pub fn length_bits(&self) -> u32 {
        8 - *self as u32
    }

    /// Mask for the length part; a length equal to it means an extension byte follows
    pub fn length_mask(&self) -> usize {
        (1 << self.length_bits()) - 1
    }

    /// Length part of the byte following an escape
    pub fn length(&self, value: u8) -> usize {
        value as usize & self.length_mask()
    }

    /// Backward distance built from the escape value and the next byte
    pub fn distance(&self, value: u8, low: u8) -> usize {
        ((value as usize >> self.length_bits()) << 8) + low as usize + 1
    }
}

/// Implode stream variant selected by the general purpose bit flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplodeConfig {
    /// Literals are Huffman coded (minimum match length 3)
    pub coded_literals: bool,
    /// 8K sliding window instead of 4K
    pub large_window: bool,
}

impl ExplodeConfig {
    /// Derive the configuration from a zip general purpose bit flag
    pub fn from_flags(flags: u16) -> Self {
        Self {
            coded_literals: flags & FLAG_CODED_LITERALS != 0,
            large_window: flags & FLAG_LARGE_WINDOW != 0,
        }
    }

    /// Shortest match the stream can encode
    pub fn min_match(&self) -> usize {
        if self.coded_literals {
            3
        } else {
            2
        }
    }

    /// Number of uncoded low distance bits (6 for 4K, 7 for 8K)
    pub fn distance_low_bits(&self) -> u32 {
        if self.large_window {
            7
        } else {
            6
        }
    }

    /// Window size addressed by the stream
    pub fn window_size(&self) -> usize {
        1 << (6 + self.distance_low_bits())
    }
}

/// Metadata of one zip entry needed to decode it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    /// Compression method id from the entry header
    pub method: u16,
    /// General purpose bit flag from the entry header
    pub flags: u16,
    /// Declared compressed size
    pub compressed_size: usize,
    /// Declared uncompressed size
    pub uncompressed_size: usize,
}

impl EntryInfo {
    /// Create entry metadata from header fields
    pub fn new(method: u16, flags: u16, compressed_size: usize, uncompressed_size: usize) -> Self {
        Self {
            method,
            flags,
            compressed_size,
            uncompressed_size,
        }
    }
}

/// Statistics for one decode call
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodeStats {
    /// Number of literal bytes decoded
    pub literal_count: usize,
    /// Number of back-references decoded
    pub match_count: usize,
    /// Longest back-reference decoded
    pub longest_match: usize,
}

/// Fail fast when the output cannot hold `requested` bytes
pub(crate) fn check_output(requested: usize, output: &[u8]) -> Result<()> {
    if requested > output.len() {
        return Err(DecodeError::OutputTooSmall {
            requested,
            capacity: output.len(),
        });
    }
    Ok(())
}
