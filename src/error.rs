//! Error handling for legacy PKZIP decoding
//!
//! This module defines the error type shared by every decoder. Each variant
//! maps back to the numeric status the historical decoders returned, so a
//! caller that still speaks in those codes can use [`DecodeError::legacy_code`].

use thiserror::Error;

/// Legacy status: invalid code reached while decoding
pub const LEGACY_INVALID_CODE: i32 = 1;

/// Legacy status: invalid table input, or generic failure (PK_ERR)
pub const LEGACY_ERROR: i32 = 2;

/// Legacy status: malformed code-length description
pub const LEGACY_BAD_LENGTHS: i32 = 4;

/// Error type for decoding operations
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Output buffer cannot hold the declared uncompressed size
    #[error("Output buffer too small: {requested} bytes requested, capacity is {capacity}")]
    OutputTooSmall {
        /// Declared uncompressed size
        requested: usize,
        /// Capacity of the buffer supplied by the caller
        capacity: usize,
    },

    /// Window size not a power of two, or larger than the working buffer
    #[error("Invalid window: {size} bytes requested, slide holds {capacity}")]
    InvalidWindow {
        /// Requested window size
        size: usize,
        /// Length of the working buffer
        capacity: usize,
    },

    /// Code-length description overflowed or fell short of the symbol count
    #[error("Malformed code length table")]
    InvalidCodeLengths,

    /// More codes than the bit lengths allow
    #[error("Oversubscribed Huffman code lengths")]
    Oversubscribed,

    /// A code length above the 16 bit maximum
    #[error("Invalid code length: {0} (maximum is 16)")]
    CodeLengthTooLong(u8),

    /// Non-simple symbols without matching base/extra tables
    #[error("Missing base values for non-simple symbols")]
    MissingBaseValues,

    /// The stream selected a Huffman entry that has no symbol
    #[error("Invalid Huffman code in compressed stream")]
    InvalidCode,

    /// Shrink stream asked for codes wider than 13 bits
    #[error("LZW code width exceeded {0} bits")]
    CodeWidthOverflow(u32),

    /// Shrink string did not fit the decode stack
    #[error("LZW decode stack underflow")]
    StackUnderflow,

    /// No free slot left for a new Shrink code
    #[error("LZW code table exhausted")]
    TreeExhausted,

    /// Reduce factor outside 1..=4
    #[error("Invalid reduction factor: {0} (expected 1, 2, 3, or 4)")]
    InvalidFactor(u8),

    /// Zip compression method that this crate does not decode
    #[error("Unsupported compression method: {0}")]
    UnsupportedMethod(u16),

    /// Decoder produced a different amount of data than declared
    #[error("Size mismatch: expected {expected} bytes, decoded {actual}")]
    SizeMismatch {
        /// Declared uncompressed size
        expected: usize,
        /// Number of bytes the decoder produced
        actual: usize,
    },

    /// A background decode task panicked or was cancelled
    #[error("Decode task failed: {0}")]
    TaskFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Numeric status the historical decoders returned for this failure
    ///
    /// Errors that had no in-stream code (configuration, dispatch and I/O
    /// failures) report `-1`.
    pub fn legacy_code(&self) -> i32 {
        match self {
            DecodeError::InvalidCode => LEGACY_INVALID_CODE,
            DecodeError::Oversubscribed
            | DecodeError::CodeLengthTooLong(_)
            | DecodeError::MissingBaseValues
            | DecodeError::CodeWidthOverflow(_)
            | DecodeError::StackUnderflow
            | DecodeError::TreeExhausted => LEGACY_ERROR,
            DecodeError::InvalidCodeLengths => LEGACY_BAD_LENGTHS,
            _ => -1,
        }
    }
}

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;
