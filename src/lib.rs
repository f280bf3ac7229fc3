//! legacy-unzip - Rust decoders for the legacy PKZIP compression methods
//!
//! This crate decodes the three compression methods that zip archives used
//! before Deflate took over: Shrink (method 1), Reduce (methods 2-5) and
//! Implode (method 6). It works on single entries: the caller extracts the
//! compressed bytes and header fields from the archive and supplies an
//! output buffer of the declared uncompressed size.
//!
//! # Features
//!
//! - **Explode** - all four Implode variants (4K/8K window, raw/coded literals)
//! - **Unshrink** - LZW with 9 to 13 bit codes and partial clearing
//! - **Unreduce** - follower-set decoding with reduction factors 1-4
//! - Pooled working memory shared safely between threads
//! - CRC-32 for checking decoded entries
//! - Async batch decoding (`async` feature)
//!
//! # Example
//!
//! ```no_run
//! use legacy_unzip::{Decompressor, EntryInfo};
//!
//! // Method, general purpose flag and sizes come from the zip entry header
//! let compressed = std::fs::read("entry.bin")?;
//! let entry = EntryInfo::new(6, 0x0004, compressed.len(), 4096);
//!
//! let decompressor = Decompressor::new();
//! let decoded = decompressor.decompress_to_vec(&entry, &compressed)?;
//! assert_eq!(decoded.len(), 4096);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Public modules
pub mod bits;
pub mod common;
pub mod crc32;
pub mod decompressor;
pub mod error;
pub mod explode;
pub mod huffman;
pub mod pool;
pub mod tables;
pub mod unreduce;
pub mod unshrink;
pub mod window;

// Async modules (only available with async feature)
#[cfg(feature = "async")]
pub mod async_batch;

// Re-export commonly used types
pub use common::{
    CompressionMethod, DecodeStats, EntryInfo, ExplodeConfig, ReduceFactor, HSIZE, MAX_BITS,
    WSIZE,
};
pub use crc32::{crc32, crc32_update};
pub use decompressor::Decompressor;
pub use error::{DecodeError, Result};
pub use explode::{ExplodeOutcome, ExplodeStatus};
pub use unreduce::Followers;
pub use unshrink::LzwTree;

// Re-export async types when async feature is enabled
#[cfg(feature = "async")]
pub use async_batch::AsyncBatchDecoder;

// Convenience functions

/// Decode one zip entry into a new buffer
///
/// # Arguments
/// * `entry` - Method, flags and sizes from the entry header
/// * `data` - The compressed bytes of the entry
///
/// # Returns
/// A vector holding the decoded bytes
pub fn decompress_bytes(entry: &EntryInfo, data: &[u8]) -> Result<Vec<u8>> {
    Decompressor::new().decompress_to_vec(entry, data)
}
