//! Entry points for decoding zip entries
//!
//! A [`Decompressor`] owns the working-memory pools shared by all decode
//! calls made through it. It is `Sync`, so one instance can serve many
//! threads; every call borrows its own window or code tree for the duration
//! of the call.

use crate::common::{check_output, CompressionMethod, EntryInfo};
use crate::explode::{self, ExplodeOutcome};
use crate::pool::{Pool, DEFAULT_MAX_IDLE};
use crate::unreduce;
use crate::unshrink::{self, LzwTree};
use crate::window::Slide;
use crate::{DecodeError, ReduceFactor, Result};

/// Pooled decoder front-end for the legacy zip methods
#[derive(Debug)]
pub struct Decompressor {
    slides: Pool<Slide>,
    trees: Pool<LzwTree>,
}

impl Decompressor {
    /// Create a decompressor keeping up to four idle buffers per pool
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    /// Create a decompressor keeping up to `max_idle` idle buffers per pool
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            slides: Pool::with_max_idle(Slide::new, max_idle),
            trees: Pool::with_max_idle(LzwTree::new, max_idle),
        }
    }

    /// Decode an imploded (method 6) stream
    pub fn explode(
        &self,
        flags: u16,
        input: &[u8],
        output: &mut [u8],
        size: usize,
    ) -> Result<ExplodeOutcome> {
        check_output(size, output)?;
        let mut slide = self.slides.acquire();
        explode::explode(&mut slide, flags, input, output, size)
    }

    /// Decode a shrunk (method 1) stream; returns the number of bytes written
    pub fn unshrink(&self, input: &[u8], output: &mut [u8], size: usize) -> Result<usize> {
        check_output(size, output)?;
        let mut tree = self.trees.acquire();
        unshrink::unshrink(&mut tree, input, output, size)
    }

    /// Decode a reduced (methods 2-5) stream; returns the number of bytes written
    pub fn unreduce(
        &self,
        factor: ReduceFactor,
        input: &[u8],
        output: &mut [u8],
        size: usize,
    ) -> Result<usize> {
        check_output(size, output)?;
        let mut slide = self.slides.acquire();
        unreduce::unreduce(&mut slide, factor, input, output, size)
    }

    /// Decode one zip entry by its method id
    ///
    /// `data` is truncated to the declared compressed size. Explode succeeds
    /// even when the input was not consumed exactly; Unreduce must produce
    /// exactly the declared size. Returns the number of bytes written.
    pub fn decompress(&self, entry: &EntryInfo, data: &[u8], output: &mut [u8]) -> Result<usize> {
        let method = CompressionMethod::from_u16(entry.method)?;
        let input = &data[..entry.compressed_size.min(data.len())];
        let size = entry.uncompressed_size;

        match method {
            CompressionMethod::Imploded => {
                let outcome = self.explode(entry.flags, input, output, size)?;
                Ok(outcome.written)
            }
            CompressionMethod::Shrunk => self.unshrink(input, output, size),
            _ => {
                let factor = method
                    .reduce_factor()
                    .ok_or(DecodeError::UnsupportedMethod(entry.method))?;
                let written = self.unreduce(factor, input, output, size)?;
                if written != size {
                    return Err(DecodeError::SizeMismatch {
                        expected: size,
                        actual: written,
                    });
                }
                Ok(written)
            }
        }
    }

    /// Decode one zip entry into a new buffer of the declared size
    pub fn decompress_to_vec(&self, entry: &EntryInfo, data: &[u8]) -> Result<Vec<u8>> {
        CompressionMethod::from_u16(entry.method)?;
        let mut output = vec![0u8; entry.uncompressed_size];
        let written = self.decompress(entry, data, &mut output)?;
        output.truncate(written);
        Ok(output)
    }

    /// Idle sliding windows waiting for reuse
    pub fn idle_slides(&self) -> usize {
        self.slides.idle()
    }

    /// Idle LZW trees waiting for reuse
    pub fn idle_trees(&self) -> usize {
        self.trees.idle()
    }
}

impl Default for Decompressor {
    fn default() -> Self {
        Self::new()
    }
}
