//! Sliding window shared by the Implode and Reduce decoders
//!
//! The window is a power-of-two region at the start of a pooled [`Slide`].
//! Decoded bytes are staged in it and copied into the caller's output every
//! time it fills up. Until the first such flush, back-references that reach
//! before the start of the data read as zero bytes.

use crate::common::WSIZE;
use crate::error::{DecodeError, Result};
use std::ops::{Deref, DerefMut};

/// Window size used by Explode and Unreduce (16 KiB)
pub const WINDOW_SIZE: usize = WSIZE >> 1;

/// Pooled 32 KiB working buffer
#[derive(Debug, Clone)]
pub struct Slide {
    data: Box<[u8]>,
}

impl Slide {
    /// Allocate a zeroed slide
    pub fn new() -> Self {
        Self {
            data: vec![0; WSIZE].into_boxed_slice(),
        }
    }
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Slide {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for Slide {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Copy the first `len` window bytes into `output` at offset `written`
///
/// Bytes that do not fit in `output` are dropped. Returns the new number of
/// bytes written.
pub fn flush(window: &[u8], output: &mut [u8], written: usize, len: usize) -> usize {
    let room = output.len().saturating_sub(written);
    let n = len.min(room);
    output[written..written + n].copy_from_slice(&window[..n]);
    written + n
}

/// Circular history buffer writing through to an output slice
#[derive(Debug)]
pub struct Window<'a> {
    buf: &'a mut [u8],
    pos: usize,
    flushed: bool,
    output: &'a mut [u8],
    written: usize,
    staged: usize,
}

impl<'a> Window<'a> {
    /// Use the first `size` bytes of `slide` as a window in front of `output`
    ///
    /// Fails with [`DecodeError::InvalidWindow`] unless `size` is a power of
    /// two no larger than the slide.
    pub fn new(slide: &'a mut [u8], size: usize, output: &'a mut [u8]) -> Result<Self> {
        if !size.is_power_of_two() || size > slide.len() {
            return Err(DecodeError::InvalidWindow {
                size,
                capacity: slide.len(),
            });
        }
        Ok(Self {
            buf: &mut slide[..size],
            pos: 0,
            flushed: false,
            output,
            written: 0,
            staged: 0,
        })
    }

    /// Append one byte
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buf[self.pos] = byte;
        self.pos += 1;
        if self.pos == self.buf.len() {
            self.wrap();
        }
    }

    /// Copy `length` bytes starting `distance` bytes behind the write position
    ///
    /// The source wraps within the window and may overlap the bytes being
    /// written, in which case the copy repeats them. Source bytes that were
    /// never written (before the first flush) are produced as zeros.
    pub fn copy_match(&mut self, distance: usize, length: usize) {
        let size = self.buf.len();
        let mask = size - 1;
        let mut src = self.pos.wrapping_sub(distance);
        let mut remaining = length;

        while remaining > 0 {
            src &= mask;
            let run = (size - src.max(self.pos)).min(remaining);
            remaining -= run;

            if !self.flushed && self.pos <= src {
                self.buf[self.pos..self.pos + run].fill(0);
                self.pos += run;
                src += run;
            } else if src + run <= self.pos || self.pos + run <= src {
                self.buf.copy_within(src..src + run, self.pos);
                self.pos += run;
                src += run;
            } else {
                for _ in 0..run {
                    self.buf[self.pos] = self.buf[src];
                    self.pos += 1;
                    src += 1;
                }
            }

            if self.pos == size {
                self.wrap();
            }
        }
    }

    /// Bytes decoded so far, including any beyond the output capacity
    pub fn produced(&self) -> usize {
        self.staged + self.pos
    }

    /// Flush what is left and return the number of bytes written to output
    pub fn finish(self) -> usize {
        flush(self.buf, self.output, self.written, self.pos)
    }

    fn wrap(&mut self) {
        self.written = flush(self.buf, self.output, self.written, self.pos);
        self.staged += self.pos;
        self.pos = 0;
        self.flushed = true;
    }
}
