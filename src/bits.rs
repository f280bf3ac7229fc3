//! Bit-level reader over a compressed byte buffer
//!
//! Bits are consumed least significant first. Two refill disciplines are
//! offered because the decoders were written against two different sets of
//! helpers:
//!
//! * [`BitReader::need_bits`] / [`BitReader::dump_bits`] load exactly enough
//!   whole bytes for the next lookup (Explode).
//! * [`BitReader::read_bits`] refills greedily up to 32 buffered bits and
//!   raises the exhausted flag when a read finds nothing left to load
//!   (Unshrink, Unreduce).
//!
//! Reads past the end of the buffer yield zero bits instead of failing.

/// Mask selecting the low `n` bits
#[inline]
pub fn mask(n: u32) -> u32 {
    if n >= 32 {
        u32::MAX
    } else {
        (1u32 << n) - 1
    }
}

/// Bit stream reader with a 32-bit accumulator
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    bit_buf: u32,
    bit_count: u32,
    exhausted: bool,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first byte of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            bit_buf: 0,
            bit_count: 0,
            exhausted: false,
        }
    }

    /// Next whole byte, or 0 once the buffer is used up
    ///
    /// The cursor still advances past the end so over-reads stay visible
    /// through [`BitReader::position`].
    pub fn read_byte(&mut self) -> u8 {
        let byte = self.data.get(self.pos).copied().unwrap_or(0);
        self.pos += 1;
        byte
    }

    /// Make sure at least `n` bits (n <= 24) are buffered
    #[inline]
    pub fn need_bits(&mut self, n: u32) {
        while self.bit_count < n {
            self.bit_buf |= (self.read_byte() as u32) << self.bit_count;
            self.bit_count += 8;
        }
    }

    /// Buffered bits, next bit to consume in the lowest position
    #[inline]
    pub fn peek(&self) -> u32 {
        self.bit_buf
    }

    /// Drop `n` buffered bits
    #[inline]
    pub fn dump_bits(&mut self, n: u32) {
        self.bit_buf = self.bit_buf.checked_shr(n).unwrap_or(0);
        self.bit_count = self.bit_count.saturating_sub(n);
    }

    /// Take the low `n` bits, loading whole bytes only as needed
    #[inline]
    pub fn get_bits(&mut self, n: u32) -> u32 {
        self.need_bits(n);
        let value = self.bit_buf & mask(n);
        self.dump_bits(n);
        value
    }

    /// Take the low `n` bits (n <= 16), refilling greedily
    ///
    /// When fewer than `n` bits are buffered the accumulator is topped up
    /// while it holds at most 24 bits. If that refill cannot load a single
    /// byte the exhausted flag is raised; the flag can therefore trip while a
    /// few buffered bits are still unread, which the Shrink and Reduce
    /// decoders rely on as their end-of-stream signal.
    pub fn read_bits(&mut self, n: u32) -> u32 {
        if n > self.bit_count {
            self.exhausted = true;
            while self.bit_count <= 24 && self.pos < self.data.len() {
                self.bit_buf |= (self.data[self.pos] as u32) << self.bit_count;
                self.pos += 1;
                self.bit_count += 8;
                self.exhausted = false;
            }
        }
        let value = self.bit_buf & mask(n);
        self.dump_bits(n);
        value
    }

    /// True once a greedy refill found no input left
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// True once the byte cursor has consumed the whole buffer
    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Byte cursor; may exceed [`BitReader::len`] after over-reads
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Size of the underlying buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the underlying buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bits handed out so far
    pub fn bits_consumed(&self) -> usize {
        self.pos * 8 - self.bit_count as usize
    }
}
