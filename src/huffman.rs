//! Multi-level canonical Huffman decode tables
//!
//! [`build`] turns a list of code bit lengths into a root lookup table plus
//! linked sub-tables for codes longer than the root width. All tables of one
//! build live in a single arena (`Vec<HuffmanEntry>`); a link entry stores the
//! offset of its sub-table in that arena.
//!
//! Codes are assigned canonically (shorter codes first, input order within a
//! length) and indexed bit-reversed, so the first stream bit selects the low
//! bit of the table index.

use crate::bits::{mask, BitReader};
use crate::{DecodeError, Result};

/// Longest code length accepted
pub const MAX_CODE_BITS: usize = 16;

/// Extra-bits value of a simple literal symbol (< 256)
pub const LITERAL: u8 = 16;

/// Extra-bits value of a simple symbol >= 256 (end of block)
pub const END_OF_BLOCK: u8 = 15;

/// Extra-bits value historically used to mark an unassigned code
pub const INVALID_CODE: u8 = 99;

/// One slot of a decode table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuffmanEntry {
    /// Code resolved to a symbol
    Leaf {
        /// Bits of the code consumed at this level
        bits: u8,
        /// Extra-bits count, or [`LITERAL`] / [`END_OF_BLOCK`] for simple symbols
        extra: u8,
        /// Symbol value or base value
        value: u16,
    },
    /// Code continues in a sub-table
    Link {
        /// Bits to drop before consulting the sub-table
        bits: u8,
        /// Index width of the sub-table
        sub_bits: u8,
        /// Arena offset of the sub-table
        offset: usize,
    },
    /// Pattern with no symbol (incomplete code set)
    Invalid {
        /// Bits of the pattern consumed at this level
        bits: u8,
    },
}

impl HuffmanEntry {
    /// Extra-bits value in the historical encoding (99 for invalid, 16 + width for links)
    pub fn op(&self) -> u8 {
        match *self {
            HuffmanEntry::Leaf { extra, .. } => extra,
            HuffmanEntry::Link { sub_bits, .. } => 16 + sub_bits,
            HuffmanEntry::Invalid { .. } => INVALID_CODE,
        }
    }
}

/// Decoded symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    /// Extra-bits count attached to the symbol
    pub extra: u8,
    /// Symbol value or base value
    pub value: u16,
}

/// Outcome of a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Every bit pattern decodes to a symbol
    Complete = 0,
    /// Fewer codes than the lengths allow; unused patterns are invalid entries
    Incomplete = 1,
}

impl BuildStatus {
    /// Numeric status in the historical encoding
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

/// Root table plus linked sub-tables
#[derive(Debug, Clone)]
pub struct HuffmanTable {
    entries: Vec<HuffmanEntry>,
    bits: u32,
    status: BuildStatus,
}

impl HuffmanTable {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            bits: 0,
            status: BuildStatus::Complete,
        }
    }

    /// Index width of the root table
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Whether the code set was complete
    pub fn status(&self) -> BuildStatus {
        self.status
    }

    /// True when built from all-zero lengths
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries of the root table and its sub-tables
    pub fn entries(&self) -> &[HuffmanEntry] {
        &self.entries
    }

    /// Decode one symbol whose code bits are stored as-is
    pub fn decode(&self, reader: &mut BitReader<'_>) -> Result<Symbol> {
        self.walk(reader, 0)
    }

    /// Decode one symbol whose code bits are stored complemented (Implode)
    pub fn decode_inverted(&self, reader: &mut BitReader<'_>) -> Result<Symbol> {
        self.walk(reader, u32::MAX)
    }

    fn walk(&self, reader: &mut BitReader<'_>, invert: u32) -> Result<Symbol> {
        if self.entries.is_empty() {
            return Err(DecodeError::InvalidCode);
        }

        reader.need_bits(self.bits);
        let index = ((reader.peek() ^ invert) & mask(self.bits)) as usize;
        let mut entry = self.entries[index];
        loop {
            match entry {
                HuffmanEntry::Leaf { bits, extra, value } => {
                    reader.dump_bits(bits as u32);
                    return Ok(Symbol { extra, value });
                }
                HuffmanEntry::Invalid { bits } => {
                    reader.dump_bits(bits as u32);
                    return Err(DecodeError::InvalidCode);
                }
                HuffmanEntry::Link {
                    bits,
                    sub_bits,
                    offset,
                } => {
                    reader.dump_bits(bits as u32);
                    reader.need_bits(sub_bits as u32);
                    let index = ((reader.peek() ^ invert) & mask(sub_bits as u32)) as usize;
                    entry = self
                        .entries
                        .get(offset + index)
                        .copied()
                        .ok_or(DecodeError::InvalidCode)?;
                }
            }
        }
    }
}

/// Build decode tables for a set of code lengths
///
/// * `lengths` - bit length per symbol, 0 for unused symbols
/// * `simple` - symbols below this index decode to their own index
/// * `base` / `extra` - value and extra-bits count for symbols `simple..`
/// * `max_bits` - preferred root table width; clamped to the used lengths
///
/// All-zero input yields an empty table. Over-subscribed lengths fail with
/// [`DecodeError::Oversubscribed`]; under-subscribed lengths build anyway and
/// report [`BuildStatus::Incomplete`], unless the longest code is one bit.
pub fn build(
    lengths: &[u8],
    simple: usize,
    base: &[u16],
    extra: &[u8],
    max_bits: u32,
) -> Result<HuffmanTable> {
    let n = lengths.len();
    if n > simple && (base.len() < n - simple || extra.len() < n - simple) {
        return Err(DecodeError::MissingBaseValues);
    }

    // Count codes of each length
    let mut count = [0u32; MAX_CODE_BITS + 1];
    for &len in lengths {
        if len as usize > MAX_CODE_BITS {
            return Err(DecodeError::CodeLengthTooLong(len));
        }
        count[len as usize] += 1;
    }
    if count[0] as usize == n {
        return Ok(HuffmanTable::empty());
    }

    let mut min_len = 1;
    while count[min_len] == 0 {
        min_len += 1;
    }
    let mut max_len = MAX_CODE_BITS;
    while count[max_len] == 0 {
        max_len -= 1;
    }
    let l = (max_bits as usize).max(min_len).min(max_len);

    // Pad the longest length with dummy codes so the set is complete
    let mut dummies: i64 = 1 << min_len;
    for len in min_len..max_len {
        dummies -= count[len] as i64;
        if dummies < 0 {
            return Err(DecodeError::Oversubscribed);
        }
        dummies <<= 1;
    }
    dummies -= count[max_len] as i64;
    if dummies < 0 {
        return Err(DecodeError::Oversubscribed);
    }
    count[max_len] += dummies as u32;

    // Symbols sorted by length, input order within a length
    let mut offsets = [0usize; MAX_CODE_BITS + 1];
    let mut acc = 0;
    for len in 1..max_len {
        acc += count[len] as usize;
        offsets[len + 1] = acc;
    }
    let mut values = vec![0usize; n];
    for (symbol, &len) in lengths.iter().enumerate() {
        if len != 0 {
            values[offsets[len as usize]] = symbol;
            offsets[len as usize] += 1;
        }
    }
    let value_count = offsets[max_len];

    let mut entries: Vec<HuffmanEntry> = Vec::new();
    let mut table_start = [0usize; MAX_CODE_BITS + 1];
    let mut saved = [0u32; MAX_CODE_BITS + 1];
    let mut code: u32 = 0; // bit-reversed code being assigned
    let mut next_value = 0;
    let mut level: isize = -1;
    let mut decoded: isize = -(l as isize); // bits resolved before the current table
    let mut current = 0;
    let mut current_size = 0;

    for len in min_len..=max_len {
        let mut remaining = count[len];
        while remaining > 0 {
            remaining -= 1;

            // Open tables down to the level that holds this code
            while len as isize > decoded + l as isize {
                level += 1;
                decoded += l as isize;
                let w = decoded as usize;

                // Smallest table (at most l bits) covering the codes left here
                let limit = (max_len - w).min(l);
                let mut j = (len - w).min(l);
                let mut f = 1u32 << j;
                if f > remaining + 1 && j < limit {
                    f -= remaining + 1;
                    let mut xp = len;
                    j += 1;
                    while j < limit {
                        xp += 1;
                        f <<= 1;
                        if f <= count[xp] {
                            break;
                        }
                        f -= count[xp];
                        j += 1;
                    }
                }

                current = entries.len();
                current_size = 1usize << j;
                entries.resize(current + current_size, HuffmanEntry::Invalid { bits: 0 });
                table_start[level as usize] = current;

                if level > 0 {
                    saved[level as usize] = code;
                    let slot = table_start[level as usize - 1] + (code >> (w - l)) as usize;
                    entries[slot] = HuffmanEntry::Link {
                        bits: l as u8,
                        sub_bits: j as u8,
                        offset: current,
                    };
                }
            }

            let w = decoded as usize;
            let bits = (len - w) as u8;
            let entry = if next_value >= value_count {
                HuffmanEntry::Invalid { bits }
            } else {
                let symbol = values[next_value];
                next_value += 1;
                if symbol < simple {
                    HuffmanEntry::Leaf {
                        bits,
                        extra: if symbol < 256 { LITERAL } else { END_OF_BLOCK },
                        value: symbol as u16,
                    }
                } else {
                    HuffmanEntry::Leaf {
                        bits,
                        extra: extra[symbol - simple],
                        value: base[symbol - simple],
                    }
                }
            };

            // Replicate the entry over every index sharing this code's low bits
            let step = 1usize << (len - w);
            let mut index = (code >> w) as usize;
            while index < current_size {
                entries[current + index] = entry;
                index += step;
            }

            // Backwards increment of the len-bit code
            let mut bit = 1u32 << (len - 1);
            while code & bit != 0 {
                code ^= bit;
                bit >>= 1;
            }
            code ^= bit;

            // Close tables whose prefix is finished
            while code & (mask(decoded as u32)) != saved[level as usize] {
                level -= 1;
                decoded -= l as isize;
            }
        }
    }

    let status = if dummies != 0 && max_len != 1 {
        BuildStatus::Incomplete
    } else {
        BuildStatus::Complete
    };

    Ok(HuffmanTable {
        entries,
        bits: l as u32,
        status,
    })
}
