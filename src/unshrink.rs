//! Unshrink: decoder for PKZIP method 1 (Shrink)
//!
//! Shrink is LZW with codes growing from 9 to 13 bits under control of the
//! encoder. Code 256 is an escape: the following code either widens the code
//! size by one bit (1) or asks for a partial clear (2), which frees every
//! leaf of the code tree while keeping nodes that still have children.

use crate::bits::BitReader;
use crate::common::{check_output, HSIZE, MAX_BITS};
use crate::{DecodeError, Result};
use log::trace;

/// Escape code; also the parent of the 256 literal codes
pub const BOGUS_CODE: usize = 256;

/// Code width at the start of every stream
pub const INITIAL_CODE_SIZE: u32 = 9;

/// Escape sub-code that widens the code size
pub const GROW_CODE_SIZE: usize = 1;

/// Escape sub-code that frees all leaves
pub const PARTIAL_CLEAR: usize = 2;

const CODE_MASK: u16 = (HSIZE - 1) as u16;
const FREE_CODE: u16 = HSIZE as u16;
const HAS_CHILD: u16 = (HSIZE << 1) as u16;

/// Code tree and decode stack of one Shrink stream
///
/// `parent` packs the parent code in its low 13 bits; the bits above are
/// the free marker and the has-child mark used during a partial clear.
#[derive(Debug, Clone)]
pub struct LzwTree {
    parent: Vec<u16>,
    value: Vec<u8>,
    stack: Vec<u8>,
}

impl LzwTree {
    /// Allocate a seeded tree
    pub fn new() -> Self {
        let mut tree = Self {
            parent: vec![FREE_CODE; HSIZE],
            value: vec![0; HSIZE],
            stack: vec![0; HSIZE],
        };
        tree.reset();
        tree
    }

    /// Seed the 256 literal codes and free everything above the escape
    pub fn reset(&mut self) {
        for code in 0..BOGUS_CODE {
            self.value[code] = code as u8;
            self.parent[code] = BOGUS_CODE as u16;
        }
        self.parent[BOGUS_CODE] = 0;
        for code in BOGUS_CODE + 1..HSIZE {
            self.parent[code] = FREE_CODE;
        }
    }

    /// True if `code` is unassigned
    pub fn is_free(&self, code: usize) -> bool {
        self.parent[code] == FREE_CODE
    }

    /// Parent code of an assigned code
    pub fn parent(&self, code: usize) -> usize {
        (self.parent[code] & CODE_MASK) as usize
    }

    /// Number of assigned codes above the escape code
    pub fn assigned(&self) -> usize {
        (BOGUS_CODE + 1..HSIZE).filter(|&c| !self.is_free(c)).count()
    }

    /// Free every code in `257..=last_code_used` that has no children
    pub fn partial_clear(&mut self, last_code_used: usize) {
        let last = last_code_used.min(HSIZE - 1);

        // Mark every node that is some code's parent
        for code in BOGUS_CODE + 1..=last {
            let parent = (self.parent[code] & CODE_MASK) as usize;
            if parent > BOGUS_CODE {
                self.parent[parent] |= HAS_CHILD;
            }
        }

        // Drop the mark on parents, free the rest
        for code in BOGUS_CODE + 1..=last {
            if self.parent[code] & HAS_CHILD != 0 {
                self.parent[code] &= !HAS_CHILD;
            } else {
                self.parent[code] = FREE_CODE;
            }
        }
    }

    /// Spell `code` onto the stack; returns the stack index of its first byte
    fn expand(&mut self, code: usize, old_code: usize, final_value: u8) -> Result<usize> {
        let mut top = HSIZE;
        let mut code = code;

        if self.is_free(code) {
            trace!("KwKwK code {code} (previous code {old_code})");
            top -= 1;
            self.stack[top] = final_value;
            code = old_code;
        }

        while code != BOGUS_CODE {
            if top == 0 {
                return Err(DecodeError::StackUnderflow);
            }
            top -= 1;
            if self.is_free(code) {
                self.stack[top] = final_value;
                code = old_code;
            } else {
                self.stack[top] = self.value[code];
                code = self.parent(code);
            }
        }

        Ok(top)
    }

    /// Assign the first free code after `last_free`
    fn add(&mut self, last_free: usize, value: u8, parent: usize) -> Result<usize> {
        let mut code = last_free + 1;
        while code < HSIZE && !self.is_free(code) {
            code += 1;
        }
        if code >= HSIZE {
            return Err(DecodeError::TreeExhausted);
        }
        self.value[code] = value;
        self.parent[code] = parent as u16;
        Ok(code)
    }
}

impl Default for LzwTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a shrunk stream into `output[..size]`
///
/// Decoding runs until the input is exhausted; bytes past `size` are
/// dropped. Returns the number of bytes written.
pub fn unshrink(tree: &mut LzwTree, input: &[u8], output: &mut [u8], size: usize) -> Result<usize> {
    check_output(size, output)?;
    let output = &mut output[..size];

    tree.reset();
    let mut reader = BitReader::new(input);
    let mut code_size = INITIAL_CODE_SIZE;
    let mut last_free = BOGUS_CODE;
    let mut written = 0;

    let mut old_code = reader.read_bits(code_size) as usize;
    if reader.is_exhausted() {
        return Ok(0);
    }
    let mut final_value = old_code as u8;
    written = emit(output, written, &[final_value]);

    loop {
        let code = reader.read_bits(code_size) as usize;
        if reader.is_exhausted() {
            break;
        }

        if code == BOGUS_CODE {
            let control = reader.read_bits(code_size) as usize;
            if reader.is_exhausted() {
                break;
            }
            match control {
                GROW_CODE_SIZE => {
                    code_size += 1;
                    trace!("code size now {code_size} bits");
                    if code_size > MAX_BITS {
                        return Err(DecodeError::CodeWidthOverflow(code_size));
                    }
                }
                PARTIAL_CLEAR => {
                    trace!("partial clear up to code {last_free}");
                    tree.partial_clear(last_free);
                    last_free = BOGUS_CODE;
                }
                _ => {}
            }
            continue;
        }

        let start = tree.expand(code, old_code, final_value)?;
        final_value = tree.stack[start];
        written = emit(output, written, &tree.stack[start..]);

        last_free = tree.add(last_free, final_value, old_code)?;
        old_code = code;
    }

    Ok(written)
}

fn emit(output: &mut [u8], written: usize, bytes: &[u8]) -> usize {
    let n = bytes.len().min(output.len() - written);
    output[written..written + n].copy_from_slice(&bytes[..n]);
    written + n
}
