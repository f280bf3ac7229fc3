//! Shared helpers for the integration tests
//!
//! The crate only decodes, so the tests carry small reference encoders that
//! produce valid Implode, Shrink and Reduce streams. They favour simplicity
//! over compression ratio.

#![allow(dead_code)]

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// LSB-first bit writer
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    acc: u64,
    count: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue after already assembled whole bytes
    pub fn with_prefix(prefix: &[u8]) -> Self {
        Self {
            bytes: prefix.to_vec(),
            acc: 0,
            count: 0,
        }
    }

    /// Append the low `width` bits of `value`, least significant first
    pub fn bits(&mut self, value: u32, width: u32) {
        self.acc |= ((value as u64) & ((1u64 << width) - 1)) << self.count;
        self.count += width;
        while self.count >= 8 {
            self.bytes.push(self.acc as u8);
            self.acc >>= 8;
            self.count -= 8;
        }
    }

    /// Append a Huffman code complemented, first code bit first (Implode)
    pub fn code_inverted(&mut self, code: u32, len: u32) {
        for i in (0..len).rev() {
            self.bits(((code >> i) & 1) ^ 1, 1);
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.count > 0 {
            self.bytes.push(self.acc as u8);
        }
        self.bytes
    }
}

/// Hash-chain search for earlier occurrences of the bytes at a position
pub struct MatchFinder<'a> {
    data: &'a [u8],
    head: HashMap<[u8; 3], usize>,
    prev: Vec<usize>,
    inserted: usize,
}

impl<'a> MatchFinder<'a> {
    const MAX_CHAIN: usize = 48;

    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            head: HashMap::new(),
            prev: vec![usize::MAX; data.len()],
            inserted: 0,
        }
    }

    fn key(&self, pos: usize) -> Option<[u8; 3]> {
        self.data
            .get(pos..pos + 3)
            .map(|s| [s[0], s[1], s[2]])
    }

    fn insert_before(&mut self, end: usize) {
        while self.inserted < end {
            if let Some(key) = self.key(self.inserted) {
                let previous = self.head.insert(key, self.inserted);
                self.prev[self.inserted] = previous.unwrap_or(usize::MAX);
            }
            self.inserted += 1;
        }
    }

    /// Longest `(distance, length)` with distance <= `max_distance`
    pub fn find(&mut self, pos: usize, max_distance: usize, max_len: usize) -> (usize, usize) {
        self.insert_before(pos);
        let mut best = (0, 0);
        let key = match self.key(pos) {
            Some(key) => key,
            None => return best,
        };

        let mut candidate = self.head.get(&key).copied().unwrap_or(usize::MAX);
        let mut depth = 0;
        while candidate != usize::MAX && depth < Self::MAX_CHAIN {
            let distance = pos - candidate;
            if distance > max_distance {
                break;
            }
            let mut len = 0;
            while len < max_len && self.data[candidate + len] == self.data[pos + len] {
                len += 1;
            }
            if len > best.1 {
                best = (distance, len);
            }
            candidate = self.prev[candidate];
            depth += 1;
        }
        best
    }
}

// ---------------------------------------------------------------- Implode

/// 64 symbols of 6 bits: symbol s has code s
pub const UNIFORM_64_TREE: [u8; 5] = [0x03, 0xF5, 0xF5, 0xF5, 0xF5];

/// 256 symbols of 8 bits: symbol s has code s
pub fn uniform_literal_tree() -> Vec<u8> {
    let mut tree = vec![0x0F];
    tree.extend(std::iter::repeat(0xF7).take(16));
    tree
}

/// General purpose flag for an Implode variant
pub fn implode_flags(coded_literals: bool, large_window: bool) -> u16 {
    (if coded_literals { 4 } else { 0 }) | (if large_window { 2 } else { 0 })
}

/// Run-length description of a tree: a pair count, then one byte per run of
/// up to 16 equal lengths
pub fn describe_lengths(lengths: &[u8]) -> Vec<u8> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < lengths.len() {
        let len = lengths[i];
        let mut run = 1;
        while run < 16 && i + run < lengths.len() && lengths[i + run] == len {
            run += 1;
        }
        pairs.push((((run - 1) as u8) << 4) | (len - 1));
        i += run;
    }

    let mut out = vec![(pairs.len() - 1) as u8];
    out.extend(pairs);
    out
}

/// Canonical code of every symbol: shorter codes first, then symbol order
pub fn canonical_codes(lengths: &[u8]) -> Vec<u32> {
    let mut count = [0u32; 17];
    for &len in lengths {
        count[len as usize] += 1;
    }
    count[0] = 0;

    let mut next = [0u32; 17];
    let mut code = 0;
    for bits in 1..17 {
        code = (code + count[bits - 1]) << 1;
        next[bits] = code;
    }

    lengths
        .iter()
        .map(|&len| {
            let code = next[len as usize];
            next[len as usize] += 1;
            code
        })
        .collect()
}

/// Huffman code lengths for `freq`, every symbol included, at most 16 bits
pub fn huffman_lengths(freq: &[usize]) -> Vec<u8> {
    let mut weights: Vec<usize> = freq.iter().map(|&f| f.max(1)).collect();
    loop {
        let lengths = tree_depths(&weights);
        if lengths.iter().all(|&len| len <= 16) {
            return lengths;
        }
        for w in &mut weights {
            *w = (*w + 1) / 2;
        }
    }
}

fn tree_depths(weights: &[usize]) -> Vec<u8> {
    let mut parent = vec![usize::MAX; weights.len()];
    let mut heap: BinaryHeap<Reverse<(usize, usize)>> = weights
        .iter()
        .enumerate()
        .map(|(node, &w)| Reverse((w, node)))
        .collect();

    while let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) {
        let node = parent.len();
        parent.push(usize::MAX);
        parent[a] = node;
        parent[b] = node;
        heap.push(Reverse((wa + wb, node)));
    }

    (0..weights.len())
        .map(|leaf| {
            let mut depth = 0;
            let mut node = leaf;
            while parent[node] != usize::MAX {
                node = parent[node];
                depth += 1;
            }
            depth
        })
        .collect()
}

/// `2^-1 .. 2^-k` for the first `k` symbols, the rest split between 15 and
/// 16 bits so the code stays complete
pub fn deep_lengths(n: usize, k: usize) -> Vec<u8> {
    let fifteen = (1usize << (16 - k)) - (n - k);
    let mut lengths: Vec<u8> = (1..=k as u8).collect();
    lengths.extend(std::iter::repeat(15).take(fifteen));
    lengths.extend(std::iter::repeat(16).take(n - k - fifteen));
    lengths
}

/// Code lengths of the three Implode trees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplodeTrees {
    pub literal: Vec<u8>,
    pub length: Vec<u8>,
    pub distance: Vec<u8>,
}

impl ImplodeTrees {
    /// 8-bit literals, 6-bit lengths and distances
    pub fn uniform() -> Self {
        Self {
            literal: vec![8; 256],
            length: vec![6; 64],
            distance: vec![6; 64],
        }
    }

    /// Skewed complete trees reaching 16 bits in all three alphabets
    pub fn deep() -> Self {
        Self {
            literal: deep_lengths(256, 8),
            length: deep_lengths(64, 10),
            distance: deep_lengths(64, 10),
        }
    }

    /// Huffman trees fitted to the tokens the encoder emits for `data`
    pub fn from_data(data: &[u8], coded_literals: bool, large_window: bool) -> Self {
        let params = ImplodeParams::new(coded_literals, large_window);
        let mut literal = vec![0usize; 256];
        let mut length = vec![0usize; 64];
        let mut distance = vec![0usize; 64];
        for token in params.tokenize(data) {
            match token {
                Token::Literal(byte) => literal[byte as usize] += 1,
                Token::Match { distance: d, len } => {
                    length[(len - params.min_match).min(63)] += 1;
                    distance[(d - 1) >> params.low_bits] += 1;
                }
            }
        }
        Self {
            literal: huffman_lengths(&literal),
            length: huffman_lengths(&length),
            distance: huffman_lengths(&distance),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Literal(u8),
    Match { distance: usize, len: usize },
}

#[derive(Debug, Clone, Copy)]
struct ImplodeParams {
    min_match: usize,
    low_bits: u32,
}

impl ImplodeParams {
    fn new(coded_literals: bool, large_window: bool) -> Self {
        Self {
            min_match: if coded_literals { 3 } else { 2 },
            low_bits: if large_window { 7 } else { 6 },
        }
    }

    fn tokenize(&self, data: &[u8]) -> Vec<Token> {
        let max_distance = 64 << self.low_bits;
        let longest = self.min_match + 63 + 255;
        let mut finder = MatchFinder::new(data);
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < data.len() {
            let (distance, len) = finder.find(pos, max_distance, longest.min(data.len() - pos));
            if len >= self.min_match {
                tokens.push(Token::Match { distance, len });
                pos += len;
            } else {
                tokens.push(Token::Literal(data[pos]));
                pos += 1;
            }
        }
        tokens
    }
}

/// Encode `data` as an imploded stream using uniform code trees
pub fn implode(data: &[u8], coded_literals: bool, large_window: bool) -> Vec<u8> {
    implode_with(data, coded_literals, large_window, &ImplodeTrees::uniform())
}

/// Encode `data` with Huffman trees fitted to its own statistics
pub fn implode_dynamic(data: &[u8], coded_literals: bool, large_window: bool) -> Vec<u8> {
    let trees = ImplodeTrees::from_data(data, coded_literals, large_window);
    implode_with(data, coded_literals, large_window, &trees)
}

/// Encode `data` as an imploded stream using the given trees
pub fn implode_with(
    data: &[u8],
    coded_literals: bool,
    large_window: bool,
    trees: &ImplodeTrees,
) -> Vec<u8> {
    let params = ImplodeParams::new(coded_literals, large_window);

    let mut prefix = Vec::new();
    if coded_literals {
        prefix.extend(describe_lengths(&trees.literal));
    }
    prefix.extend(describe_lengths(&trees.length));
    prefix.extend(describe_lengths(&trees.distance));

    let literal_codes = canonical_codes(&trees.literal);
    let length_codes = canonical_codes(&trees.length);
    let distance_codes = canonical_codes(&trees.distance);

    let mut writer = BitWriter::with_prefix(&prefix);
    for token in params.tokenize(data) {
        match token {
            Token::Match { distance, len } => {
                writer.bits(0, 1);
                let d = distance - 1;
                writer.bits(d as u32 & ((1 << params.low_bits) - 1), params.low_bits);
                let high = d >> params.low_bits;
                writer.code_inverted(distance_codes[high], trees.distance[high] as u32);
                let symbol = len - params.min_match;
                if symbol >= 63 {
                    writer.code_inverted(length_codes[63], trees.length[63] as u32);
                    writer.bits((symbol - 63) as u32, 8);
                } else {
                    writer.code_inverted(length_codes[symbol], trees.length[symbol] as u32);
                }
            }
            Token::Literal(byte) => {
                writer.bits(1, 1);
                if coded_literals {
                    let b = byte as usize;
                    writer.code_inverted(literal_codes[b], trees.literal[b] as u32);
                } else {
                    writer.bits(byte as u32, 8);
                }
            }
        }
    }

    writer.finish()
}

// ----------------------------------------------------------------- Shrink

const HSIZE: usize = 8192;
const BOGUS: usize = 256;
const CODE_MASK: u16 = 0x1FFF;
const FREE: u16 = 0x2000;
const HAS_CHILD: u16 = 0x4000;

/// Shrink encoder that mirrors the decoder's code tree slot for slot
struct ShrinkModel {
    parent: Vec<u16>,
    value: Vec<u8>,
    children: HashMap<(u16, u8), u16>,
    last_free: usize,
}

impl ShrinkModel {
    fn new() -> Self {
        let mut parent = vec![FREE; HSIZE];
        let mut value = vec![0u8; HSIZE];
        for code in 0..BOGUS {
            parent[code] = BOGUS as u16;
            value[code] = code as u8;
        }
        Self {
            parent,
            value,
            children: HashMap::new(),
            last_free: BOGUS,
        }
    }

    fn next_free(&self) -> Option<usize> {
        (self.last_free + 1..HSIZE).find(|&c| self.parent[c] == FREE)
    }

    fn add(&mut self, parent: usize, value: u8) {
        if let Some(slot) = self.next_free() {
            self.parent[slot] = parent as u16;
            self.value[slot] = value;
            self.children.insert((parent as u16, value), slot as u16);
            self.last_free = slot;
        }
    }

    fn partial_clear(&mut self) {
        let last = self.last_free;
        for code in BOGUS + 1..=last {
            let parent = (self.parent[code] & CODE_MASK) as usize;
            if parent > BOGUS {
                self.parent[parent] |= HAS_CHILD;
            }
        }
        for code in BOGUS + 1..=last {
            if self.parent[code] & HAS_CHILD != 0 {
                self.parent[code] &= !HAS_CHILD;
            } else {
                if self.parent[code] != FREE {
                    let key = (self.parent[code] & CODE_MASK, self.value[code]);
                    if self.children.get(&key) == Some(&(code as u16)) {
                        self.children.remove(&key);
                    }
                }
                self.parent[code] = FREE;
            }
        }
        self.last_free = BOGUS;
    }

    /// Longest known string at the start of `data`
    fn longest(&self, data: &[u8]) -> (usize, usize) {
        let mut code = data[0] as usize;
        let mut len = 1;
        while len < data.len() {
            match self.children.get(&(code as u16, data[len])) {
                Some(&next) => {
                    code = next as usize;
                    len += 1;
                }
                None => break,
            }
        }
        (code, len)
    }
}

/// Encode `data` as a shrunk stream, widening codes and clearing as needed
pub fn shrink(data: &[u8]) -> Vec<u8> {
    let mut model = ShrinkModel::new();
    let mut writer = BitWriter::new();
    let mut width = 9;
    let mut previous: Option<usize> = None;
    let mut pos = 0;

    while pos < data.len() {
        if previous.is_some() && model.next_free().is_none() {
            writer.bits(BOGUS as u32, width);
            writer.bits(2, width);
            model.partial_clear();
        }

        let (code, len) = model.longest(&data[pos..]);
        while code >= 1 << width {
            writer.bits(BOGUS as u32, width);
            writer.bits(1, width);
            width += 1;
        }
        writer.bits(code as u32, width);

        if let Some(prev) = previous {
            model.add(prev, data[pos]);
        }
        previous = Some(code);
        pos += len;
    }

    writer.finish()
}

// ----------------------------------------------------------------- Reduce

/// Escape byte of the Reduce expansion layer
pub const DLE: u8 = 0x90;

/// Bits needed to index a follower set of the given size
fn follower_index_bits(count: usize) -> u32 {
    let mut bits = 1;
    while (1 << bits) < count {
        bits += 1;
    }
    bits
}

/// Expansion layer: literals with escaped DLE plus DLE-introduced matches
pub fn reduce_symbols(data: &[u8], factor: u8) -> Vec<u8> {
    let length_bits = 8 - factor as u32;
    let mask = (1usize << length_bits) - 1;
    let max_distance = 256usize << factor;
    let longest = mask + 255 + 3;

    let mut symbols = Vec::new();
    let mut finder = MatchFinder::new(data);
    let mut pos = 0;

    while pos < data.len() {
        let (distance, len) = finder.find(pos, max_distance, longest.min(data.len() - pos));
        let high = distance.saturating_sub(1) >> 8;
        let usable = len >= 3 && !(high == 0 && len == 3);
        if usable {
            let d = distance - 1;
            let extra = len - 3;
            let length_part = extra.min(mask);
            symbols.push(DLE);
            symbols.push(((high << length_bits) | length_part) as u8);
            if length_part == mask {
                symbols.push((extra - mask) as u8);
            }
            symbols.push((d & 0xFF) as u8);
            pos += len;
        } else {
            symbols.push(data[pos]);
            if data[pos] == DLE {
                symbols.push(0);
            }
            pos += 1;
        }
    }

    symbols
}

/// Follower sets: the most frequent successors of every byte
pub fn build_followers(symbols: &[u8], max_set: usize) -> Vec<Vec<u8>> {
    let mut counts = vec![[0usize; 256]; 256];
    let mut last = 0u8;
    for &s in symbols {
        counts[last as usize][s as usize] += 1;
        last = s;
    }

    counts
        .iter()
        .map(|row| {
            let mut successors: Vec<(usize, u8)> = row
                .iter()
                .enumerate()
                .filter(|&(_, &n)| n > 1)
                .map(|(b, &n)| (n, b as u8))
                .collect();
            successors.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
            successors.truncate(max_set);
            successors.into_iter().map(|(_, b)| b).collect()
        })
        .collect()
}

/// Probabilistic layer: preamble, then every symbol coded against its predecessor
pub fn encode_followers(symbols: &[u8], followers: &[Vec<u8>]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    for byte in (0..256).rev() {
        let set = &followers[byte];
        writer.bits(set.len() as u32, 6);
        for &f in set {
            writer.bits(f as u32, 8);
        }
    }

    let mut last = 0u8;
    for &s in symbols {
        let set = &followers[last as usize];
        if set.is_empty() {
            writer.bits(s as u32, 8);
        } else if let Some(index) = set.iter().position(|&f| f == s) {
            writer.bits(0, 1);
            writer.bits(index as u32, follower_index_bits(set.len()));
        } else {
            writer.bits(1, 1);
            writer.bits(s as u32, 8);
        }
        last = s;
    }

    writer.finish()
}

/// Encode `data` as a reduced stream with factor 1-4
pub fn reduce(data: &[u8], factor: u8) -> Vec<u8> {
    let symbols = reduce_symbols(data, factor);
    let followers = build_followers(&symbols, 32);
    encode_followers(&symbols, &followers)
}

/// Reduce stream with empty follower sets and no matches
pub fn reduce_raw(data: &[u8]) -> Vec<u8> {
    let mut stream = vec![0u8; 192];
    for &b in data {
        stream.push(b);
        if b == DLE {
            stream.push(0);
        }
    }
    stream
}

// ------------------------------------------------------------------- Data

/// Deterministic text-like sample
pub fn sample_text(size: usize) -> Vec<u8> {
    let words: [&[u8]; 12] = [
        b"shrink ", b"reduce ", b"implode ", b"the ", b"archive ", b"entry ", b"of ",
        b"a ", b"zip ", b"legacy ", b"method\n", b"window ",
    ];
    let mut state: u32 = 0x1234_5678;
    let mut data = Vec::with_capacity(size + 16);
    while data.len() < size {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        data.extend_from_slice(words[(state >> 24) as usize % words.len()]);
    }
    data.truncate(size);
    data
}

/// Deterministic noisy binary sample over a small alphabet
pub fn sample_binary(size: usize) -> Vec<u8> {
    let mut state: u32 = 0xDEAD_BEEF;
    (0..size)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state % 24) as u8 * 11
        })
        .collect()
}
