//! Code length extraction for dynamic Huffman block headers (RFC 1951 section 3.2.7).
//!
//! Takes the code lengths assigned to both alphabets and lays out the sequence the header's
//! run-length coder consumes: the used prefix of the literal/length lengths, immediately
//! followed by the used prefix of the distance lengths.

pub mod scan;

use crate::error::{Error, Result};
use crate::histogram::{Histogram, PackedLayout, SymbolEntry};
use crate::ExtractConfig;

pub use scan::used_count;

/// Symbols in the literal/length alphabet that can appear in a header
pub const NUM_LITERAL_SYMBOLS: usize = 286;

/// Symbols in the distance alphabet that can appear in a header
pub const NUM_DISTANCE_SYMBOLS: usize = 30;

/// Worst-case length of the extracted sequence
pub const MAX_CODE_LENGTHS: usize = NUM_LITERAL_SYMBOLS + NUM_DISTANCE_SYMBOLS;

/// Maximum code length for literal/length and distance alphabets (RFC 1951)
pub const MAX_CODE_LENGTH: u8 = 15;

/// Length emitted for the placeholder distance code of a block without back-references
const PLACEHOLDER_DISTANCE_LENGTH: u8 = 1;

/// Number of code lengths sent for each alphabet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsedCounts {
    /// Literal/length lengths sent (0-286)
    pub literals: u16,
    /// Distance lengths sent (1-30)
    pub distances: u16,
}

impl UsedCounts {
    /// Total number of code lengths in the extracted sequence
    pub fn total(&self) -> usize {
        self.literals as usize + self.distances as usize
    }

    /// HLIT and HDIST header fields, if the counts form a valid dynamic header.
    ///
    /// A header always carries at least 257 literal/length lengths (end of block is symbol 256).
    pub fn header_fields(&self) -> Option<(u8, u8)> {
        let literals = self.literals as usize;
        let distances = self.distances as usize;
        if !(257..=NUM_LITERAL_SYMBOLS).contains(&literals)
            || !(1..=NUM_DISTANCE_SYMBOLS).contains(&distances)
        {
            return None;
        }
        Some(((literals - 257) as u8, (distances - 1) as u8))
    }
}

/// Extracted code length sequence together with the split point
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeLengths {
    lengths: Vec<u8>,
    counts: UsedCounts,
}

impl CodeLengths {
    pub fn counts(&self) -> UsedCounts {
        self.counts
    }

    /// The whole sequence: literal/length lengths then distance lengths
    pub fn as_slice(&self) -> &[u8] {
        &self.lengths
    }

    pub fn literal_lengths(&self) -> &[u8] {
        &self.lengths[..self.counts.literals as usize]
    }

    pub fn distance_lengths(&self) -> &[u8] {
        &self.lengths[self.counts.literals as usize..]
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.lengths
    }
}

/// Where each alphabet's segment ends, and whether the placeholder distance is needed
#[derive(Clone, Copy, Debug)]
struct Plan {
    literals: usize,
    distances: usize,
    placeholder_distance: bool,
}

impl Plan {
    fn new<T>(literals: &[T], distances: &[T], is_used: impl Fn(&T) -> bool) -> Self {
        let literal_count = scan::used_count_by(literals, &is_used);
        let distance_count = scan::used_count_by(distances, &is_used);

        // A dynamic header must describe at least one distance code, even for a block
        // without back-references
        if distance_count == 0 {
            Self { literals: literal_count, distances: 1, placeholder_distance: true }
        } else {
            Self { literals: literal_count, distances: distance_count, placeholder_distance: false }
        }
    }

    fn total(&self) -> usize {
        self.literals + self.distances
    }

    fn counts(&self) -> UsedCounts {
        UsedCounts { literals: self.literals as u16, distances: self.distances as u16 }
    }

    /// Write the sequence into `out`, which must hold at least `total()` bytes
    fn write<T>(&self, literals: &[T], distances: &[T], out: &mut [u8], length: impl Fn(&T) -> u8) {
        let (literal_out, rest) = out.split_at_mut(self.literals);
        let distance_out = &mut rest[..self.distances];

        for (dst, entry) in literal_out.iter_mut().zip(&literals[..self.literals]) {
            *dst = length(entry);
        }
        for (dst, entry) in distance_out.iter_mut().zip(&distances[..self.distances]) {
            *dst = length(entry);
        }

        if self.placeholder_distance {
            distance_out[0] = PLACEHOLDER_DISTANCE_LENGTH;
        }
    }
}

fn entry_is_used(entry: &SymbolEntry) -> bool {
    entry.is_used()
}

fn entry_length(entry: &SymbolEntry) -> u8 {
    entry.length
}

/// Extract the code length sequence for a block
pub fn prepare(histogram: &Histogram) -> CodeLengths {
    let plan = Plan::new(&histogram.literals, &histogram.distances, entry_is_used);
    let mut lengths = vec![0u8; plan.total()];
    plan.write(&histogram.literals, &histogram.distances, &mut lengths, entry_length);
    CodeLengths { lengths, counts: plan.counts() }
}

/// Extract the code length sequence into a caller-owned buffer.
///
/// Only the first `counts.total()` bytes of `out` are written. A buffer of
/// [`MAX_CODE_LENGTHS`] bytes always suffices; a shorter one is rejected without writing
/// anything if the sequence does not fit.
pub fn prepare_into(histogram: &Histogram, out: &mut [u8]) -> Result<UsedCounts> {
    let plan = Plan::new(&histogram.literals, &histogram.distances, entry_is_used);
    if out.len() < plan.total() {
        return Err(Error::OutputBufferTooSmall { needed: plan.total(), available: out.len() });
    }
    plan.write(&histogram.literals, &histogram.distances, out, entry_length);
    Ok(plan.counts())
}

/// [`prepare`], preceded by a code length check when `config.validate` is set
pub fn prepare_checked(histogram: &Histogram, config: &ExtractConfig) -> Result<CodeLengths> {
    if config.validate {
        histogram.validate()?;
    }
    Ok(prepare(histogram))
}

/// Extract the code length sequence directly from packed words.
///
/// A symbol is used when its length field, truncated to 8 bits, is nonzero; the emitted byte
/// is that truncated field. This matches [`Histogram::from_packed`] followed by [`prepare`].
pub fn prepare_packed(
    literals: &[u32; NUM_LITERAL_SYMBOLS],
    distances: &[u32; NUM_DISTANCE_SYMBOLS],
    layout: PackedLayout,
) -> CodeLengths {
    let plan = Plan::new(literals, distances, |&word| layout.length_of(word) != 0);
    let mut lengths = vec![0u8; plan.total()];
    plan.write(literals, distances, &mut lengths, |&word| layout.length_of(word));
    CodeLengths { lengths, counts: plan.counts() }
}
