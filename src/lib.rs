pub mod batch;
pub mod codelens;
pub mod error;
pub mod histogram;
pub mod rle;

pub use batch::prepare_batch;
pub use codelens::{
    prepare, prepare_checked, prepare_into, prepare_packed, CodeLengths, UsedCounts,
    MAX_CODE_LENGTH, MAX_CODE_LENGTHS, NUM_DISTANCE_SYMBOLS, NUM_LITERAL_SYMBOLS,
};
pub use error::{Error, Result};
pub use histogram::{Histogram, PackedLayout, SymbolEntry};
pub use rle::CodeLengthToken;

use std::fmt;

/// The two alphabets described by a dynamic Huffman block header
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Alphabet {
    /// Literals (0-255), end of block (256) and length codes (257-285)
    LiteralLength,
    /// Distance codes (0-29)
    Distance,
}

impl Alphabet {
    /// Number of symbols in this alphabet
    pub fn size(&self) -> usize {
        match self {
            Self::LiteralLength => NUM_LITERAL_SYMBOLS,
            Self::Distance => NUM_DISTANCE_SYMBOLS,
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiteralLength => f.write_str("literal/length"),
            Self::Distance => f.write_str("distance"),
        }
    }
}

/// Configuration for code length extraction
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Bit layout of packed histogram words (default: length at bit 15)
    pub layout: PackedLayout,
    /// Number of threads for batch extraction (0 = auto, 1 = single-threaded)
    pub num_threads: usize,
    /// Reject histograms with code lengths above 15 before extracting
    pub validate: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self { layout: PackedLayout::default(), num_threads: 0, validate: false }
    }
}
