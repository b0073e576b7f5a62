use thiserror::Error;

use crate::Alphabet;

#[derive(Error, Debug)]
pub enum Error {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Output errors
    #[error("Output buffer too small: need {needed} bytes, have {available}")]
    OutputBufferTooSmall { needed: usize, available: usize },

    // Histogram errors
    #[error("Invalid code length {length} for {alphabet} symbol {symbol} (max 15)")]
    InvalidCodeLength { alphabet: Alphabet, symbol: usize, length: u8 },

    #[error("Invalid packed layout: length shift {0} (must be 1-16)")]
    InvalidLayout(u32),

    #[error("Too many {alphabet} symbols: {found} (max {max})")]
    TooManySymbols { alphabet: Alphabet, found: usize, max: usize },

    // Dump errors
    #[error("Truncated histogram: expected {expected}, got {found}")]
    TruncatedHistogram { expected: usize, found: usize },

    #[error("Invalid histogram word on line {line}: {word:?}")]
    InvalidWord { line: usize, word: String },

    // Code length alphabet errors
    #[error("Invalid code length symbol: {0}")]
    InvalidCodeLengthSymbol(u8),

    #[error("Code length {length} at position {position} cannot be run-length coded (max 15)")]
    UnencodableLength { position: usize, length: u8 },

    #[error("Repeat code (16) with no previous code length")]
    RepeatWithoutPrevious,

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
