//! Histogram dumps in the hardware record layout and a plain text form.
//!
//! A binary record is 320 little-endian 32-bit words: 286 literal/length words, 2 reserved
//! words, 30 distance words and 2 reserved words. Reserved words are written as zero and
//! ignored on read.
//!
//! The text form is whitespace-separated words (decimal or `0x` hex), `#` comments, and 316
//! words per histogram.

use std::io::{ErrorKind, Read, Write};

use super::{Histogram, PackedLayout};
use crate::codelens::{MAX_CODE_LENGTHS, NUM_DISTANCE_SYMBOLS, NUM_LITERAL_SYMBOLS};
use crate::error::{Error, Result};

/// Reserved words following each alphabet in a binary record
const RESERVED_WORDS: usize = 2;

/// Word offset of the first distance entry in a binary record
const DISTANCE_OFFSET: usize = NUM_LITERAL_SYMBOLS + RESERVED_WORDS;

/// Size of one binary histogram record in bytes
pub const RECORD_SIZE: usize = (DISTANCE_OFFSET + NUM_DISTANCE_SYMBOLS + RESERVED_WORDS) * 4;

/// Words per histogram in the text form
pub const WORDS_PER_HISTOGRAM: usize = MAX_CODE_LENGTHS;

/// Words per line when writing text
const WORDS_PER_LINE: usize = 8;

impl Histogram {
    /// Decode one binary record
    pub fn from_le_bytes(record: &[u8], layout: PackedLayout) -> Result<Self> {
        if record.len() != RECORD_SIZE {
            return Err(Error::TruncatedHistogram { expected: RECORD_SIZE, found: record.len() });
        }

        let word_at = |index: usize| {
            let at = index * 4;
            u32::from_le_bytes([record[at], record[at + 1], record[at + 2], record[at + 3]])
        };

        let mut histogram = Self::new();
        for (i, entry) in histogram.literals.iter_mut().enumerate() {
            *entry = layout.unpack(word_at(i));
        }
        for (i, entry) in histogram.distances.iter_mut().enumerate() {
            *entry = layout.unpack(word_at(DISTANCE_OFFSET + i));
        }
        Ok(histogram)
    }

    /// Encode as one binary record
    pub fn to_le_bytes(&self, layout: PackedLayout) -> Vec<u8> {
        let mut record = vec![0u8; RECORD_SIZE];
        for (i, &entry) in self.literals.iter().enumerate() {
            record[i * 4..i * 4 + 4].copy_from_slice(&layout.pack(entry).to_le_bytes());
        }
        for (i, &entry) in self.distances.iter().enumerate() {
            let at = (DISTANCE_OFFSET + i) * 4;
            record[at..at + 4].copy_from_slice(&layout.pack(entry).to_le_bytes());
        }
        record
    }
}

/// Read concatenated binary records until end of input
pub fn read_binary<R: Read>(reader: &mut R, layout: PackedLayout) -> Result<Vec<Histogram>> {
    let mut histograms = Vec::new();
    let mut record = [0u8; RECORD_SIZE];

    loop {
        let filled = fill_record(reader, &mut record)?;
        if filled == 0 {
            break;
        }
        if filled < RECORD_SIZE {
            return Err(Error::TruncatedHistogram { expected: RECORD_SIZE, found: filled });
        }
        histograms.push(Histogram::from_le_bytes(&record, layout)?);
    }

    Ok(histograms)
}

/// Read until `buf` is full or the input ends, returning the number of bytes read
fn fill_record<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}

/// Parse the text form into histograms
pub fn parse_text(text: &str, layout: PackedLayout) -> Result<Vec<Histogram>> {
    let mut histograms = Vec::new();
    let mut words: Vec<u32> = Vec::with_capacity(WORDS_PER_HISTOGRAM);

    for (line_idx, line) in text.lines().enumerate() {
        let content = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        };

        for token in content.split_whitespace() {
            let word = parse_word(token)
                .ok_or_else(|| Error::InvalidWord { line: line_idx + 1, word: token.to_string() })?;
            words.push(word);

            if words.len() == WORDS_PER_HISTOGRAM {
                histograms.push(histogram_from_words(&words, layout));
                words.clear();
            }
        }
    }

    if !words.is_empty() {
        return Err(Error::TruncatedHistogram { expected: WORDS_PER_HISTOGRAM, found: words.len() });
    }

    Ok(histograms)
}

fn parse_word(token: &str) -> Option<u32> {
    match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

fn histogram_from_words(words: &[u32], layout: PackedLayout) -> Histogram {
    let mut histogram = Histogram::new();
    let (literal_words, distance_words) = words.split_at(NUM_LITERAL_SYMBOLS);
    for (entry, &word) in histogram.literals.iter_mut().zip(literal_words) {
        *entry = layout.unpack(word);
    }
    for (entry, &word) in histogram.distances.iter_mut().zip(distance_words) {
        *entry = layout.unpack(word);
    }
    histogram
}

/// Write a histogram in the text form
pub fn write_text<W: Write>(
    writer: &mut W,
    histogram: &Histogram,
    layout: PackedLayout,
) -> Result<()> {
    let (literals, distances) = histogram.to_packed(layout);

    writeln!(writer, "# literal/length ({})", NUM_LITERAL_SYMBOLS)?;
    write_words(writer, &literals)?;
    writeln!(writer, "# distance ({})", NUM_DISTANCE_SYMBOLS)?;
    write_words(writer, &distances)?;
    Ok(())
}

fn write_words<W: Write>(writer: &mut W, words: &[u32]) -> Result<()> {
    for chunk in words.chunks(WORDS_PER_LINE) {
        let line: Vec<String> = chunk.iter().map(|word| format!("0x{:08x}", word)).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    Ok(())
}
