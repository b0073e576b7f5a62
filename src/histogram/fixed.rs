use super::{Histogram, SymbolEntry};

impl Histogram {
    /// Fixed Huffman code lengths (RFC 1951 section 3.2.6), limited to the 286 transmittable
    /// literal/length symbols and 30 distance symbols.
    pub fn fixed() -> Self {
        let mut histogram = Self::new();
        for (symbol, entry) in histogram.literals.iter_mut().enumerate() {
            let length = match symbol {
                0..=143 => 8,
                144..=255 => 9,
                256..=279 => 7,
                _ => 8,
            };
            *entry = SymbolEntry::new(length, 0);
        }
        histogram.distances.fill(SymbolEntry::new(5, 0));
        histogram
    }
}
