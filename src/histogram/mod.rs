//! Per-block symbol statistics handed over by the length assigner.
//!
//! Each symbol carries its assigned code length and its frequency as two separate fields.
//! Packed 32-bit words only appear at the interop boundary, see [`PackedLayout`].

pub mod dump;
pub mod fixed;

use crate::codelens::{MAX_CODE_LENGTH, NUM_DISTANCE_SYMBOLS, NUM_LITERAL_SYMBOLS};
use crate::error::{Error, Result};
use crate::Alphabet;

/// Bit position of the code length field in packed words from the length assigner
pub const DEFAULT_LENGTH_SHIFT: u32 = 15;

/// Largest supported length shift (the frequency field is 16 bits wide)
const MAX_LENGTH_SHIFT: u32 = 16;

/// Code length and frequency of a single symbol
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SymbolEntry {
    /// Assigned canonical code length (0 = unused)
    pub length: u8,
    /// Occurrence count within the block (not consumed by extraction)
    pub frequency: u16,
}

impl SymbolEntry {
    pub const fn new(length: u8, frequency: u16) -> Self {
        Self { length, frequency }
    }

    /// An entry for a symbol that gets no code
    pub const fn unused() -> Self {
        Self { length: 0, frequency: 0 }
    }

    /// Whether this symbol was assigned a code
    #[inline]
    pub fn is_used(&self) -> bool {
        self.length != 0
    }
}

/// Layout of a packed histogram word: frequency in the low bits, code length above them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedLayout {
    length_shift: u32,
}

impl PackedLayout {
    /// Create a layout with the code length stored at bit `length_shift` (1-16)
    pub fn new(length_shift: u32) -> Result<Self> {
        if length_shift == 0 || length_shift > MAX_LENGTH_SHIFT {
            return Err(Error::InvalidLayout(length_shift));
        }
        Ok(Self { length_shift })
    }

    pub fn length_shift(&self) -> u32 {
        self.length_shift
    }

    #[inline]
    fn frequency_mask(&self) -> u32 {
        (1u32 << self.length_shift) - 1
    }

    /// Extract the code length field, truncated to a byte
    #[inline]
    pub fn length_of(&self, word: u32) -> u8 {
        (word >> self.length_shift) as u8
    }

    /// Split a packed word into its two fields
    #[inline]
    pub fn unpack(&self, word: u32) -> SymbolEntry {
        SymbolEntry {
            length: self.length_of(word),
            frequency: (word & self.frequency_mask()) as u16,
        }
    }

    /// Combine an entry into a packed word (frequency is masked to the available bits)
    #[inline]
    pub fn pack(&self, entry: SymbolEntry) -> u32 {
        let frequency = entry.frequency as u32 & self.frequency_mask();
        ((entry.length as u32) << self.length_shift) | frequency
    }
}

impl Default for PackedLayout {
    fn default() -> Self {
        Self { length_shift: DEFAULT_LENGTH_SHIFT }
    }
}

/// Code lengths and frequencies for both alphabets of one block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Histogram {
    /// Literal (0-255), EOB (256) and length code (257-285) entries
    pub literals: [SymbolEntry; NUM_LITERAL_SYMBOLS],
    /// Distance code (0-29) entries
    pub distances: [SymbolEntry; NUM_DISTANCE_SYMBOLS],
}

impl Histogram {
    pub fn new() -> Self {
        Self {
            literals: [SymbolEntry::unused(); NUM_LITERAL_SYMBOLS],
            distances: [SymbolEntry::unused(); NUM_DISTANCE_SYMBOLS],
        }
    }

    /// Build a histogram from per-symbol code lengths; missing trailing symbols are unused.
    pub fn from_lengths(literal_lengths: &[u8], distance_lengths: &[u8]) -> Result<Self> {
        if literal_lengths.len() > NUM_LITERAL_SYMBOLS {
            return Err(Error::TooManySymbols {
                alphabet: Alphabet::LiteralLength,
                found: literal_lengths.len(),
                max: NUM_LITERAL_SYMBOLS,
            });
        }
        if distance_lengths.len() > NUM_DISTANCE_SYMBOLS {
            return Err(Error::TooManySymbols {
                alphabet: Alphabet::Distance,
                found: distance_lengths.len(),
                max: NUM_DISTANCE_SYMBOLS,
            });
        }

        let mut histogram = Self::new();
        for (entry, &length) in histogram.literals.iter_mut().zip(literal_lengths) {
            entry.length = length;
        }
        for (entry, &length) in histogram.distances.iter_mut().zip(distance_lengths) {
            entry.length = length;
        }
        Ok(histogram)
    }

    /// Unpack the words produced by the length assigner
    pub fn from_packed(
        literals: &[u32; NUM_LITERAL_SYMBOLS],
        distances: &[u32; NUM_DISTANCE_SYMBOLS],
        layout: PackedLayout,
    ) -> Self {
        Self {
            literals: literals.map(|word| layout.unpack(word)),
            distances: distances.map(|word| layout.unpack(word)),
        }
    }

    /// Pack both alphabets back into words
    pub fn to_packed(
        &self,
        layout: PackedLayout,
    ) -> ([u32; NUM_LITERAL_SYMBOLS], [u32; NUM_DISTANCE_SYMBOLS]) {
        let literals = self.literals.map(|entry| layout.pack(entry));
        let distances = self.distances.map(|entry| layout.pack(entry));
        (literals, distances)
    }

    pub fn entries(&self, alphabet: Alphabet) -> &[SymbolEntry] {
        match alphabet {
            Alphabet::LiteralLength => &self.literals,
            Alphabet::Distance => &self.distances,
        }
    }

    pub fn entries_mut(&mut self, alphabet: Alphabet) -> &mut [SymbolEntry] {
        match alphabet {
            Alphabet::LiteralLength => &mut self.literals,
            Alphabet::Distance => &mut self.distances,
        }
    }

    /// Set the code length of one symbol.
    ///
    /// Panics if `symbol` is outside the alphabet.
    pub fn set_length(&mut self, alphabet: Alphabet, symbol: usize, length: u8) {
        self.entries_mut(alphabet)[symbol].length = length;
    }

    /// Check that every code length fits DEFLATE's 15-bit limit
    pub fn validate(&self) -> Result<()> {
        for alphabet in [Alphabet::LiteralLength, Alphabet::Distance] {
            if let Some((symbol, entry)) =
                self.entries(alphabet).iter().enumerate().find(|(_, e)| e.length > MAX_CODE_LENGTH)
            {
                return Err(Error::InvalidCodeLength { alphabet, symbol, length: entry.length });
            }
        }
        Ok(())
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_default_shift() {
        let layout = PackedLayout::default();
        assert_eq!(layout.length_shift(), 15);
        assert_eq!(layout.length_of(3 << 15), 3);
        // Frequency bits never leak into the length
        assert_eq!(layout.length_of((3 << 15) | 0x7FFF), 3);
    }

    #[test]
    fn test_layout_unpack() {
        let layout = PackedLayout::default();
        let entry = layout.unpack((9 << 15) | 1234);
        assert_eq!(entry, SymbolEntry::new(9, 1234));
        assert_eq!(layout.pack(entry), (9 << 15) | 1234);
    }

    #[test]
    fn test_layout_pack_masks_frequency() {
        let layout = PackedLayout::default();
        // Bit 15 of the frequency would collide with the length field
        let word = layout.pack(SymbolEntry::new(2, 0xFFFF));
        assert_eq!(word, (2 << 15) | 0x7FFF);
        assert_eq!(layout.length_of(word), 2);
    }

    #[test]
    fn test_layout_custom_shift() {
        let layout = PackedLayout::new(16).unwrap();
        let entry = layout.unpack((7 << 16) | 0xFFFF);
        assert_eq!(entry, SymbolEntry::new(7, 0xFFFF));
        // Under the default layout the same word reads as a different length
        assert_eq!(PackedLayout::default().length_of((7 << 16) | 0xFFFF), 15);
    }

    #[test]
    fn test_layout_invalid_shift() {
        assert!(matches!(PackedLayout::new(0), Err(Error::InvalidLayout(0))));
        assert!(matches!(PackedLayout::new(17), Err(Error::InvalidLayout(17))));
        assert!(matches!(PackedLayout::new(24), Err(Error::InvalidLayout(24))));
        assert!(PackedLayout::new(16).is_ok());
    }

    #[test]
    fn test_layout_every_shift_round_trips() {
        for shift in 1..=16 {
            let layout = PackedLayout::new(shift).unwrap();
            let max_frequency = ((1u32 << shift) - 1) as u16;
            let entry = SymbolEntry::new(15, max_frequency);
            assert_eq!(layout.unpack(layout.pack(entry)), entry);
        }
    }

    #[test]
    fn test_symbol_entry_is_used() {
        assert!(!SymbolEntry::unused().is_used());
        assert!(!SymbolEntry::new(0, 500).is_used());
        assert!(SymbolEntry::new(1, 0).is_used());
    }

    #[test]
    fn test_from_lengths() {
        let histogram = Histogram::from_lengths(&[0, 3, 0, 2], &[1]).unwrap();
        assert_eq!(histogram.literals[1].length, 3);
        assert_eq!(histogram.literals[3].length, 2);
        assert!(histogram.literals[4..].iter().all(|e| !e.is_used()));
        assert_eq!(histogram.distances[0].length, 1);
    }

    #[test]
    fn test_from_lengths_too_many() {
        let result = Histogram::from_lengths(&[1; 287], &[]);
        assert!(matches!(result, Err(Error::TooManySymbols { found: 287, max: 286, .. })));

        let result = Histogram::from_lengths(&[], &[1; 31]);
        assert!(matches!(
            result,
            Err(Error::TooManySymbols { alphabet: Alphabet::Distance, found: 31, max: 30 })
        ));
    }

    #[test]
    fn test_packed_round_trip() {
        let layout = PackedLayout::default();
        let mut literals = [0u32; NUM_LITERAL_SYMBOLS];
        let mut distances = [0u32; NUM_DISTANCE_SYMBOLS];
        literals[65] = (8 << 15) | 42;
        literals[256] = 7 << 15;
        distances[4] = (5 << 15) | 3;

        let histogram = Histogram::from_packed(&literals, &distances, layout);
        assert_eq!(histogram.literals[65], SymbolEntry::new(8, 42));
        assert_eq!(histogram.literals[256], SymbolEntry::new(7, 0));
        assert_eq!(histogram.distances[4], SymbolEntry::new(5, 3));

        let (lit_words, dist_words) = histogram.to_packed(layout);
        assert_eq!(lit_words, literals);
        assert_eq!(dist_words, distances);
    }

    #[test]
    fn test_set_length_and_entries() {
        let mut histogram = Histogram::new();
        histogram.set_length(Alphabet::Distance, 29, 4);
        assert_eq!(histogram.entries(Alphabet::Distance)[29].length, 4);
        assert_eq!(histogram.entries(Alphabet::LiteralLength).len(), 286);
    }

    #[test]
    fn test_validate() {
        let mut histogram = Histogram::new();
        histogram.set_length(Alphabet::LiteralLength, 10, 15);
        assert!(histogram.validate().is_ok());

        histogram.set_length(Alphabet::Distance, 7, 16);
        match histogram.validate() {
            Err(Error::InvalidCodeLength { alphabet, symbol, length }) => {
                assert_eq!(alphabet, Alphabet::Distance);
                assert_eq!(symbol, 7);
                assert_eq!(length, 16);
            }
            other => panic!("expected InvalidCodeLength, got {:?}", other),
        }
    }
}
