//! Run-length coding of the code length sequence with the code length alphabet
//! (RFC 1951 section 3.2.7).
//!
//! Symbols 0-15 are literal code lengths; 16 repeats the previous length 3-6 times,
//! 17 emits 3-10 zeros and 18 emits 11-138 zeros.

use crate::codelens::MAX_CODE_LENGTH;
use crate::error::{Error, Result};

/// Order in which code length code lengths are sent in the header
pub const CODE_LENGTH_ORDER: [usize; 19] =
    [16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];

/// Size of the code length alphabet
pub const NUM_CODE_LENGTH_SYMBOLS: usize = 19;

/// Repeat previous length 3-6 times
const REPEAT_PREVIOUS: u8 = 16;
/// Repeat zero 3-10 times
const REPEAT_ZERO_SHORT: u8 = 17;
/// Repeat zero 11-138 times
const REPEAT_ZERO_LONG: u8 = 18;

/// Minimum number of header code length codes (HCLEN + 4)
const MIN_CODE_LENGTH_CODES: usize = 4;

/// One symbol of the code length alphabet with its extra-bits value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeLengthToken {
    pub symbol: u8,
    pub extra: u8,
}

impl CodeLengthToken {
    pub const fn new(symbol: u8, extra: u8) -> Self {
        Self { symbol, extra }
    }

    /// A literal code length (0-15)
    pub const fn length(length: u8) -> Self {
        Self { symbol: length, extra: 0 }
    }

    /// Number of extra bits following this symbol in the header
    pub fn extra_bits(&self) -> u8 {
        match self.symbol {
            REPEAT_PREVIOUS => 2,
            REPEAT_ZERO_SHORT => 3,
            REPEAT_ZERO_LONG => 7,
            _ => 0,
        }
    }

    /// Number of code lengths this token stands for
    pub fn run_length(&self) -> usize {
        match self.symbol {
            REPEAT_PREVIOUS | REPEAT_ZERO_SHORT => self.extra as usize + 3,
            REPEAT_ZERO_LONG => self.extra as usize + 11,
            _ => 1,
        }
    }
}

/// Run-length encode a code length sequence using symbols 16, 17 and 18.
///
/// The literal/length and distance segments are encoded as one sequence; runs may cross
/// from one into the other. A length above 15 has no literal symbol and is rejected.
pub fn encode(lengths: &[u8]) -> Result<Vec<CodeLengthToken>> {
    if let Some(position) = lengths.iter().position(|&l| l > MAX_CODE_LENGTH) {
        return Err(Error::UnencodableLength { position, length: lengths[position] });
    }

    let mut result = Vec::new();
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let mut run = lengths[i..].iter().take_while(|&&l| l == len).count();
        i += run;

        if len == 0 {
            while run > 0 {
                if run >= 11 {
                    let count = run.min(138);
                    result.push(CodeLengthToken::new(REPEAT_ZERO_LONG, (count - 11) as u8));
                    run -= count;
                } else if run >= 3 {
                    let count = run.min(10);
                    result.push(CodeLengthToken::new(REPEAT_ZERO_SHORT, (count - 3) as u8));
                    run -= count;
                } else {
                    result.push(CodeLengthToken::length(0));
                    run -= 1;
                }
            }
        } else {
            // The first length of a run is always sent literally
            result.push(CodeLengthToken::length(len));
            run -= 1;

            while run > 0 {
                if run >= 3 {
                    let count = run.min(6);
                    result.push(CodeLengthToken::new(REPEAT_PREVIOUS, (count - 3) as u8));
                    run -= count;
                } else {
                    result.push(CodeLengthToken::length(len));
                    run -= 1;
                }
            }
        }
    }

    Ok(result)
}

/// Expand tokens back into the code length sequence
pub fn expand(tokens: &[CodeLengthToken]) -> Result<Vec<u8>> {
    let mut lengths: Vec<u8> = Vec::with_capacity(tokens.len() * 2);

    for token in tokens {
        match token.symbol {
            0..=15 => lengths.push(token.symbol),
            REPEAT_PREVIOUS => {
                let prev = *lengths.last().ok_or(Error::RepeatWithoutPrevious)?;
                lengths.resize(lengths.len() + token.run_length(), prev);
            }
            REPEAT_ZERO_SHORT | REPEAT_ZERO_LONG => {
                lengths.resize(lengths.len() + token.run_length(), 0);
            }
            sym => return Err(Error::InvalidCodeLengthSymbol(sym)),
        }
    }

    Ok(lengths)
}

/// Count how often each code length symbol (0-18) occurs
pub fn symbol_frequencies(tokens: &[CodeLengthToken]) -> Result<[u32; NUM_CODE_LENGTH_SYMBOLS]> {
    let mut freq = [0u32; NUM_CODE_LENGTH_SYMBOLS];
    for token in tokens {
        let slot = freq
            .get_mut(token.symbol as usize)
            .ok_or(Error::InvalidCodeLengthSymbol(token.symbol))?;
        *slot += 1;
    }
    Ok(freq)
}

/// Number of code length code lengths to send (HCLEN + 4), given the lengths assigned to the
/// code length alphabet.
pub fn num_code_length_codes(cl_lengths: &[u8; NUM_CODE_LENGTH_SYMBOLS]) -> usize {
    CODE_LENGTH_ORDER
        .iter()
        .rposition(|&sym| cl_lengths[sym] > 0)
        .map_or(MIN_CODE_LENGTH_CODES, |last| (last + 1).max(MIN_CODE_LENGTH_CODES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_zeros() {
        // Run of 20 zeros becomes one symbol 18
        let encoded = encode(&[0u8; 20]).unwrap();
        assert_eq!(encoded, vec![CodeLengthToken { symbol: 18, extra: 9 }]);
    }

    #[test]
    fn test_encode_long_zero_run_splits() {
        // 150 zeros: 138 with symbol 18, remaining 12 with another 18
        let encoded = encode(&[0u8; 150]).unwrap();
        assert_eq!(
            encoded,
            vec![CodeLengthToken::new(18, 127), CodeLengthToken::new(18, 1)]
        );
    }

    #[test]
    fn test_encode_short_zero_runs() {
        assert_eq!(encode(&[0, 0]).unwrap(), vec![CodeLengthToken::length(0); 2]);
        assert_eq!(encode(&[0; 5]).unwrap(), vec![CodeLengthToken { symbol: 17, extra: 2 }]);
    }

    #[test]
    fn test_encode_repeat() {
        // 5, then repeat 6, then repeat 3
        let encoded = encode(&[5u8; 10]).unwrap();
        assert_eq!(
            encoded,
            vec![
                CodeLengthToken::length(5),
                CodeLengthToken { symbol: 16, extra: 3 },
                CodeLengthToken { symbol: 16, extra: 0 },
            ]
        );
    }

    #[test]
    fn test_encode_repeat_short_tail() {
        // 4 of the same: literal + repeat 3
        assert_eq!(
            encode(&[7, 7, 7, 7]).unwrap(),
            vec![CodeLengthToken::length(7), CodeLengthToken { symbol: 16, extra: 0 }]
        );
        // 3 of the same: too short for symbol 16 after the first
        assert_eq!(encode(&[7, 7, 7]).unwrap(), vec![CodeLengthToken::length(7); 3]);
    }

    #[test]
    fn test_encode_placeholder_sequence() {
        // Literal-only block: five zeros, length 3, placeholder distance 1
        let encoded = encode(&[0, 0, 0, 0, 0, 3, 1]).unwrap();
        assert_eq!(
            encoded,
            vec![
                CodeLengthToken { symbol: 17, extra: 2 },
                CodeLengthToken::length(3),
                CodeLengthToken::length(1),
            ]
        );
    }

    #[test]
    fn test_encode_run_crosses_segments() {
        // Trailing literal lengths and leading distance lengths share one run
        let mut lengths = vec![8u8; 4];
        lengths.extend_from_slice(&[8, 8, 8]);
        let encoded = encode(&lengths).unwrap();
        assert_eq!(
            encoded,
            vec![CodeLengthToken::length(8), CodeLengthToken { symbol: 16, extra: 3 }]
        );
    }

    #[test]
    fn test_expand_inverts_encode() {
        let lengths: Vec<u8> = [0u8; 144]
            .iter()
            .chain([8u8; 10].iter())
            .chain([0u8, 0, 9, 9, 9, 9, 9, 0, 7].iter())
            .copied()
            .collect();
        assert_eq!(expand(&encode(&lengths).unwrap()).unwrap(), lengths);
    }

    #[test]
    fn test_expand_repeat_without_previous() {
        let result = expand(&[CodeLengthToken { symbol: 16, extra: 0 }]);
        assert!(matches!(result, Err(Error::RepeatWithoutPrevious)));
    }

    #[test]
    fn test_expand_invalid_symbol() {
        let result = expand(&[CodeLengthToken { symbol: 19, extra: 0 }]);
        assert!(matches!(result, Err(Error::InvalidCodeLengthSymbol(19))));
    }

    #[test]
    fn test_token_extra_bits_and_runs() {
        assert_eq!(CodeLengthToken::length(9).extra_bits(), 0);
        assert_eq!(CodeLengthToken::length(9).run_length(), 1);
        assert_eq!(CodeLengthToken { symbol: 16, extra: 3 }.extra_bits(), 2);
        assert_eq!(CodeLengthToken { symbol: 16, extra: 3 }.run_length(), 6);
        assert_eq!(CodeLengthToken { symbol: 17, extra: 7 }.extra_bits(), 3);
        assert_eq!(CodeLengthToken { symbol: 17, extra: 7 }.run_length(), 10);
        assert_eq!(CodeLengthToken { symbol: 18, extra: 127 }.extra_bits(), 7);
        assert_eq!(CodeLengthToken { symbol: 18, extra: 127 }.run_length(), 138);
    }

    #[test]
    fn test_symbol_frequencies() {
        let tokens = encode(&[0, 0, 0, 0, 0, 3, 3, 1]).unwrap();
        let freq = symbol_frequencies(&tokens).unwrap();
        assert_eq!(freq[17], 1);
        assert_eq!(freq[3], 2);
        assert_eq!(freq[1], 1);
        assert_eq!(freq.iter().sum::<u32>(), tokens.len() as u32);
    }

    #[test]
    fn test_encode_rejects_lengths_above_15() {
        // 16 would read back as "repeat previous"
        match encode(&[4, 16, 1]) {
            Err(Error::UnencodableLength { position, length }) => {
                assert_eq!(position, 1);
                assert_eq!(length, 16);
            }
            other => panic!("expected UnencodableLength, got {:?}", other),
        }
        assert!(matches!(
            encode(&[0, 0, 20]),
            Err(Error::UnencodableLength { position: 2, length: 20 })
        ));
        assert!(encode(&[15, 15, 15, 15]).is_ok());
    }

    #[test]
    fn test_symbol_frequencies_invalid_symbol() {
        let tokens = [CodeLengthToken::length(3), CodeLengthToken::new(20, 0)];
        assert!(matches!(symbol_frequencies(&tokens), Err(Error::InvalidCodeLengthSymbol(20))));
    }

    #[test]
    fn test_num_code_length_codes() {
        // Nothing assigned: minimum of 4
        assert_eq!(num_code_length_codes(&[0; 19]), 4);

        // Symbol 1 is second to last in the send order
        let mut cl_lengths = [0u8; 19];
        cl_lengths[1] = 2;
        cl_lengths[0] = 2;
        assert_eq!(num_code_length_codes(&cl_lengths), 18);

        // Symbol 15 is last
        cl_lengths[15] = 3;
        assert_eq!(num_code_length_codes(&cl_lengths), 19);

        // Only symbols early in the order
        let mut early = [0u8; 19];
        early[16] = 1;
        early[18] = 1;
        assert_eq!(num_code_length_codes(&early), 4);
    }
}
