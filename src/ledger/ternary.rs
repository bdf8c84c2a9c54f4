// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balanced-ternary encoding helpers.
//!
//! A tryte is three trits (each `-1`, `0` or `1`) written with the alphabet
//! `9ABCDEFGHIJKLMNOPQRSTUVWXYZ`, where `9` is zero, `A`..`M` are 1..13 and
//! `N`..`Z` are -13..-1. Trits are little-endian: the first trit of a tryte
//! is its least significant digit.

use super::client::LedgerError;

/// A single balanced-ternary digit.
pub type Trit = i8;

/// Tryte alphabet, indexed by the unsigned tryte value (0..27).
pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Largest value a single tryte can hold.
pub const MAX_TRYTE_VALUE: i8 = 13;

/// Smallest value a single tryte can hold.
pub const MIN_TRYTE_VALUE: i8 = -13;

/// Returns the signed value (-13..=13) of a tryte character.
pub fn tryte_value(c: u8) -> Option<i8> {
    let index = TRYTE_ALPHABET.iter().position(|&t| t == c)? as i8;
    Some(if index > MAX_TRYTE_VALUE { index - 27 } else { index })
}

/// Whether the string consists only of tryte characters.
pub fn is_trytes(value: &str) -> bool {
    value.bytes().all(|c| tryte_value(c).is_some())
}

/// Whether the string is exactly `length` trytes long.
pub fn is_trytes_of_length(value: &str, length: usize) -> bool {
    value.len() == length && is_trytes(value)
}

/// Decode trytes into trits.
pub fn trytes_to_trits(trytes: &str) -> Result<Vec<Trit>, LedgerError> {
    let mut trits = Vec::with_capacity(trytes.len() * 3);
    for c in trytes.bytes() {
        let value = tryte_value(c).ok_or_else(|| {
            LedgerError::InvalidTrytes(format!("unexpected character {:?}", c as char))
        })?;
        trits.extend_from_slice(&int_to_trits(value as i64, 3));
    }
    Ok(trits)
}

/// Encode trits as trytes. A trailing partial tryte is zero-padded.
pub fn trits_to_trytes(trits: &[Trit]) -> String {
    trits
        .chunks(3)
        .map(|chunk| {
            let value = chunk
                .iter()
                .rev()
                .fold(0i8, |acc, &trit| acc * 3 + trit);
            TRYTE_ALPHABET[value.rem_euclid(27) as usize] as char
        })
        .collect()
}

/// Signed values of each tryte, as used by bundle-hash normalization.
pub fn tryte_values(trytes: &str) -> Result<Vec<i8>, LedgerError> {
    trytes
        .bytes()
        .map(|c| {
            tryte_value(c).ok_or_else(|| {
                LedgerError::InvalidTrytes(format!("unexpected character {:?}", c as char))
            })
        })
        .collect()
}

/// Encode a signed integer as `length` balanced-ternary trits.
///
/// Digits that do not fit in `length` trits are dropped.
pub fn int_to_trits(value: i64, length: usize) -> Vec<Trit> {
    let mut trits = vec![0; length];
    let mut remaining = value;
    for trit in trits.iter_mut() {
        if remaining == 0 {
            break;
        }
        let digit = match remaining.rem_euclid(3) {
            2 => -1,
            d => d,
        };
        *trit = digit as Trit;
        remaining = (remaining - digit) / 3;
    }
    trits
}

/// Decode balanced-ternary trits into a signed integer.
pub fn trits_to_int(trits: &[Trit]) -> i64 {
    trits
        .iter()
        .rev()
        .fold(0i64, |acc, &trit| acc * 3 + trit as i64)
}

/// Add two balanced-ternary numbers. The result has the length of the
/// longer operand; overflow beyond it is discarded.
pub fn add_trits(lhs: &[Trit], rhs: &[Trit]) -> Vec<Trit> {
    let length = lhs.len().max(rhs.len());
    let mut out = Vec::with_capacity(length);
    let mut carry: i8 = 0;

    for i in 0..length {
        let sum = lhs.get(i).copied().unwrap_or(0) + rhs.get(i).copied().unwrap_or(0) + carry;
        let (digit, next_carry) = match sum {
            -3 => (0, -1),
            -2 => (1, -1),
            2 => (-1, 1),
            3 => (0, 1),
            s => (s, 0),
        };
        out.push(digit);
        carry = next_carry;
    }

    out
}

/// Right-pad trytes with `9` up to `length`.
pub fn pad_trytes(trytes: &str, length: usize) -> String {
    format!("{trytes:9<length$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tryte_values_cover_both_halves_of_the_alphabet() {
        assert_eq!(tryte_value(b'9'), Some(0));
        assert_eq!(tryte_value(b'A'), Some(1));
        assert_eq!(tryte_value(b'M'), Some(13));
        assert_eq!(tryte_value(b'N'), Some(-13));
        assert_eq!(tryte_value(b'Z'), Some(-1));
        assert_eq!(tryte_value(b'a'), None);
        assert_eq!(tryte_value(b'0'), None);
    }

    #[test]
    fn trytes_decode_little_endian() {
        assert_eq!(trytes_to_trits("9").unwrap(), vec![0, 0, 0]);
        assert_eq!(trytes_to_trits("A").unwrap(), vec![1, 0, 0]);
        assert_eq!(trytes_to_trits("M").unwrap(), vec![1, 1, 1]);
        assert_eq!(trytes_to_trits("N").unwrap(), vec![-1, -1, -1]);
        assert_eq!(trytes_to_trits("Z").unwrap(), vec![-1, 0, 0]);
        assert!(trytes_to_trits("AB1").is_err());
    }

    #[test]
    fn trytes_survive_trit_encoding() {
        let trytes = "GYOMKVTSNHVJNCNFBBAH9AAMXLPLLLROQY99";
        let trits = trytes_to_trits(trytes).unwrap();
        assert_eq!(trits_to_trytes(&trits), trytes);
    }

    #[test]
    fn integers_use_balanced_digits() {
        assert_eq!(int_to_trits(5, 3), vec![-1, -1, 1]);
        assert_eq!(int_to_trits(-5, 3), vec![1, 1, -1]);
        assert_eq!(trits_to_int(&int_to_trits(20_000, 27)), 20_000);
        assert_eq!(trits_to_int(&int_to_trits(-1_779_530_283, 81)), -1_779_530_283);
        assert_eq!(trits_to_trytes(&int_to_trits(5, 9)), "E99");
    }

    #[test]
    fn addition_carries_into_the_next_tryte() {
        let thirteen = trytes_to_trits("M99").unwrap();
        let sum = add_trits(&thirteen, &int_to_trits(1, 1));
        assert_eq!(trits_to_trytes(&sum), "NA9");
        assert_eq!(trits_to_int(&sum), 14);
    }

    #[test]
    fn addition_drops_overflow() {
        let max = vec![1, 1, 1];
        let sum = add_trits(&max, &[1]);
        assert_eq!(sum.len(), 3);
        assert_eq!(sum, vec![-1, -1, -1]);
    }

    #[test]
    fn padding_fills_with_nines() {
        assert_eq!(pad_trytes("ABC", 6), "ABC999");
        assert_eq!(pad_trytes("ABCDEF", 3), "ABCDEF");
    }
}
