// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Kerl sponge: Keccak-384 over 243-trit words.
//!
//! Each 243-trit chunk (last trit forced to zero) is read as a balanced
//! ternary integer and absorbed as its 384-bit two's complement, big-endian.
//! Squeezing converts the digest back to trits, then re-absorbs the
//! bitwise-inverted digest so the next squeeze yields fresh output.

use std::sync::LazyLock;

use num_bigint::BigUint;
use num_traits::One;
use sha3::{Digest, Keccak384};

use super::client::LedgerError;
use super::ternary::Trit;

/// Trits per Kerl word.
pub const HASH_LENGTH: usize = 243;

/// Bytes per Kerl word.
const BYTE_LENGTH: usize = 48;

/// Trits actually carried by a word; the last one is always zero.
const WORD_TRITS: usize = HASH_LENGTH - 1;

/// `(3^242 - 1) / 2`, the largest magnitude a word can represent.
static HALF_3: LazyLock<BigUint> =
    LazyLock::new(|| (BigUint::from(3u32).pow(WORD_TRITS as u32) - 1u32) / 2u32);

/// `2^384`.
static MODULUS: LazyLock<BigUint> = LazyLock::new(|| BigUint::one() << (BYTE_LENGTH * 8));

/// `2^384 - 1`.
static ALL_ONES: LazyLock<BigUint> = LazyLock::new(|| &*MODULUS - 1u32);

pub struct Kerl {
    keccak: Keccak384,
}

impl Default for Kerl {
    fn default() -> Self {
        Self::new()
    }
}

impl Kerl {
    pub fn new() -> Self {
        Self {
            keccak: Keccak384::new(),
        }
    }

    /// Absorb trits. The length must be a multiple of [`HASH_LENGTH`].
    pub fn absorb(&mut self, trits: &[Trit]) -> Result<(), LedgerError> {
        if trits.len() % HASH_LENGTH != 0 {
            return Err(LedgerError::InvalidTrytes(format!(
                "Kerl input length {} is not a multiple of {HASH_LENGTH}",
                trits.len()
            )));
        }

        for chunk in trits.chunks(HASH_LENGTH) {
            self.keccak.update(trits_to_bytes(chunk));
        }
        Ok(())
    }

    /// Squeeze `length` trits. The length must be a multiple of [`HASH_LENGTH`].
    pub fn squeeze(&mut self, length: usize) -> Result<Vec<Trit>, LedgerError> {
        if length % HASH_LENGTH != 0 {
            return Err(LedgerError::InvalidTrytes(format!(
                "Kerl output length {length} is not a multiple of {HASH_LENGTH}"
            )));
        }

        let mut out = Vec::with_capacity(length);
        for _ in 0..length / HASH_LENGTH {
            let digest = self.keccak.finalize_reset();
            out.extend(bytes_to_trits(&digest));

            let flipped: Vec<u8> = digest.iter().map(|byte| !byte).collect();
            self.keccak.update(&flipped);
        }
        Ok(out)
    }

    /// One-shot hash: absorb `input`, squeeze one word.
    pub fn digest(input: &[Trit]) -> Result<Vec<Trit>, LedgerError> {
        let mut kerl = Self::new();
        kerl.absorb(input)?;
        kerl.squeeze(HASH_LENGTH)
    }
}

/// Convert a 243-trit word into its 48-byte two's complement representation.
fn trits_to_bytes(trits: &[Trit]) -> [u8; BYTE_LENGTH] {
    let digits: Vec<u8> = trits[..WORD_TRITS]
        .iter()
        .map(|&trit| (trit + 1) as u8)
        .collect();
    let offset = BigUint::from_radix_le(&digits, 3).unwrap_or_default();

    let value = if offset >= *HALF_3 {
        offset - &*HALF_3
    } else {
        &*MODULUS - (&*HALF_3 - offset)
    };

    let raw = value.to_bytes_be();
    let mut bytes = [0u8; BYTE_LENGTH];
    bytes[BYTE_LENGTH - raw.len()..].copy_from_slice(&raw);
    bytes
}

/// Convert a 48-byte digest into a 243-trit word.
fn bytes_to_trits(bytes: &[u8]) -> Vec<Trit> {
    let unsigned = BigUint::from_bytes_be(bytes);
    let negative = bytes[0] & 0x80 != 0;

    let (offset, flip) = if !negative {
        (unsigned + &*HALF_3, false)
    } else {
        let inverted = &*ALL_ONES - unsigned;
        if inverted >= *HALF_3 {
            (inverted - &*HALF_3, true)
        } else {
            (&*HALF_3 - (inverted + 1u32), false)
        }
    };

    let digits = offset.to_radix_le(3);
    let mut trits: Vec<Trit> = (0..WORD_TRITS)
        .map(|i| digits.get(i).copied().unwrap_or(0) as Trit - 1)
        .collect();
    if flip {
        trits.iter_mut().for_each(|trit| *trit = -*trit);
    }
    trits.push(0);
    trits
}
