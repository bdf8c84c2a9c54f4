// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Curl-P-81, the ternary sponge used for transaction hashes.

use super::kerl::HASH_LENGTH;
use super::ternary::Trit;

const STATE_LENGTH: usize = HASH_LENGTH * 3;
const NUMBER_OF_ROUNDS: usize = 81;
const TRUTH_TABLE: [Trit; 11] = [1, 0, -1, 2, 1, -1, 0, 2, -1, 1, 0];

pub struct CurlP81 {
    state: [Trit; STATE_LENGTH],
}

impl Default for CurlP81 {
    fn default() -> Self {
        Self::new()
    }
}

impl CurlP81 {
    pub fn new() -> Self {
        Self {
            state: [0; STATE_LENGTH],
        }
    }

    /// Absorb trits in 243-trit blocks; a short final block overwrites only
    /// the leading part of the rate.
    pub fn absorb(&mut self, trits: &[Trit]) {
        for chunk in trits.chunks(HASH_LENGTH) {
            self.state[..chunk.len()].copy_from_slice(chunk);
            self.transform();
        }
    }

    pub fn squeeze(&mut self, length: usize) -> Vec<Trit> {
        let mut out = Vec::with_capacity(length);
        while out.len() < length {
            let take = (length - out.len()).min(HASH_LENGTH);
            out.extend_from_slice(&self.state[..take]);
            self.transform();
        }
        out
    }

    /// One-shot hash: absorb `input`, squeeze one 243-trit word.
    pub fn digest(input: &[Trit]) -> Vec<Trit> {
        let mut curl = Self::new();
        curl.absorb(input);
        curl.squeeze(HASH_LENGTH)
    }

    fn transform(&mut self) {
        let mut scratch = [0 as Trit; STATE_LENGTH];
        let mut index = 0usize;

        for _ in 0..NUMBER_OF_ROUNDS {
            scratch.copy_from_slice(&self.state);
            for slot in self.state.iter_mut() {
                let previous = index;
                if index < 365 {
                    index += 364;
                } else {
                    index -= 365;
                }
                let lookup = scratch[previous] + (scratch[index] << 2) + 5;
                *slot = TRUTH_TABLE[lookup as usize];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ternary::{trits_to_trytes, trytes_to_trits};

    #[test]
    fn transaction_sized_input_matches_reference_hash() {
        let trytes: String = "ABCDEFGHIJKLMNOPQRSTUVWXYZ9"
            .chars()
            .cycle()
            .take(2673)
            .collect();
        let trits = trytes_to_trits(&trytes).unwrap();
        assert_eq!(trits.len(), 8019);

        assert_eq!(
            trits_to_trytes(&CurlP81::digest(&trits)),
            "CCKMVNGLUAFT9XX9TPXPPJQODVYZKVCNBFKUPWBNWA99FPQFQXGGFWXQPAYVPVSDVYLPMCTFOZCYYAW9M"
        );
    }

    #[test]
    fn digest_is_deterministic_and_ternary() {
        let input: Vec<Trit> = (0..HASH_LENGTH * 2).map(|i| (i % 3) as Trit - 1).collect();
        let first = CurlP81::digest(&input);
        let second = CurlP81::digest(&input);

        assert_eq!(first.len(), HASH_LENGTH);
        assert_eq!(first, second);
        assert!(first.iter().all(|t| (-1..=1).contains(t)));
    }

    #[test]
    fn single_trit_change_alters_digest() {
        let mut input = vec![0 as Trit; HASH_LENGTH];
        let base = CurlP81::digest(&input);
        input[100] = 1;
        assert_ne!(base, CurlP81::digest(&input));
    }
}
