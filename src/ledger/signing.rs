// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Seed-derived keys, addresses and Winternitz one-time signatures.
//!
//! Every key index of a seed owns one address. A private key has 27 chunks of
//! 243 trits per security level; hashing each chunk 26 times and then the
//! whole fragment yields the fragment digest, and the address is the hash of
//! all digests. Signing hashes each chunk `13 - n` times, where `n` is the
//! matching tryte of the normalized bundle hash.

use super::client::LedgerError;
use super::kerl::{Kerl, HASH_LENGTH};
use super::ternary::{
    add_trits, int_to_trits, is_trytes_of_length, trits_to_trytes, trytes_to_trits, tryte_values,
    Trit, MAX_TRYTE_VALUE, MIN_TRYTE_VALUE,
};
use super::types::{Seed, ADDRESS_LENGTH, ADDRESS_WITH_CHECKSUM_LENGTH, CHECKSUM_LENGTH};

/// Hash chunks per key fragment.
pub const CHUNKS_PER_FRAGMENT: usize = 27;

/// Trits in one key fragment (one security level).
pub const FRAGMENT_LENGTH: usize = HASH_LENGTH * CHUNKS_PER_FRAGMENT;

/// Trytes of the bundle hash covered by one signature fragment.
const NORMALIZED_BLOCK: usize = 27;

/// Derive the address for `index` as 81 trytes, without checksum.
pub fn generate_address(seed: &Seed, index: u64, security: usize) -> Result<String, LedgerError> {
    let key = private_key(seed, index, security)?;
    let digests = digests(&key)?;
    let address = Kerl::digest(&digests)?;
    Ok(trits_to_trytes(&address))
}

/// Seed offset by `index`, hashed once.
fn subseed(seed: &Seed, index: u64) -> Result<Vec<Trit>, LedgerError> {
    let seed_trits = trytes_to_trits(seed.as_str())?;
    let index = i64::try_from(index)
        .map_err(|_| LedgerError::Internal(format!("key index {index} out of range")))?;
    let offset = add_trits(&seed_trits, &int_to_trits(index, HASH_LENGTH));
    Kerl::digest(&offset)
}

/// Private key for `index`: `security` fragments of 6561 trits.
pub fn private_key(seed: &Seed, index: u64, security: usize) -> Result<Vec<Trit>, LedgerError> {
    if !(1..=3).contains(&security) {
        return Err(LedgerError::Internal(format!(
            "security level {security} is not 1, 2 or 3"
        )));
    }

    let subseed = subseed(seed, index)?;
    let mut kerl = Kerl::new();
    kerl.absorb(&subseed)?;
    kerl.squeeze(FRAGMENT_LENGTH * security)
}

/// One 243-trit digest per key fragment.
pub fn digests(key: &[Trit]) -> Result<Vec<Trit>, LedgerError> {
    let mut out = Vec::with_capacity(key.len() / CHUNKS_PER_FRAGMENT);

    for fragment in key.chunks(FRAGMENT_LENGTH) {
        let mut hashed = Vec::with_capacity(FRAGMENT_LENGTH);
        for chunk in fragment.chunks(HASH_LENGTH) {
            let mut current = chunk.to_vec();
            for _ in 0..(MAX_TRYTE_VALUE - MIN_TRYTE_VALUE) {
                current = Kerl::digest(&current)?;
            }
            hashed.extend(current);
        }
        out.extend(Kerl::digest(&hashed)?);
    }

    Ok(out)
}

/// The 9-tryte checksum appended to an address.
pub fn address_checksum(address: &str) -> Result<String, LedgerError> {
    if !is_trytes_of_length(address, ADDRESS_LENGTH) {
        return Err(LedgerError::InvalidAddress(address.to_string()));
    }
    let hash = trits_to_trytes(&Kerl::digest(&trytes_to_trits(address)?)?);
    Ok(hash[ADDRESS_LENGTH - CHECKSUM_LENGTH..].to_string())
}

/// Append the checksum to an 81-tryte address.
pub fn add_checksum(address: &str) -> Result<String, LedgerError> {
    Ok(format!("{address}{}", address_checksum(address)?))
}

/// Validate a recipient and return it as 81 trytes.
///
/// Accepts a bare address or one carrying a correct checksum.
pub fn normalize_address(address: &str) -> Result<String, LedgerError> {
    if is_trytes_of_length(address, ADDRESS_LENGTH) {
        return Ok(address.to_string());
    }

    if is_trytes_of_length(address, ADDRESS_WITH_CHECKSUM_LENGTH) {
        let (bare, checksum) = address.split_at(ADDRESS_LENGTH);
        if address_checksum(bare)? != checksum {
            return Err(LedgerError::InvalidChecksum(address.to_string()));
        }
        return Ok(bare.to_string());
    }

    Err(LedgerError::InvalidAddress(address.to_string()))
}

/// Normalize a bundle hash so every 27-tryte block sums to zero.
pub fn normalized_bundle(bundle_hash: &str) -> Result<Vec<i8>, LedgerError> {
    let mut normalized = tryte_values(bundle_hash)?;

    for block in normalized.chunks_mut(NORMALIZED_BLOCK) {
        let mut sum: i32 = block.iter().map(|&v| v as i32).sum();

        while sum > 0 {
            if let Some(value) = block.iter_mut().find(|v| **v > MIN_TRYTE_VALUE) {
                *value -= 1;
            }
            sum -= 1;
        }
        while sum < 0 {
            if let Some(value) = block.iter_mut().find(|v| **v < MAX_TRYTE_VALUE) {
                *value += 1;
            }
            sum += 1;
        }
    }

    Ok(normalized)
}

/// Sign one 27-tryte block of the normalized bundle hash with one key fragment.
pub fn signature_fragment(
    normalized_block: &[i8],
    key_fragment: &[Trit],
) -> Result<Vec<Trit>, LedgerError> {
    if normalized_block.len() != NORMALIZED_BLOCK || key_fragment.len() != FRAGMENT_LENGTH {
        return Err(LedgerError::Internal(
            "signature fragment input has the wrong length".to_string(),
        ));
    }

    let mut signature = Vec::with_capacity(FRAGMENT_LENGTH);
    for (chunk, &value) in key_fragment.chunks(HASH_LENGTH).zip(normalized_block) {
        let mut current = chunk.to_vec();
        for _ in 0..(MAX_TRYTE_VALUE - value) {
            current = Kerl::digest(&current)?;
        }
        signature.extend(current);
    }
    Ok(signature)
}
