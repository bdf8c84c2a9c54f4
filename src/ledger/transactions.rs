// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction encoding and bundle preparation.
//!
//! A bundle lists outputs first, then one transaction per security level for
//! each input (the first carries the negative balance), then the remainder.
//! Its hash is the Kerl hash of every transaction essence. The prepared
//! trytes are returned last index first, the order the node expects for
//! attachment.

use super::client::LedgerError;
use super::curl::CurlP81;
use super::kerl::{Kerl, HASH_LENGTH};
use super::signing::{
    normalize_address, normalized_bundle, private_key, signature_fragment, FRAGMENT_LENGTH,
};
use super::ternary::{
    add_trits, int_to_trits, is_trytes_of_length, pad_trytes, trits_to_int, trits_to_trytes,
    trytes_to_trits, Trit, MAX_TRYTE_VALUE,
};
use super::types::{
    PrepareOptions, Seed, Transaction, Transfer, HASH_TRYTES_LENGTH, SIGNATURE_FRAGMENT_LENGTH,
    TAG_LENGTH, TRANSACTION_TRYTES_LENGTH,
};

const VALUE_TRITS: usize = 81;
const TIMESTAMP_TRITS: usize = 27;
const INDEX_TRITS: usize = 27;

/// Field widths in trytes, in wire order.
const SIGNATURE_END: usize = SIGNATURE_FRAGMENT_LENGTH;
const ADDRESS_END: usize = SIGNATURE_END + 81;
const VALUE_END: usize = ADDRESS_END + VALUE_TRITS / 3;
const OBSOLETE_TAG_END: usize = VALUE_END + TAG_LENGTH;
const TIMESTAMP_END: usize = OBSOLETE_TAG_END + TIMESTAMP_TRITS / 3;
const CURRENT_INDEX_END: usize = TIMESTAMP_END + INDEX_TRITS / 3;
const LAST_INDEX_END: usize = CURRENT_INDEX_END + INDEX_TRITS / 3;
const BUNDLE_END: usize = LAST_INDEX_END + HASH_TRYTES_LENGTH;
const TRUNK_END: usize = BUNDLE_END + HASH_TRYTES_LENGTH;
const BRANCH_END: usize = TRUNK_END + HASH_TRYTES_LENGTH;
const TAG_END: usize = BRANCH_END + TAG_LENGTH;
const ATTACHMENT_END: usize = TAG_END + TIMESTAMP_TRITS / 3;
const LOWER_BOUND_END: usize = ATTACHMENT_END + TIMESTAMP_TRITS / 3;
const UPPER_BOUND_END: usize = LOWER_BOUND_END + TIMESTAMP_TRITS / 3;

impl Transaction {
    /// Parse 2673 transaction trytes, computing the Curl-P-81 hash.
    pub fn from_trytes(trytes: &str) -> Result<Self, LedgerError> {
        if !is_trytes_of_length(trytes, TRANSACTION_TRYTES_LENGTH) {
            return Err(LedgerError::InvalidTrytes(format!(
                "transaction must be {TRANSACTION_TRYTES_LENGTH} trytes, got {}",
                trytes.len()
            )));
        }

        let trits = trytes_to_trits(trytes)?;
        let hash = trits_to_trytes(&CurlP81::digest(&trits));
        let int_field = |start: usize, end: usize| trits_to_int(&trits[start * 3..end * 3]);

        Ok(Self {
            hash,
            signature_message_fragment: trytes[..SIGNATURE_END].to_string(),
            address: trytes[SIGNATURE_END..ADDRESS_END].to_string(),
            value: int_field(ADDRESS_END, VALUE_END),
            obsolete_tag: trytes[VALUE_END..OBSOLETE_TAG_END].to_string(),
            timestamp: int_field(OBSOLETE_TAG_END, TIMESTAMP_END),
            current_index: int_field(TIMESTAMP_END, CURRENT_INDEX_END),
            last_index: int_field(CURRENT_INDEX_END, LAST_INDEX_END),
            bundle: trytes[LAST_INDEX_END..BUNDLE_END].to_string(),
            trunk_transaction: trytes[BUNDLE_END..TRUNK_END].to_string(),
            branch_transaction: trytes[TRUNK_END..BRANCH_END].to_string(),
            tag: trytes[BRANCH_END..TAG_END].to_string(),
            attachment_timestamp: int_field(TAG_END, ATTACHMENT_END),
            attachment_timestamp_lower_bound: int_field(ATTACHMENT_END, LOWER_BOUND_END),
            attachment_timestamp_upper_bound: int_field(LOWER_BOUND_END, UPPER_BOUND_END),
            nonce: trytes[UPPER_BOUND_END..].to_string(),
        })
    }

    /// Encode the transaction as 2673 trytes. The hash is not part of the encoding.
    pub fn to_trytes(&self) -> String {
        let int_trytes = |value: i64, length: usize| trits_to_trytes(&int_to_trits(value, length));

        let mut out = String::with_capacity(TRANSACTION_TRYTES_LENGTH);
        out.push_str(&pad_trytes(&self.signature_message_fragment, SIGNATURE_FRAGMENT_LENGTH));
        out.push_str(&self.address);
        out.push_str(&int_trytes(self.value, VALUE_TRITS));
        out.push_str(&pad_trytes(&self.obsolete_tag, TAG_LENGTH));
        out.push_str(&int_trytes(self.timestamp, TIMESTAMP_TRITS));
        out.push_str(&int_trytes(self.current_index, INDEX_TRITS));
        out.push_str(&int_trytes(self.last_index, INDEX_TRITS));
        out.push_str(&self.bundle);
        out.push_str(&self.trunk_transaction);
        out.push_str(&self.branch_transaction);
        out.push_str(&pad_trytes(&self.tag, TAG_LENGTH));
        out.push_str(&int_trytes(self.attachment_timestamp, TIMESTAMP_TRITS));
        out.push_str(&int_trytes(self.attachment_timestamp_lower_bound, TIMESTAMP_TRITS));
        out.push_str(&int_trytes(self.attachment_timestamp_upper_bound, TIMESTAMP_TRITS));
        out.push_str(&pad_trytes(&self.nonce, TAG_LENGTH));
        out
    }

    /// Bundle essence: the fields covered by the bundle hash.
    fn essence_trits(&self) -> Result<Vec<Trit>, LedgerError> {
        let mut trits = trytes_to_trits(&self.address)?;
        trits.extend(int_to_trits(self.value, VALUE_TRITS));
        trits.extend(trytes_to_trits(&self.obsolete_tag)?);
        trits.extend(int_to_trits(self.timestamp, TIMESTAMP_TRITS));
        trits.extend(int_to_trits(self.current_index, INDEX_TRITS));
        trits.extend(int_to_trits(self.last_index, INDEX_TRITS));
        Ok(trits)
    }
}

/// Build and sign a bundle, stamped with the current time.
pub fn prepare_transfers(
    seed: &Seed,
    transfers: &[Transfer],
    options: &PrepareOptions,
) -> Result<Vec<String>, LedgerError> {
    prepare_transfers_at(seed, transfers, options, chrono::Utc::now().timestamp())
}

/// Build and sign a bundle with an explicit timestamp (seconds).
pub fn prepare_transfers_at(
    seed: &Seed,
    transfers: &[Transfer],
    options: &PrepareOptions,
    timestamp: i64,
) -> Result<Vec<String>, LedgerError> {
    let total_value: u64 = transfers.iter().map(|t| t.value).sum();
    let total_balance: u64 = options.inputs.iter().map(|i| i.balance).sum();

    if total_value > total_balance {
        return Err(LedgerError::InsufficientBalance {
            required: total_value,
            available: total_balance,
        });
    }

    let empty_tag = pad_trytes("", TAG_LENGTH);
    let mut bundle: Vec<Transaction> = Vec::new();
    let entry = |address: String, value: i64| Transaction {
        address,
        value,
        obsolete_tag: empty_tag.clone(),
        tag: empty_tag.clone(),
        timestamp,
        ..Transaction::default()
    };

    for transfer in transfers {
        let address = normalize_address(&transfer.address)?;
        bundle.push(entry(address, to_signed(transfer.value)?));
    }

    for input in &options.inputs {
        let address = normalize_address(&input.address)?;
        for fragment in 0..input.security {
            let value = if fragment == 0 {
                -to_signed(input.balance)?
            } else {
                0
            };
            bundle.push(entry(address.clone(), value));
        }
    }

    let change = total_balance - total_value;
    if change > 0 {
        let remainder = options.remainder_address.as_deref().ok_or_else(|| {
            LedgerError::Internal("bundle has change but no remainder address".to_string())
        })?;
        bundle.push(entry(normalize_address(remainder)?, to_signed(change)?));
    }

    let bundle_hash = finalize(&mut bundle)?;
    let normalized = normalized_bundle(&bundle_hash)?;

    let empty_hash = pad_trytes("", HASH_TRYTES_LENGTH);
    for tx in bundle.iter_mut() {
        tx.bundle = bundle_hash.clone();
        tx.signature_message_fragment = pad_trytes("", SIGNATURE_FRAGMENT_LENGTH);
        tx.trunk_transaction = empty_hash.clone();
        tx.branch_transaction = empty_hash.clone();
        tx.nonce = empty_tag.clone();
    }

    sign_inputs(seed, &mut bundle, options, &normalized)?;

    Ok(bundle.iter().rev().map(Transaction::to_trytes).collect())
}

/// Index the bundle and compute its hash, bumping the first obsolete tag until
/// the normalized hash contains no maximal tryte.
fn finalize(bundle: &mut [Transaction]) -> Result<String, LedgerError> {
    let last_index = bundle.len() as i64 - 1;
    for (index, tx) in bundle.iter_mut().enumerate() {
        tx.current_index = index as i64;
        tx.last_index = last_index;
    }

    loop {
        let mut kerl = Kerl::new();
        for tx in bundle.iter() {
            kerl.absorb(&tx.essence_trits()?)?;
        }
        let hash = trits_to_trytes(&kerl.squeeze(HASH_LENGTH)?);

        if !normalized_bundle(&hash)?.contains(&MAX_TRYTE_VALUE) {
            return Ok(hash);
        }

        let first = bundle
            .first_mut()
            .ok_or_else(|| LedgerError::Internal("empty bundle".to_string()))?;
        let bumped = add_trits(&trytes_to_trits(&first.obsolete_tag)?, &[1]);
        first.obsolete_tag = trits_to_trytes(&bumped);
    }
}

fn sign_inputs(
    seed: &Seed,
    bundle: &mut [Transaction],
    options: &PrepareOptions,
    normalized: &[i8],
) -> Result<(), LedgerError> {
    let mut position = 0;
    for input in &options.inputs {
        let address = normalize_address(&input.address)?;
        let start = bundle
            .iter()
            .skip(position)
            .position(|tx| tx.address == address && tx.value < 0)
            .map(|offset| position + offset)
            .ok_or_else(|| LedgerError::Internal(format!("input {address} not in bundle")))?;

        let key = private_key(seed, input.key_index, input.security)?;
        for fragment in 0..input.security {
            let block = fragment % 3;
            let signature = signature_fragment(
                &normalized[block * 27..(block + 1) * 27],
                &key[fragment * FRAGMENT_LENGTH..(fragment + 1) * FRAGMENT_LENGTH],
            )?;
            bundle[start + fragment].signature_message_fragment = trits_to_trytes(&signature);
        }
        position = start + input.security;
    }
    Ok(())
}

fn to_signed(value: u64) -> Result<i64, LedgerError> {
    i64::try_from(value).map_err(|_| LedgerError::Internal(format!("value {value} too large")))
}
