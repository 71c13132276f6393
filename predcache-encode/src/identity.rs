//! Content identity for protein sequences.
//!
//! The checksum computed here is the key of the whole cache: a cache built by
//! one run is only reusable by another if both derive exactly the same
//! checksum for the same residues. Do not change the normalization rules or
//! the hash without invalidating every existing store.

use base64::prelude::{BASE64_STANDARD_NO_PAD, Engine as _};
use md5::Md5;
use sha1::{Digest, Sha1};

use predcache_core::errors::{CacheError, Result};

/// The 20 standard amino acids plus `X` for unknown residues.
pub const STANDARD_RESIDUES: &[u8] = b"ACDEFGHIKLMNPQRSTVWYX";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceIdentity {
    pub external_id: String,
    /// SEGUID of the normalized residues. Used as the cache key.
    pub checksum: String,
    /// MD5 hex digest of the normalized residues. Informational only.
    pub digest: String,
}

///
/// Normalize a raw protein sequence.
///
/// Gap characters (`-`, `.`) are removed, trailing stop markers (`*`) are
/// dropped, residues are uppercased and the ambiguous or rare codes
/// `J B Z U O` as well as internal stops become `X`.
///
/// Normalizing an already normalized sequence returns it unchanged.
///
pub fn normalize_sequence(sequence: &str) -> String {
    let degapped: String = sequence
        .chars()
        .filter(|c| *c != '-' && *c != '.' && !c.is_whitespace())
        .collect();

    degapped
        .trim_end_matches('*')
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'J' | 'B' | 'Z' | 'U' | 'O' | '*' => 'X',
            upper => upper,
        })
        .collect()
}

fn validate_residues(external_id: &str, normalized: &str) -> Result<()> {
    match normalized
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii() || !STANDARD_RESIDUES.contains(&(*c as u8)))
    {
        Some((position, residue)) => Err(CacheError::InvalidResidue {
            id: external_id.to_string(),
            residue,
            position,
        }),
        None => Ok(()),
    }
}

/// SEGUID checksum: SHA-1 of the residues, base64 encoded with the standard
/// alphabet and without padding.
pub fn checksum(normalized: &str) -> String {
    BASE64_STANDARD_NO_PAD.encode(Sha1::digest(normalized.as_bytes()))
}

pub fn md5sum(normalized: &str) -> String {
    format!("{:x}", Md5::digest(normalized.as_bytes()))
}

///
/// Compute the identity of a sequence that has already been normalized.
///
/// # Errors
///
/// Returns `InvalidResidue` if any character outside [`STANDARD_RESIDUES`]
/// is present.
///
pub fn identify_normalized(external_id: &str, normalized: &str) -> Result<SequenceIdentity> {
    validate_residues(external_id, normalized)?;

    Ok(SequenceIdentity {
        external_id: external_id.to_string(),
        checksum: checksum(normalized),
        digest: md5sum(normalized),
    })
}

/// Normalize a raw sequence and compute its identity.
pub fn identify(external_id: &str, sequence: &str) -> Result<SequenceIdentity> {
    identify_normalized(external_id, &normalize_sequence(sequence))
}
