use std::path::PathBuf;

use thiserror::Error;

/// Error type shared by every predcache library crate.
///
/// All of these are fatal for the current run. Each one means that the link
/// between a checksum, its sequence, its mapping row or its byte range in the
/// store can no longer be trusted.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("The sequence {id} contains an invalid residue '{residue}' at position {position}")]
    InvalidResidue {
        id: String,
        residue: char,
        position: usize,
    },

    #[error("Malformed record at line {line} (byte offset {offset}): {reason}")]
    MalformedRecord {
        line: usize,
        offset: u64,
        reason: String,
    },

    #[error("Invalid result record: {0}")]
    InvalidRecord(String),

    #[error("Checksum {0} was not found in the identifier mapping table")]
    UnknownChecksum(String),

    #[error("Sequence {0} was not found in the input FASTA")]
    UnknownSequence(String),

    #[error(
        "Cannot encode more than {capacity} distinct sequences with prefix '{prefix}' and id length {length}"
    )]
    EncodingSpaceExhausted {
        prefix: String,
        length: usize,
        capacity: u64,
    },

    #[error("Unknown analysis: {0}")]
    UnknownAnalysis(String),

    #[error("Malformed table {path:?} at line {line}: {reason}")]
    MalformedTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Malformed FASTA at line {line}: {reason}")]
    MalformedFasta { line: usize, reason: String },

    #[error("Invalid output template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for predcache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
