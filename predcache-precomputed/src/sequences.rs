use std::path::Path;

use predcache_core::errors::Result;
use predcache_core::fasta::FastaReader;
use predcache_encode::{identify_normalized, normalize_sequence};

/// A sequence of the current run, named by its encoded id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedSequence {
    pub encoded_id: String,
    pub checksum: String,
    /// Normalized residues.
    pub sequence: String,
}

impl EncodedSequence {
    pub fn new(encoded_id: &str, sequence: &str) -> Result<Self> {
        let normalized = normalize_sequence(sequence);
        let identity = identify_normalized(encoded_id, &normalized)?;
        Ok(EncodedSequence {
            encoded_id: identity.external_id,
            checksum: identity.checksum,
            sequence: normalized,
        })
    }
}

/// Read an encoded FASTA, computing the checksum of every record.
pub fn read_encoded_sequences(path: &Path) -> Result<Vec<EncodedSequence>> {
    let mut sequences = Vec::new();
    for record in FastaReader::from_path(path)? {
        let record = record?;
        sequences.push(EncodedSequence::new(&record.id, &record.sequence)?);
    }
    log::debug!("Read {} sequences from {}", sequences.len(), path.display());
    Ok(sequences)
}
