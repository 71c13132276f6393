use std::io::Write;
use std::path::Path;

use fxhash::FxHashMap as HashMap;

use predcache_core::consts::{DEFAULT_ENCODE_CHUNK_SIZE, DEFAULT_FASTA_LINE_WIDTH};
use predcache_core::errors::Result;
use predcache_core::fasta::{FastaReader, write_fasta_record};
use predcache_core::utils::base_name;

use crate::baseconv::IdConverter;
use crate::identity::{identify_normalized, normalize_sequence};
use crate::table::IdentifierMapping;

/// The outcome of encoding one input sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoded {
    /// Always present, duplicates included.
    pub mapping: IdentifierMapping,
    /// The normalized residues, only for the first occurrence of a checksum.
    pub new_sequence: Option<String>,
}

///
/// Deduplicating short identifier assignment.
///
/// Holds every piece of mutable state the encoding needs: the checksums
/// seen so far and the next sequence number. Numbering starts at 1, so with
/// prefix `SR` and length 3 the first distinct sequence is `SR001`.
///
#[derive(Debug)]
pub struct Encoder {
    converter: IdConverter,
    seen: HashMap<String, String>,
    next: u64,
}

impl Encoder {
    pub fn new(converter: IdConverter) -> Self {
        Encoder {
            converter,
            seen: HashMap::default(),
            next: 1,
        }
    }

    /// Number of distinct checksums encoded so far.
    pub fn n_distinct(&self) -> usize {
        self.seen.len()
    }

    /// The encoded id already assigned to `checksum`, if any.
    pub fn lookup(&self, checksum: &str) -> Option<&str> {
        self.seen.get(checksum).map(String::as_str)
    }

    ///
    /// Encode one sequence occurrence.
    ///
    /// # Arguments
    ///
    /// - source_file: the name of the file the sequence came from
    /// - external_id: the sequence's original name
    /// - sequence: the raw residues
    ///
    pub fn encode(
        &mut self,
        source_file: &str,
        external_id: &str,
        sequence: &str,
    ) -> Result<Encoded> {
        let normalized = normalize_sequence(sequence);
        let identity = identify_normalized(external_id, &normalized)?;

        let (encoded_id, new_sequence) = match self.seen.get(&identity.checksum) {
            Some(existing) => (existing.clone(), None),
            None => {
                let encoded_id = self.converter.encode(self.next)?;
                self.next += 1;
                self.seen
                    .insert(identity.checksum.clone(), encoded_id.clone());
                (encoded_id, Some(normalized))
            }
        };

        Ok(Encoded {
            mapping: IdentifierMapping {
                encoded_id,
                source_file: source_file.to_string(),
                original_id: identity.external_id,
                checksum: identity.checksum,
                digest: identity.digest,
            },
            new_sequence,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EncodeOptions {
    /// Records accumulated before both outputs are flushed.
    pub chunk_size: usize,
    pub line_width: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            chunk_size: DEFAULT_ENCODE_CHUNK_SIZE,
            line_width: DEFAULT_FASTA_LINE_WIDTH,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeSummary {
    pub n_records: usize,
    pub n_distinct: usize,
}

fn flush_chunk<F: Write, M: Write>(
    fasta_out: &mut F,
    map_out: &mut M,
    seq_chunk: &mut Vec<u8>,
    tab_chunk: &mut Vec<u8>,
) -> std::io::Result<()> {
    fasta_out.write_all(seq_chunk)?;
    map_out.write_all(tab_chunk)?;
    seq_chunk.clear();
    tab_chunk.clear();
    Ok(())
}

///
/// Encode every sequence of the given FASTA files.
///
/// Writes one deduplicated FASTA (named by encoded id) to `fasta_out` and one
/// mapping row per input sequence to `map_out`. The mapping table's
/// `source_file` column is the file name of each input, without directories.
///
/// # Arguments
///
/// - infiles: FASTA files to encode, in order
/// - encoder: the encoder state, possibly shared across calls
/// - fasta_out: where to write the deduplicated sequences
/// - map_out: where to write the mapping table
/// - opts: chunking and line wrapping
///
pub fn encode_fasta_files<P, F, M>(
    infiles: &[P],
    encoder: &mut Encoder,
    fasta_out: &mut F,
    map_out: &mut M,
    opts: EncodeOptions,
) -> Result<EncodeSummary>
where
    P: AsRef<Path>,
    F: Write,
    M: Write,
{
    let chunk_size = opts.chunk_size.max(1);
    let mut seq_chunk: Vec<u8> = Vec::new();
    let mut tab_chunk: Vec<u8> = Vec::new();
    let mut in_chunk = 0;
    let mut n_records = 0;

    for infile in infiles {
        let infile = infile.as_ref();
        let source_file = base_name(&infile.to_string_lossy());
        log::debug!("Encoding sequences from {}", infile.display());

        for record in FastaReader::from_path(infile)? {
            let record = record?;
            let encoded = encoder.encode(&source_file, &record.id, &record.sequence)?;

            writeln!(tab_chunk, "{}", encoded.mapping.to_line())?;
            if let Some(sequence) = &encoded.new_sequence {
                write_fasta_record(
                    &mut seq_chunk,
                    &encoded.mapping.encoded_id,
                    sequence,
                    opts.line_width,
                )?;
            }

            n_records += 1;
            in_chunk += 1;
            if in_chunk == chunk_size {
                flush_chunk(fasta_out, map_out, &mut seq_chunk, &mut tab_chunk)?;
                log::debug!("Flushed encoder chunk at record {}", n_records);
                in_chunk = 0;
            }
        }
    }

    flush_chunk(fasta_out, map_out, &mut seq_chunk, &mut tab_chunk)?;
    fasta_out.flush()?;
    map_out.flush()?;

    let summary = EncodeSummary {
        n_records,
        n_distinct: encoder.n_distinct(),
    };
    log::info!(
        "Encoded {} sequences, {} distinct",
        summary.n_records,
        summary.n_distinct
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use predcache_core::errors::CacheError;
    use rstest::*;

    #[fixture]
    fn encoder() -> Encoder {
        Encoder::new(IdConverter::new("SR", 3))
    }

    #[rstest]
    fn test_duplicates_reuse_ids(mut encoder: Encoder) {
        let a = encoder.encode("in.fa", "A", "MKVLA").unwrap();
        let b = encoder.encode("in.fa", "B", "mkvla*").unwrap();
        let c = encoder.encode("other.fa", "C", "MKVLW").unwrap();

        assert_eq!(a.mapping.encoded_id, "SR001");
        assert_eq!(a.new_sequence.as_deref(), Some("MKVLA"));
        assert_eq!(b.mapping.encoded_id, "SR001");
        assert_eq!(b.new_sequence, None);
        assert_eq!(b.mapping.checksum, a.mapping.checksum);
        assert_eq!(c.mapping.encoded_id, "SR002");
        assert_eq!(encoder.n_distinct(), 2);
        assert_eq!(encoder.lookup(&a.mapping.checksum), Some("SR001"));
    }

    #[rstest]
    fn test_exhaustion_is_an_error() {
        let mut encoder = Encoder::new(IdConverter::new("S", 1));
        // numbering starts at 1, so 35 distinct ids fit in one base-36 digit
        for i in 0..35 {
            let seq = "A".repeat(i + 1);
            encoder.encode("f", &format!("s{}", i), &seq).unwrap();
        }
        let dup = encoder.encode("f", "dup", "A").unwrap();
        assert_eq!(dup.mapping.encoded_id, "S1");

        let result = encoder.encode("f", "overflow", &"A".repeat(100));
        assert!(matches!(
            result,
            Err(CacheError::EncodingSpaceExhausted { capacity: 36, .. })
        ));
    }

    #[rstest]
    fn test_invalid_residue_aborts(mut encoder: Encoder) {
        let result = encoder.encode("f", "bad", "MKV9");
        assert!(matches!(result, Err(CacheError::InvalidResidue { .. })));
        assert_eq!(encoder.n_distinct(), 0);
    }
}
