//! # Sequence identity and identifier encoding
//!
//! This crate derives the content checksum that keys the result cache, assigns
//! compact short identifiers to deduplicated sequences and reads/writes the
//! identifier mapping table that lets results be fanned back out to every
//! original sequence name.
//!
//! - `identity` - residue normalization plus the SEGUID checksum and MD5 digest
//! - `baseconv` - fixed width base-36 short identifiers
//! - `encoder` - the streaming, deduplicating encoder
//! - `table` - the identifier mapping table
//! - `wrap` - wraps bare per-tool records into checksum-keyed result records
//!
pub mod baseconv;
pub mod encoder;
pub mod identity;
pub mod table;
pub mod wrap;

pub use baseconv::IdConverter;
pub use encoder::{EncodeOptions, EncodeSummary, Encoded, Encoder, encode_fasta_files};
pub use identity::{
    SequenceIdentity, checksum, identify, identify_normalized, md5sum, normalize_sequence,
};
pub use table::{IdentifierMapping, read_mapping_table, write_mapping_rows};
pub use wrap::{WrapOptions, identities_from_fasta, wrap_records};
