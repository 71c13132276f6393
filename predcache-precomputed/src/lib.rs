//! # Cache-aware work splitting
//!
//! Given the analyses a run wants and the sequences it has, decide which
//! results can be reused from an existing store and which sequences still
//! need to go through each tool.
pub mod sequences;
pub mod split;

pub use sequences::{EncodedSequence, read_encoded_sequences};
pub use split::{KeyState, SplitOptions, SplitOutcome, TargetSplit, split, write_remaining_fasta};
