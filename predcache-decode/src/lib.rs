//! # Result fan-out
//!
//! Results are stored once per checksum. Decoding re-emits each of them once
//! per original sequence name sharing that checksum, partitioned into one
//! output file per source file.
pub mod decoder;
pub mod writer;

pub use decoder::{DecodeOptions, DecodeSummary, Decoder};
pub use writer::FanOutWriter;
