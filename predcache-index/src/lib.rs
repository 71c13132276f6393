//! # Result store index
//!
//! One forward scan over a line-delimited result store produces a
//! [`CacheIndex`]: for every cache key and checksum, the byte range of the
//! record that currently holds its result. Records are then fetched by
//! seeking straight to that range.
//!
//! ```rust,no_run
//! use std::fs::File;
//! use std::path::Path;
//! use predcache_index::{CacheIndex, ChecksumSelector, KeySelector};
//!
//! let index = CacheIndex::from_path(Path::new("results.ldjson")).unwrap();
//! let mut store = File::open("results.ldjson").unwrap();
//! for item in index.fetch(&mut store, KeySelector::All, ChecksumSelector::All) {
//!     let (key, line) = item.unwrap();
//!     println!("{}\t{}", key, line.len());
//! }
//! ```
pub mod index;
pub mod tables;

pub use index::{ByteRange, CacheIndex, ChecksumSelector, Fetch, KeySelector};
pub use tables::write_analysis_tables;
