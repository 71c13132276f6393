//! # predcache
//!
//! A content-addressed cache of protein prediction results. Each tool crate
//! is re-exported behind a feature of the same name.
//!
//! - `core` - analyses, cache keys, records, FASTA I/O and configuration
//! - `encode` - sequence checksums, short ids and the mapping table
//! - `index` - the byte range index over a result store
//! - `precomputed` - splitting work into cache hits and misses
//! - `decode` - fanning results back out to original names

#[cfg(feature = "core")]
#[doc(inline)]
pub use predcache_core as core;

#[cfg(feature = "encode")]
#[doc(inline)]
pub use predcache_encode as encode;

#[cfg(feature = "index")]
#[doc(inline)]
pub use predcache_index as index;

#[cfg(feature = "precomputed")]
#[doc(inline)]
pub use predcache_precomputed as precomputed;

#[cfg(feature = "decode")]
#[doc(inline)]
pub use predcache_decode as decode;
