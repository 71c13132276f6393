//! # Core library for predcache
//!
//! Shared building blocks for the content-addressed result cache: the closed
//! set of analysis kinds, cache keys, the result record envelope, FASTA I/O,
//! configuration and the common error type.
//!
pub mod config;
pub mod consts;
pub mod errors;
pub mod fasta;
pub mod models;
pub mod utils;

// re-export for cleaner imports
pub use errors::{CacheError, Result};
pub use models::{Analysis, CacheKey, ResultRecord};
