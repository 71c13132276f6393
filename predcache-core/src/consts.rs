/// Environment variable holding the path to a TOML configuration file.
pub const PREDCACHE_CONFIG_ENV: &str = "PREDCACHE_CONFIG";

pub const DEFAULT_ID_PREFIX: &str = "SR";
pub const DEFAULT_ID_LENGTH: usize = 5;

/// Number of records accumulated before the encoder flushes its outputs.
pub const DEFAULT_ENCODE_CHUNK_SIZE: usize = 10_000;
/// Number of cached lines buffered by the work splitter before writing.
pub const DEFAULT_PRECOMPUTED_CHUNK_SIZE: usize = 5_000;
/// Number of fanned-out lines buffered by the decoder before flushing.
pub const DEFAULT_DECODE_CHUNK_SIZE: usize = 10_000;

pub const DEFAULT_PRECOMPUTED_TEMPLATE: &str = "{analysis}.fasta";
pub const DEFAULT_DECODE_TEMPLATE: &str = "{filename}.ldjson";
pub const DEFAULT_TABLES_TEMPLATE: &str = "{analysis}.tsv";

pub const DEFAULT_FASTA_LINE_WIDTH: usize = 60;

/// Placeholder written to analysis tables for absent values.
pub const NA_VALUE: &str = ".";
