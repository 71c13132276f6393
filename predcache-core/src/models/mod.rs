pub mod analysis;
pub mod cache_key;
pub mod record;

// re-export for cleaner imports
pub use self::analysis::Analysis;
pub use self::cache_key::{CacheKey, read_targets};
pub use self::record::{RecordHeader, ResultRecord, ResultStore, set_record_name};
