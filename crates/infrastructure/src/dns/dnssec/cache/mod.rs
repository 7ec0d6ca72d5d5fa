mod entries;
mod stats;
mod storage;

pub use stats::CacheStatsSnapshot;
pub use storage::DnssecCache;
