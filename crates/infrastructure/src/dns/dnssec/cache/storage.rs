use super::super::types::DsRecord;
use super::super::validation::ZoneTrust;
use super::entries::{DsEntry, ZoneEntry};
use super::stats::{CacheStats, CacheStatsSnapshot};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

const DEFAULT_MAX_TTL_SECS: u64 = 3600;

/// Validated zone trust and DS sets shared by all workers.
///
/// Keys are lower-case, dot-terminated names. Entries live for the TTL of
/// the records they came from, capped at `max_ttl`.
pub struct DnssecCache {
    zones: DashMap<Arc<str>, ZoneEntry>,
    ds_records: DashMap<Arc<str>, DsEntry>,
    max_ttl: Duration,
    stats: CacheStats,
}

impl DnssecCache {
    pub fn new() -> Self {
        Self::with_max_ttl(Duration::from_secs(DEFAULT_MAX_TTL_SECS))
    }

    pub fn with_max_ttl(max_ttl: Duration) -> Self {
        Self {
            zones: DashMap::new(),
            ds_records: DashMap::new(),
            max_ttl,
            stats: CacheStats::default(),
        }
    }

    fn ttl(&self, ttl_secs: u32) -> Duration {
        Duration::from_secs(u64::from(ttl_secs)).min(self.max_ttl)
    }

    pub fn cache_zone(&self, name: &str, trust: ZoneTrust, ttl_secs: u32) {
        let ttl = self.ttl(ttl_secs);
        trace!(name = %name, trust = %trust, ttl_secs = ttl.as_secs(), "Cached zone trust");
        self.zones.insert(Arc::from(name), ZoneEntry::new(trust, ttl));
    }

    pub fn get_zone(&self, name: &str) -> Option<ZoneTrust> {
        if let Some(entry) = self.zones.get(name) {
            if !entry.is_expired() {
                self.stats.record_zone_hit();
                return Some(entry.trust().clone());
            }
            drop(entry);
            self.zones.remove(name);
            debug!(name = %name, "Zone trust expired");
        }
        self.stats.record_zone_miss();
        None
    }

    pub fn cache_ds(&self, name: &str, records: Vec<DsRecord>, ttl_secs: u32) {
        let ttl = self.ttl(ttl_secs);
        trace!(name = %name, count = records.len(), ttl_secs = ttl.as_secs(), "Cached DS records");
        self.ds_records.insert(Arc::from(name), DsEntry::new(records, ttl));
    }

    pub fn get_ds(&self, name: &str) -> Option<Arc<[DsRecord]>> {
        if let Some(entry) = self.ds_records.get(name) {
            if !entry.is_expired() {
                self.stats.record_ds_hit();
                return Some(Arc::clone(entry.records()));
            }
            drop(entry);
            self.ds_records.remove(name);
            debug!(name = %name, "DS records expired");
        }
        self.stats.record_ds_miss();
        None
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot(self.zones.len(), self.ds_records.len())
    }

    pub fn clear(&self) {
        self.zones.clear();
        self.ds_records.clear();
        debug!("DNSSEC cache cleared");
    }
}

impl Default for DnssecCache {
    fn default() -> Self {
        Self::new()
    }
}
