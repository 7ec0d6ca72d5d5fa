use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CacheStats {
    zone_hits: AtomicU64,
    zone_misses: AtomicU64,
    ds_hits: AtomicU64,
    ds_misses: AtomicU64,
}

impl CacheStats {
    pub fn record_zone_hit(&self) {
        self.zone_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_zone_miss(&self) {
        self.zone_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ds_hit(&self) {
        self.ds_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ds_miss(&self) {
        self.ds_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, zone_entries: usize, ds_entries: usize) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            zone_entries,
            ds_entries,
            zone_hits: self.zone_hits.load(Ordering::Relaxed),
            zone_misses: self.zone_misses.load(Ordering::Relaxed),
            ds_hits: self.ds_hits.load(Ordering::Relaxed),
            ds_misses: self.ds_misses.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
    pub zone_entries: usize,
    pub ds_entries: usize,
    pub zone_hits: u64,
    pub zone_misses: u64,
    pub ds_hits: u64,
    pub ds_misses: u64,
}

impl CacheStatsSnapshot {
    pub fn zone_hit_rate(&self) -> f64 {
        let total = self.zone_hits + self.zone_misses;
        if total == 0 {
            0.0
        } else {
            self.zone_hits as f64 / total as f64
        }
    }
}
