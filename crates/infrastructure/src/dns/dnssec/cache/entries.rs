use super::super::types::DsRecord;
use super::super::validation::ZoneTrust;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ZoneEntry {
    trust: ZoneTrust,
    expires_at: Instant,
}

impl ZoneEntry {
    pub fn new(trust: ZoneTrust, ttl: Duration) -> Self {
        Self {
            trust,
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn trust(&self) -> &ZoneTrust {
        &self.trust
    }
}

#[derive(Debug, Clone)]
pub struct DsEntry {
    records: Arc<[DsRecord]>,
    expires_at: Instant,
}

impl DsEntry {
    pub fn new(records: Vec<DsRecord>, ttl: Duration) -> Self {
        Self {
            records: Arc::from(records),
            expires_at: Instant::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn records(&self) -> &Arc<[DsRecord]> {
        &self.records
    }
}
