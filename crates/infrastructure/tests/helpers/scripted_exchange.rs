#![allow(dead_code)]
use async_trait::async_trait;
use spark_dns_domain::{canonical_name, DnsQuery, DomainError, RecordType};
use spark_dns_infrastructure::dns::{DnsExchange, DnsResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Answers from a fixed table keyed by lower-cased name and type.
/// Unknown questions get an empty NOERROR response.
#[derive(Default)]
pub struct ScriptedExchange {
    responses: HashMap<(String, RecordType), DnsResponse>,
    failures: HashMap<(String, RecordType), DomainError>,
    calls: AtomicUsize,
    seen_cd: Mutex<Vec<bool>>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&mut self, name: &str, record_type: RecordType, response: DnsResponse) {
        self.responses.insert(key(name, record_type), response);
    }

    pub fn fail(&mut self, name: &str, record_type: RecordType, error: DomainError) {
        self.failures.insert(key(name, record_type), error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The CD flag of every exchange so far, in order.
    pub fn checking_disabled_flags(&self) -> Vec<bool> {
        self.seen_cd.lock().unwrap().clone()
    }
}

fn key(name: &str, record_type: RecordType) -> (String, RecordType) {
    (canonical_name(&name.to_ascii_lowercase()), record_type)
}

#[async_trait]
impl DnsExchange for ScriptedExchange {
    async fn exchange(
        &self,
        query: &DnsQuery,
        checking_disabled: bool,
    ) -> Result<DnsResponse, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_cd.lock().unwrap().push(checking_disabled);

        let key = key(&query.name, query.record_type);
        if let Some(error) = self.failures.get(&key) {
            return Err(error.clone());
        }
        Ok(self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| DnsResponse::from_sections(0, Vec::new(), Vec::new())))
    }
}
