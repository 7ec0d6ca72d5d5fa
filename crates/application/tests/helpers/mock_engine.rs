use async_trait::async_trait;
use spark_dns_application::ports::ResolutionEngine;
use spark_dns_domain::{
    DnsClass, DnsQuery, DomainError, RecordType, ResolutionOutcome, ResourceRecord,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub fn rr(owner: &str, record_type: RecordType, rdata: &str) -> ResourceRecord {
    ResourceRecord::new(owner, 300, DnsClass::IN, record_type, rdata)
}

/// Scriptable engine: per-name outcomes or errors, an optional fallback
/// outcome, an optional artificial delay, and a log of every call.
pub struct MockResolutionEngine {
    responses: Arc<RwLock<HashMap<String, ResolutionOutcome>>>,
    error_responses: Arc<RwLock<HashMap<String, DomainError>>>,
    fallback: Arc<RwLock<Option<ResolutionOutcome>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<std::sync::Mutex<Vec<DnsQuery>>>,
}

impl MockResolutionEngine {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            error_responses: Arc::new(RwLock::new(HashMap::new())),
            fallback: Arc::new(RwLock::new(None)),
            delay: Arc::new(RwLock::new(None)),
            calls: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub async fn set_response(&self, domain: &str, outcome: ResolutionOutcome) {
        self.responses
            .write()
            .await
            .insert(domain.to_string(), outcome);
    }

    pub async fn set_response_error(&self, domain: &str, error: DomainError) {
        self.error_responses
            .write()
            .await
            .insert(domain.to_string(), error);
    }

    /// Answer every unscripted name with `outcome`, its qname rewritten to
    /// the dot-terminated queried name.
    pub async fn set_fallback(&self, outcome: ResolutionOutcome) {
        *self.fallback.write().await = Some(outcome);
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub fn calls(&self) -> Vec<DnsQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn queried_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|q| q.name.to_string())
            .collect()
    }
}

impl Default for MockResolutionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResolutionEngine for MockResolutionEngine {
    async fn resolve(&self, query: &DnsQuery) -> Result<ResolutionOutcome, DomainError> {
        self.calls.lock().unwrap().push(query.clone());

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.error_responses.read().await.get(query.name.as_ref()) {
            return Err(err.clone());
        }

        if let Some(outcome) = self.responses.read().await.get(query.name.as_ref()) {
            return Ok(outcome.clone());
        }

        match self.fallback.read().await.as_ref() {
            Some(outcome) => Ok(ResolutionOutcome {
                qname: query.fqdn(),
                ..outcome.clone()
            }),
            None => Err(DomainError::InvalidDomainName(format!(
                "No mock response for {}",
                query.name
            ))),
        }
    }
}
