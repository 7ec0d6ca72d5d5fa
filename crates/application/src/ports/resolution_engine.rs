use async_trait::async_trait;
use spark_dns_domain::{DnsQuery, DomainError, ResolutionOutcome};

/// A resolver that answers one question at a time and may be called from
/// many workers concurrently.
///
/// An `Err` means the call itself failed (transport, configuration, a
/// malformed answer). Negative answers, SERVFAIL and failed validation are
/// all reported through the returned [`ResolutionOutcome`].
#[async_trait]
pub trait ResolutionEngine: Send + Sync {
    async fn resolve(&self, query: &DnsQuery) -> Result<ResolutionOutcome, DomainError>;
}
