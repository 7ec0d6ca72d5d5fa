use crate::dns::dnssec::{DnssecValidator, ValidationStatus};
use crate::dns::forwarding::ResponseParser;
use crate::dns::upstream::DnsExchange;
use async_trait::async_trait;
use spark_dns_application::ports::ResolutionEngine;
use spark_dns_domain::{DnsQuery, DomainError, ResolutionOutcome, ResourceRecord};
use std::sync::Arc;
use tracing::debug;

/// Forwards each question and, when a validator is attached, checks the
/// answer's DNSSEC chain locally.
///
/// With validation on, queries go out with CD set so the forwarder returns
/// bogus data instead of SERVFAIL; the verdict is ours.
pub struct ValidatingResolver {
    upstream: Arc<dyn DnsExchange>,
    validator: Option<DnssecValidator>,
}

impl ValidatingResolver {
    pub fn new(upstream: Arc<dyn DnsExchange>) -> Self {
        Self {
            upstream,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: DnssecValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn validates(&self) -> bool {
        self.validator.is_some()
    }
}

#[async_trait]
impl ResolutionEngine for ValidatingResolver {
    async fn resolve(&self, query: &DnsQuery) -> Result<ResolutionOutcome, DomainError> {
        let response = self
            .upstream
            .exchange(query, self.validator.is_some())
            .await?;

        let qname = query.fqdn();
        let records: Vec<ResourceRecord> = response
            .answers_of_type(query.record_type)
            .map(|record| ResponseParser::to_resource_record(record, query.class))
            .collect();
        let outcome = ResolutionOutcome::new(qname.clone(), response.rcode).with_records(records);

        debug!(
            qname = %qname,
            record_type = %query.record_type,
            rcode = outcome.rcode,
            have_data = outcome.have_data,
            upstream_ad = response.authentic_data,
            "Upstream answered"
        );

        let Some(validator) = &self.validator else {
            return Ok(outcome);
        };
        if !outcome.have_data && !outcome.nx_domain {
            return Ok(outcome);
        }

        Ok(match validator.validate(&qname, &response).await {
            ValidationStatus::Secure => outcome.secure(),
            ValidationStatus::Insecure => outcome,
            ValidationStatus::Bogus(reason) => outcome.bogus(reason),
        })
    }
}
