use super::cache::{CacheStatsSnapshot, DnssecCache};
use super::crypto::{unix_now, SignatureVerifier};
use super::trust_anchor::TrustAnchorStore;
use super::validation::{group_rrsets, ChainVerifier, SignedRrset, ZoneTrust};
use crate::dns::forwarding::DnsResponse;
use crate::dns::upstream::DnsExchange;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationStatus {
    Secure,
    Insecure,
    Bogus(String),
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secure => "Secure",
            Self::Insecure => "Insecure",
            Self::Bogus(_) => "Bogus",
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Secure)
    }

    pub fn is_bogus(&self) -> bool {
        matches!(self, Self::Bogus(_))
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bogus(reason) => write!(f, "Bogus: {}", reason),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Validates responses fetched with the CD bit set.
///
/// The answer section is checked when it has records, otherwise the
/// authority section (the denial of existence). Every RRset must verify
/// under the keys of the zone its signer names; one insecure RRset makes
/// the whole response insecure, one bogus RRset makes it bogus.
pub struct DnssecValidator {
    chain: ChainVerifier,
    verifier: SignatureVerifier,
}

impl DnssecValidator {
    pub fn new(exchange: Arc<dyn DnsExchange>, trust_store: TrustAnchorStore) -> Self {
        Self::with_cache(exchange, trust_store, Arc::new(DnssecCache::new()))
    }

    pub fn with_cache(
        exchange: Arc<dyn DnsExchange>,
        trust_store: TrustAnchorStore,
        cache: Arc<DnssecCache>,
    ) -> Self {
        Self {
            chain: ChainVerifier::new(exchange, Arc::new(trust_store), cache),
            verifier: SignatureVerifier,
        }
    }

    pub fn cache_stats(&self) -> CacheStatsSnapshot {
        self.chain.cache().stats()
    }

    pub async fn validate(&self, qname: &str, response: &DnsResponse) -> ValidationStatus {
        let start = Instant::now();

        let section = if response.answers.is_empty() {
            &response.authority
        } else {
            &response.answers
        };
        let rrsets = group_rrsets(section);

        let status = if rrsets.is_empty() {
            self.validate_empty(qname).await
        } else {
            self.verify_rrsets(&rrsets).await
        };

        debug!(
            qname = %qname,
            status = %status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "DNSSEC validation completed"
        );
        status
    }

    /// A response with nothing to check is only acceptable below an
    /// unsigned delegation.
    async fn validate_empty(&self, qname: &str) -> ValidationStatus {
        match self.chain.zone_trust(qname).await {
            ZoneTrust::Secure { zone, .. } => ValidationStatus::Bogus(format!(
                "no signed records for {} in signed zone {}",
                qname, zone
            )),
            ZoneTrust::Insecure => ValidationStatus::Insecure,
            ZoneTrust::Bogus(reason) => ValidationStatus::Bogus(reason),
        }
    }

    pub async fn verify_rrsets(&self, rrsets: &[SignedRrset]) -> ValidationStatus {
        let mut insecure = false;

        for rrset in rrsets {
            let anchor_name = rrset.signer().unwrap_or(rrset.owner.as_str());

            match self.chain.zone_trust(anchor_name).await {
                ZoneTrust::Bogus(reason) => return ValidationStatus::Bogus(reason),
                ZoneTrust::Insecure => insecure = true,
                ZoneTrust::Secure { zone, keys } => {
                    if rrset.rrsigs.is_empty() {
                        warn!(owner = %rrset.owner, record_type = %rrset.record_type, zone = %zone, "Unsigned RRset in signed zone");
                        return ValidationStatus::Bogus(format!(
                            "missing signatures for {} {}",
                            rrset.owner, rrset.record_type
                        ));
                    }
                    if !self.verifier.verify_rrset(rrset, &keys, unix_now()) {
                        warn!(owner = %rrset.owner, record_type = %rrset.record_type, zone = %zone, "RRset RRSIG verification failed");
                        return ValidationStatus::Bogus(format!(
                            "signature check failed for {} {} with keys of {}",
                            rrset.owner, rrset.record_type, zone
                        ));
                    }
                }
            }
        }

        if insecure {
            ValidationStatus::Insecure
        } else {
            ValidationStatus::Secure
        }
    }
}
