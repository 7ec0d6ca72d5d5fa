use super::rrset::{group_rrsets, SignedRrset};
use crate::dns::dnssec::cache::DnssecCache;
use crate::dns::dnssec::crypto::{unix_now, SignatureVerifier};
use crate::dns::dnssec::trust_anchor::TrustAnchorStore;
use crate::dns::dnssec::types::{DnskeyRecord, DsRecord};
use crate::dns::forwarding::DnsResponse;
use crate::dns::upstream::DnsExchange;
use hickory_proto::rr::Record;
use spark_dns_domain::{canonical_name, DnsQuery, DomainError, RecordType};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

const ROOT: &str = ".";

const SUPPORTED_ALGORITHMS: &[u8] = &[5, 7, 8, 10, 13, 14, 15];
const SUPPORTED_DIGESTS: &[u8] = &[1, 2, 4];

/// How far the chain of trust reaches for a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneTrust {
    /// The name lies inside `zone`, whose DNSKEY set was validated from a
    /// trust anchor down.
    Secure {
        zone: Arc<str>,
        keys: Arc<[DnskeyRecord]>,
    },
    /// An unsigned delegation was crossed on the way down.
    Insecure,
    Bogus(String),
}

impl fmt::Display for ZoneTrust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneTrust::Secure { zone, .. } => write!(f, "secure({})", zone),
            ZoneTrust::Insecure => write!(f, "insecure"),
            ZoneTrust::Bogus(reason) => write!(f, "bogus({})", reason),
        }
    }
}

/// Walks from the root trust anchor down to a name, one label at a time.
///
/// At each label the DS set is fetched and checked against the parent's
/// keys. A name with DS records is a signed zone cut and its DNSKEY set
/// must match one of the digests. A name without DS records is either
/// inside the parent zone (it has no SOA of its own) or an unsigned
/// delegation. Results are cached per name.
pub struct ChainVerifier {
    exchange: Arc<dyn DnsExchange>,
    trust_store: Arc<TrustAnchorStore>,
    cache: Arc<DnssecCache>,
    verifier: SignatureVerifier,
}

impl ChainVerifier {
    pub fn new(
        exchange: Arc<dyn DnsExchange>,
        trust_store: Arc<TrustAnchorStore>,
        cache: Arc<DnssecCache>,
    ) -> Self {
        Self {
            exchange,
            trust_store,
            cache,
            verifier: SignatureVerifier,
        }
    }

    pub fn cache(&self) -> &Arc<DnssecCache> {
        &self.cache
    }

    pub async fn zone_trust(&self, name: &str) -> ZoneTrust {
        let target = normalize_name(name);
        let mut trust = self.root_trust().await;

        for child in Self::descendants(&target) {
            let ZoneTrust::Secure { zone, keys } = &trust else {
                break;
            };

            let next = match self.cache.get_zone(&child) {
                Some(cached) => cached,
                None => {
                    let (next, ttl) = self.delegation_trust(zone, keys, &child).await;
                    self.remember(&child, &next, ttl);
                    next
                }
            };
            trust = next;
        }

        debug!(name = %target, trust = %trust, "Chain of trust resolved");
        trust
    }

    /// Names from the top-level label down to `name` itself.
    pub fn descendants(name: &str) -> Vec<String> {
        let trimmed = name.trim_end_matches('.');
        if trimmed.is_empty() {
            return Vec::new();
        }

        let labels: Vec<&str> = trimmed.split('.').collect();
        (1..=labels.len())
            .map(|n| format!("{}.", labels[labels.len() - n..].join(".")))
            .collect()
    }

    fn remember(&self, name: &str, trust: &ZoneTrust, ttl: u32) {
        if ttl > 0 && !matches!(trust, ZoneTrust::Bogus(_)) {
            self.cache.cache_zone(name, trust.clone(), ttl);
        }
    }

    async fn root_trust(&self) -> ZoneTrust {
        if let Some(cached) = self.cache.get_zone(ROOT) {
            return cached;
        }

        if self.trust_store.anchors_for(ROOT).next().is_none() {
            warn!("No root trust anchor configured");
            return ZoneTrust::Bogus("no trust anchor for the root zone".to_string());
        }

        let store = Arc::clone(&self.trust_store);
        let (trust, ttl) = self
            .fetch_key_set(ROOT, move |key| store.is_trusted(key, ROOT))
            .await;
        self.remember(ROOT, &trust, ttl);
        trust
    }

    async fn delegation_trust(
        &self,
        parent_zone: &Arc<str>,
        parent_keys: &Arc<[DnskeyRecord]>,
        child: &str,
    ) -> (ZoneTrust, u32) {
        let ds_records = match self.cache.get_ds(child) {
            Some(records) => records,
            None => {
                let response = match self.fetch(child, RecordType::DS).await {
                    Ok(response) => response,
                    Err(e) => {
                        return (
                            ZoneTrust::Bogus(format!("failed to fetch DS for {}: {}", child, e)),
                            0,
                        )
                    }
                };

                let Some(ds_set) = find_rrset(&response, child, RecordType::DS) else {
                    return self
                        .unsigned_child(parent_zone, parent_keys, child, response.is_nxdomain())
                        .await;
                };

                if !self.verifier.verify_rrset(&ds_set, parent_keys, unix_now()) {
                    return (
                        ZoneTrust::Bogus(format!(
                            "DS RRset for {} failed signature check with keys of {}",
                            child, parent_zone
                        )),
                        0,
                    );
                }

                let records: Vec<DsRecord> = ds_set
                    .records
                    .iter()
                    .filter_map(DsRecord::from_record)
                    .collect();
                self.cache
                    .cache_ds(child, records.clone(), min_ttl(&ds_set.records));
                Arc::from(records)
            }
        };

        let usable: Vec<DsRecord> = ds_records
            .iter()
            .filter(|ds| {
                SUPPORTED_ALGORITHMS.contains(&ds.algorithm)
                    && SUPPORTED_DIGESTS.contains(&ds.digest_type)
            })
            .cloned()
            .collect();
        if usable.is_empty() {
            debug!(zone = %child, "No DS record with a supported algorithm, treating as insecure");
            return (ZoneTrust::Insecure, 0);
        }

        let verifier = SignatureVerifier;
        let owner = child.to_string();
        self.fetch_key_set(child, move |key| {
            usable
                .iter()
                .any(|ds| verifier.verify_ds(ds, key, &owner).unwrap_or(false))
        })
        .await
    }

    /// No DS at `child`: decide between "inside the parent zone" and
    /// "unsigned delegation" by asking for the SOA at `child`.
    async fn unsigned_child(
        &self,
        parent_zone: &Arc<str>,
        parent_keys: &Arc<[DnskeyRecord]>,
        child: &str,
        nxdomain: bool,
    ) -> (ZoneTrust, u32) {
        let inherited = ZoneTrust::Secure {
            zone: Arc::clone(parent_zone),
            keys: Arc::clone(parent_keys),
        };
        if nxdomain {
            return (inherited, 0);
        }

        match self.fetch(child, RecordType::SOA).await {
            Ok(response) => match find_rrset(&response, child, RecordType::SOA) {
                Some(soa) => {
                    debug!(zone = %child, parent = %parent_zone, "Unsigned delegation");
                    (ZoneTrust::Insecure, min_ttl(&soa.records))
                }
                None => (inherited, response.min_ttl.unwrap_or(0)),
            },
            Err(e) => (
                ZoneTrust::Bogus(format!("failed to fetch SOA for {}: {}", child, e)),
                0,
            ),
        }
    }

    /// Fetches the DNSKEY set of `zone` and accepts it when an RRSIG made by
    /// one of its entry-point keys verifies.
    async fn fetch_key_set<F>(&self, zone: &str, is_entry_point: F) -> (ZoneTrust, u32)
    where
        F: Fn(&DnskeyRecord) -> bool + Send + Sync,
    {
        let response = match self.fetch(zone, RecordType::DNSKEY).await {
            Ok(response) => response,
            Err(e) => {
                return (
                    ZoneTrust::Bogus(format!("failed to fetch DNSKEY for {}: {}", zone, e)),
                    0,
                )
            }
        };

        let Some(rrset) = find_rrset(&response, zone, RecordType::DNSKEY) else {
            return (
                ZoneTrust::Bogus(format!("no DNSKEY records for {}", zone)),
                0,
            );
        };

        let keys: Vec<DnskeyRecord> = rrset
            .records
            .iter()
            .filter_map(DnskeyRecord::from_record)
            .collect();
        let entry_points: Vec<DnskeyRecord> =
            keys.iter().filter(|key| is_entry_point(key)).cloned().collect();

        if entry_points.is_empty() {
            return (
                ZoneTrust::Bogus(format!("no DNSKEY for {} matches its trust point", zone)),
                0,
            );
        }

        if !self.verifier.verify_rrset(&rrset, &entry_points, unix_now()) {
            return (
                ZoneTrust::Bogus(format!("DNSKEY RRset for {} failed signature check", zone)),
                0,
            );
        }

        debug!(zone = %zone, keys = keys.len(), "DNSKEY RRset validated");
        (
            ZoneTrust::Secure {
                zone: Arc::from(zone),
                keys: Arc::from(keys),
            },
            min_ttl(&rrset.records),
        )
    }

    async fn fetch(&self, name: &str, record_type: RecordType) -> Result<DnsResponse, DomainError> {
        let query = DnsQuery::new(name, record_type);
        self.exchange.exchange(&query, true).await
    }
}

/// Lower-case and dot-terminated; the empty name is the root.
pub fn normalize_name(name: &str) -> String {
    if name.is_empty() {
        return ROOT.to_string();
    }
    canonical_name(&name.to_ascii_lowercase())
}

fn find_rrset(response: &DnsResponse, owner: &str, record_type: RecordType) -> Option<SignedRrset> {
    group_rrsets(&response.answers)
        .into_iter()
        .find(|set| set.owner == owner && set.record_type == record_type)
}

fn min_ttl(records: &[Record]) -> u32 {
    records.iter().map(Record::ttl).min().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendants() {
        assert_eq!(
            ChainVerifier::descendants("www.example.com."),
            vec!["com.", "example.com.", "www.example.com."]
        );
        assert!(ChainVerifier::descendants(".").is_empty());
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("WWW.Example.com"), "www.example.com.");
        assert_eq!(normalize_name(""), ".");
        assert_eq!(normalize_name("."), ".");
    }
}
