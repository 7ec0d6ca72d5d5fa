use spark_dns_domain::{DomainError, RecordType};
use spark_dns_infrastructure::dns::dnssec::{
    ChainVerifier, DnssecCache, DnssecValidator, TrustAnchorStore, ValidationStatus, ZoneTrust,
};
use spark_dns_infrastructure::dns::DnsExchange;
use std::net::Ipv4Addr;
use std::sync::Arc;

mod helpers;
use helpers::signed_zone::{a_record, answer, nxdomain, soa_record, SignedZone};
use helpers::ZoneFixture;

fn validator_for(fixture: ZoneFixture) -> (DnssecValidator, Arc<DnssecCache>) {
    let trust_store = fixture.trust_store();
    let exchange: Arc<dyn DnsExchange> = Arc::new(fixture.exchange);
    let cache = Arc::new(DnssecCache::new());
    (
        DnssecValidator::with_cache(exchange, trust_store, Arc::clone(&cache)),
        cache,
    )
}

#[tokio::test]
async fn test_signed_answer_is_secure() {
    let fixture = ZoneFixture::new();
    let records = fixture
        .example
        .signed(vec![a_record("www.example.com.", Ipv4Addr::new(192, 0, 2, 1))]);
    let (validator, _) = validator_for(fixture);

    let status = validator
        .validate("www.example.com.", &answer(records))
        .await;
    assert_eq!(status, ValidationStatus::Secure);
}

#[tokio::test]
async fn test_answer_signed_by_unknown_key_is_bogus() {
    let fixture = ZoneFixture::new();
    let impostor = SignedZone::generate("example.com.");
    let records =
        impostor.signed(vec![a_record("www.example.com.", Ipv4Addr::new(192, 0, 2, 66))]);
    let (validator, _) = validator_for(fixture);

    let status = validator
        .validate("www.example.com.", &answer(records))
        .await;
    match status {
        ValidationStatus::Bogus(reason) => {
            assert!(reason.contains("signature check failed"), "{}", reason)
        }
        other => panic!("expected bogus, got {}", other),
    }
}

#[tokio::test]
async fn test_unsigned_answer_in_signed_zone_is_bogus() {
    let fixture = ZoneFixture::new();
    let records = vec![a_record("www.example.com.", Ipv4Addr::new(192, 0, 2, 1))];
    let (validator, _) = validator_for(fixture);

    let status = validator
        .validate("www.example.com.", &answer(records))
        .await;
    match status {
        ValidationStatus::Bogus(reason) => {
            assert!(reason.contains("missing signatures"), "{}", reason)
        }
        other => panic!("expected bogus, got {}", other),
    }
}

#[tokio::test]
async fn test_unsigned_delegation_is_insecure() {
    let fixture = ZoneFixture::new();
    let records = vec![a_record("unsigned.com.", Ipv4Addr::new(192, 0, 2, 9))];
    let (validator, _) = validator_for(fixture);

    let status = validator.validate("unsigned.com.", &answer(records)).await;
    assert_eq!(status, ValidationStatus::Insecure);
}

#[tokio::test]
async fn test_signed_nxdomain_authority_is_secure() {
    let fixture = ZoneFixture::new();
    let authority = fixture.example.signed(vec![soa_record("example.com.")]);
    let (validator, _) = validator_for(fixture);

    let status = validator
        .validate("missing.example.com.", &nxdomain(authority))
        .await;
    assert_eq!(status, ValidationStatus::Secure);
}

#[tokio::test]
async fn test_empty_response_in_signed_zone_is_bogus() {
    let fixture = ZoneFixture::new();
    let (validator, _) = validator_for(fixture);

    let status = validator
        .validate("example.com.", &nxdomain(Vec::new()))
        .await;
    assert!(status.is_bogus());
}

#[tokio::test]
async fn test_missing_root_anchor_is_bogus() {
    let fixture = ZoneFixture::new();
    let records = fixture
        .example
        .signed(vec![a_record("example.com.", Ipv4Addr::new(192, 0, 2, 1))]);
    let validator = DnssecValidator::new(Arc::new(fixture.exchange), TrustAnchorStore::empty());

    let status = validator.validate("example.com.", &answer(records)).await;
    assert_eq!(
        status,
        ValidationStatus::Bogus("no trust anchor for the root zone".to_string())
    );
}

#[tokio::test]
async fn test_broken_ds_link_is_bogus() {
    let mut fixture = ZoneFixture::new();
    // com. publishes a DS for a key example.com. does not use.
    let stray = SignedZone::generate("example.com.");
    fixture.exchange.respond(
        "example.com.",
        RecordType::DS,
        answer(fixture.com.signed(vec![stray.ds_record()])),
    );
    let trust_store = fixture.trust_store();
    let chain = ChainVerifier::new(
        Arc::new(fixture.exchange),
        Arc::new(trust_store),
        Arc::new(DnssecCache::new()),
    );

    match chain.zone_trust("example.com.").await {
        ZoneTrust::Bogus(reason) => assert!(reason.contains("trust point"), "{}", reason),
        other => panic!("expected bogus, got {}", other),
    }
}

#[tokio::test]
async fn test_ds_fetch_failure_is_bogus() {
    let mut fixture = ZoneFixture::new();
    fixture.exchange.fail(
        "example.com.",
        RecordType::DS,
        DomainError::TransportTimeout {
            server: "udp://192.0.2.53:53".to_string(),
        },
    );
    let trust_store = fixture.trust_store();
    let chain = ChainVerifier::new(
        Arc::new(fixture.exchange),
        Arc::new(trust_store),
        Arc::new(DnssecCache::new()),
    );

    assert!(matches!(
        chain.zone_trust("example.com.").await,
        ZoneTrust::Bogus(_)
    ));
}

#[tokio::test]
async fn test_zone_trust_of_name_inside_zone_inherits_keys() {
    let fixture = ZoneFixture::new();
    let expected_key = fixture.example.dnskey.clone();
    let trust_store = fixture.trust_store();
    let chain = ChainVerifier::new(
        Arc::new(fixture.exchange),
        Arc::new(trust_store),
        Arc::new(DnssecCache::new()),
    );

    match chain.zone_trust("www.example.com.").await {
        ZoneTrust::Secure { zone, keys } => {
            assert_eq!(&*zone, "example.com.");
            assert_eq!(keys.to_vec(), vec![expected_key]);
        }
        other => panic!("expected secure, got {}", other),
    }
}

#[tokio::test]
async fn test_validated_keys_are_cached() {
    let fixture = ZoneFixture::new();
    let first = fixture
        .example
        .signed(vec![a_record("a.example.com.", Ipv4Addr::new(192, 0, 2, 1))]);
    let second = fixture
        .example
        .signed(vec![a_record("b.example.com.", Ipv4Addr::new(192, 0, 2, 2))]);
    let (validator, cache) = validator_for(fixture);

    assert!(validator
        .validate("a.example.com.", &answer(first))
        .await
        .is_secure());
    let misses = cache.stats().zone_misses;

    assert!(validator
        .validate("b.example.com.", &answer(second))
        .await
        .is_secure());
    let stats = cache.stats();
    assert_eq!(stats.zone_misses, misses);
    assert!(stats.zone_hits > 0);
}
