#![allow(dead_code)]
use super::scripted_exchange::ScriptedExchange;
use hickory_proto::dnssec::crypto::Ed25519SigningKey;
use hickory_proto::dnssec::rdata::{DNSSECRData, DNSKEY as HickoryDNSKEY, RRSIG};
use hickory_proto::dnssec::{Algorithm, PublicKey, PublicKeyBuf, SigSigner, SigningKey};
use hickory_proto::rr::rdata::{A, SOA};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordSet};
use sha2::{Digest, Sha256};
use spark_dns_domain::RecordType;
use spark_dns_infrastructure::dns::dnssec::{AnchorKey, DnskeyRecord, TrustAnchor, TrustAnchorStore};
use spark_dns_infrastructure::dns::{DnsResponse, MessageBuilder, ResponseParser};
use std::net::Ipv4Addr;
use std::str::FromStr;
use time::{Duration as TD, OffsetDateTime};

const TTL: u32 = 300;

/// A zone with a single Ed25519 key that signs everything, key set
/// included.
pub struct SignedZone {
    pub name: Name,
    pub dnskey: DnskeyRecord,
    signer: SigSigner,
}

impl SignedZone {
    pub fn generate(zone: &str) -> Self {
        let pkcs8 = Ed25519SigningKey::generate_pkcs8().unwrap();
        let signing_key = Ed25519SigningKey::from_pkcs8(&pkcs8).unwrap();
        let pub_bytes = signing_key.to_public_key().unwrap().public_bytes().to_vec();

        let name = Name::from_str(zone).unwrap();
        let signer = SigSigner::dnssec(
            hickory_dnskey(&pub_bytes),
            Box::new(signing_key),
            name.clone(),
            std::time::Duration::from_secs(7200),
        );

        Self {
            name,
            dnskey: DnskeyRecord::new(257, 15, pub_bytes),
            signer,
        }
    }

    pub fn dnskey_record(&self) -> Record {
        Record::from_rdata(
            self.name.clone(),
            TTL,
            RData::DNSSEC(DNSSECRData::DNSKEY(hickory_dnskey(&self.dnskey.public_key))),
        )
    }

    /// RRSIG over `records`, which must share owner and type.
    pub fn sign(&self, records: &[Record]) -> Record {
        let owner = records[0].name().clone();
        let mut rrset = RecordSet::new(owner.clone(), records[0].record_type(), 0);
        for record in records {
            rrset.insert(record.clone(), 0);
        }

        let inception = OffsetDateTime::now_utc() - TD::minutes(5);
        let rrsig = RRSIG::from_rrset(&rrset, DNSClass::IN, inception, &self.signer).unwrap();
        Record::from_rdata(owner, TTL, RData::DNSSEC(DNSSECRData::RRSIG(rrsig)))
    }

    pub fn signed(&self, mut records: Vec<Record>) -> Vec<Record> {
        let rrsig = self.sign(&records);
        records.push(rrsig);
        records
    }

    pub fn key_set_response(&self) -> DnsResponse {
        answer(self.signed(vec![self.dnskey_record()]))
    }

    /// SHA-256 DS record for this zone's key, as the parent would publish it.
    pub fn ds_record(&self) -> Record {
        let owner = self.name.to_ascii().to_ascii_lowercase();
        let owner_wire = MessageBuilder::encode_name(&owner).unwrap();

        let mut hasher = Sha256::new();
        hasher.update(&owner_wire);
        hasher.update(self.dnskey.flags.to_be_bytes());
        hasher.update([self.dnskey.protocol, self.dnskey.algorithm]);
        hasher.update(&self.dnskey.public_key);
        let digest = hasher.finalize();

        let mut rdata = Vec::with_capacity(4 + digest.len());
        rdata.extend_from_slice(&self.dnskey.calculate_key_tag().to_be_bytes());
        rdata.push(self.dnskey.algorithm);
        rdata.push(2);
        rdata.extend_from_slice(&digest);

        let mut message = vec![0, 0, 0x81, 0x80, 0, 0, 0, 1, 0, 0, 0, 0];
        message.extend_from_slice(&owner_wire);
        message.extend_from_slice(&[0x00, 0x2b, 0x00, 0x01]);
        message.extend_from_slice(&TTL.to_be_bytes());
        message.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        message.extend_from_slice(&rdata);

        ResponseParser::parse(&message).unwrap().answers[0].clone()
    }

    pub fn anchor(&self) -> TrustAnchor {
        TrustAnchor::new(
            &self.name.to_ascii(),
            AnchorKey::Dnskey(self.dnskey.clone()),
            format!("test anchor for {}", self.name),
        )
    }
}

fn hickory_dnskey(public_key: &[u8]) -> HickoryDNSKEY {
    HickoryDNSKEY::with_flags(257, PublicKeyBuf::new(public_key.to_vec(), Algorithm::ED25519))
}

pub fn a_record(name: &str, ip: Ipv4Addr) -> Record {
    Record::from_rdata(Name::from_str(name).unwrap(), TTL, RData::A(A(ip)))
}

pub fn soa_record(zone: &str) -> Record {
    let name = Name::from_str(zone).unwrap();
    let soa = SOA::new(
        Name::from_str(&format!("ns1.{}", zone)).unwrap(),
        Name::from_str(&format!("hostmaster.{}", zone)).unwrap(),
        1,
        3600,
        900,
        604800,
        60,
    );
    Record::from_rdata(name, TTL, RData::SOA(soa))
}

pub fn answer(records: Vec<Record>) -> DnsResponse {
    DnsResponse::from_sections(0, records, Vec::new())
}

pub fn nxdomain(authority: Vec<Record>) -> DnsResponse {
    DnsResponse::from_sections(3, Vec::new(), authority)
}

/// Root, `com.` and `example.com.` signed and chained by DS records,
/// plus `unsigned.com.`, a delegation without DS.
pub struct ZoneFixture {
    pub root: SignedZone,
    pub com: SignedZone,
    pub example: SignedZone,
    pub exchange: ScriptedExchange,
}

impl ZoneFixture {
    pub fn new() -> Self {
        let root = SignedZone::generate(".");
        let com = SignedZone::generate("com.");
        let example = SignedZone::generate("example.com.");

        let mut exchange = ScriptedExchange::new();
        exchange.respond(".", RecordType::DNSKEY, root.key_set_response());
        exchange.respond("com.", RecordType::DS, answer(root.signed(vec![com.ds_record()])));
        exchange.respond("com.", RecordType::DNSKEY, com.key_set_response());
        exchange.respond(
            "example.com.",
            RecordType::DS,
            answer(com.signed(vec![example.ds_record()])),
        );
        exchange.respond("example.com.", RecordType::DNSKEY, example.key_set_response());
        exchange.respond(
            "unsigned.com.",
            RecordType::SOA,
            answer(vec![soa_record("unsigned.com.")]),
        );

        Self {
            root,
            com,
            example,
            exchange,
        }
    }

    pub fn trust_store(&self) -> TrustAnchorStore {
        let mut store = TrustAnchorStore::empty();
        store.add_anchor(self.root.anchor());
        store
    }
}
