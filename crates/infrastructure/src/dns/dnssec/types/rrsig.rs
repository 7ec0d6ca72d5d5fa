use super::algorithm_name;
use crate::dns::forwarding::record_type_map::RecordTypeMapper;
use hickory_proto::dnssec::rdata::DNSSECRData;
use hickory_proto::rr::{RData, Record};
use spark_dns_domain::RecordType;
use std::fmt;

#[derive(Debug, Clone)]
pub struct RrsigRecord {
    pub type_covered: RecordType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub signature_expiration: u32,
    pub signature_inception: u32,
    pub key_tag: u16,
    /// Lower-case, dot-terminated.
    pub signer_name: String,
    pub signature: Vec<u8>,
}

impl RrsigRecord {
    pub fn from_record(record: &Record) -> Option<Self> {
        let RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) = record.data() else {
            return None;
        };
        let input = rrsig.input();
        Some(Self {
            type_covered: RecordTypeMapper::from_hickory(input.type_covered),
            algorithm: u8::from(input.algorithm),
            labels: input.num_labels,
            original_ttl: input.original_ttl,
            signature_expiration: input.sig_expiration.get(),
            signature_inception: input.sig_inception.get(),
            key_tag: input.key_tag,
            signer_name: input.signer_name.to_string().to_ascii_lowercase(),
            signature: rrsig.sig().to_vec(),
        })
    }

    pub fn algorithm_name(&self) -> &'static str {
        algorithm_name(self.algorithm)
    }

    pub fn is_valid_at(&self, now: u32) -> bool {
        now >= self.signature_inception && now <= self.signature_expiration
    }
}

impl fmt::Display for RrsigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RRSIG({}, algo={}, tag={}, signer={})",
            self.type_covered,
            self.algorithm_name(),
            self.key_tag,
            self.signer_name
        )
    }
}
