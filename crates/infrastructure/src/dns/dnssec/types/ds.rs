use super::algorithm_name;
use hickory_proto::dnssec::rdata::DNSSECRData;
use hickory_proto::rr::{RData, Record};
use spark_dns_domain::DomainError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsRecord {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl DsRecord {
    pub fn new(
        key_tag: u16,
        algorithm: u8,
        digest_type: u8,
        digest: Vec<u8>,
    ) -> Result<Self, DomainError> {
        Self::validate_digest_length(digest_type, digest.len())?;
        Ok(Self {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }

    /// `None` for other record types and for digests of the wrong length.
    pub fn from_record(record: &Record) -> Option<Self> {
        match record.data() {
            RData::DNSSEC(DNSSECRData::DS(ds)) => Self::new(
                ds.key_tag(),
                u8::from(ds.algorithm()),
                u8::from(ds.digest_type()),
                ds.digest().to_vec(),
            )
            .ok(),
            _ => None,
        }
    }

    fn validate_digest_length(digest_type: u8, length: usize) -> Result<(), DomainError> {
        let expected = match digest_type {
            1 => 20,
            2 => 32,
            4 => 48,
            _ => return Ok(()),
        };

        if length != expected {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Invalid digest length for type {}: got {}, expected {}",
                digest_type, length, expected
            )));
        }

        Ok(())
    }

    pub fn digest_type_name(&self) -> &'static str {
        match self.digest_type {
            1 => "SHA-1",
            2 => "SHA-256",
            4 => "SHA-384",
            _ => "Unknown",
        }
    }

    pub fn algorithm_name(&self) -> &'static str {
        algorithm_name(self.algorithm)
    }
}

impl fmt::Display for DsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DS(tag={}, algo={}, digest={})",
            self.key_tag,
            self.algorithm_name(),
            self.digest_type_name()
        )
    }
}
