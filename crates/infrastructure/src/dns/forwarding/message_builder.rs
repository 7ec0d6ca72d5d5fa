//! DNS query construction in wire format.
//!
//! Queries are written byte by byte so the question name goes out exactly
//! as it was read, letter case included. Every query carries an EDNS(0) OPT
//! record; the DO bit asks the forwarder to include RRSIGs.

use spark_dns_domain::{DnsQuery, DomainError};

const HEADER_LEN: usize = 12;
const OPT_RR_LEN: usize = 11;
const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_WIRE_LEN: usize = 255;

const FLAG_RD: u16 = 0x0100;
const FLAG_CD: u16 = 0x0010;
const EDNS_FLAG_DO: u16 = 0x8000;
const TYPE_OPT: u16 = 41;

/// Per-query header and EDNS settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Set the EDNS DO bit.
    pub dnssec_ok: bool,
    /// Set the CD header bit so the forwarder hands back data it could not
    /// validate instead of SERVFAIL.
    pub checking_disabled: bool,
    /// Advertised UDP payload size.
    pub edns_payload: u16,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            dnssec_ok: true,
            checking_disabled: false,
            edns_payload: 1232,
        }
    }
}

pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a recursive query with a random ID.
    ///
    /// Returns the ID alongside the bytes for response matching.
    pub fn build_query(
        query: &DnsQuery,
        options: &QueryOptions,
    ) -> Result<(u16, Vec<u8>), DomainError> {
        let id = fastrand::u16(..);
        let bytes = Self::build_query_with_id(id, query, options)?;
        Ok((id, bytes))
    }

    pub fn build_query_with_id(
        id: u16,
        query: &DnsQuery,
        options: &QueryOptions,
    ) -> Result<Vec<u8>, DomainError> {
        let qname = Self::encode_name(&query.name)?;

        let mut flags = FLAG_RD;
        if options.checking_disabled {
            flags |= FLAG_CD;
        }

        let mut buf = Vec::with_capacity(HEADER_LEN + qname.len() + 4 + OPT_RR_LEN);
        buf.extend_from_slice(&id.to_be_bytes());
        buf.extend_from_slice(&flags.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes()); // QDCOUNT
        buf.extend_from_slice(&0u16.to_be_bytes()); // ANCOUNT
        buf.extend_from_slice(&0u16.to_be_bytes()); // NSCOUNT
        buf.extend_from_slice(&1u16.to_be_bytes()); // ARCOUNT

        buf.extend_from_slice(&qname);
        buf.extend_from_slice(&query.record_type.to_u16().to_be_bytes());
        buf.extend_from_slice(&query.class.to_u16().to_be_bytes());

        Self::push_opt_record(&mut buf, options);
        Ok(buf)
    }

    /// Uncompressed wire form of a presentation name. A single trailing dot
    /// is accepted; empty interior labels are not.
    pub fn encode_name(name: &str) -> Result<Vec<u8>, DomainError> {
        let trimmed = name.strip_suffix('.').unwrap_or(name);
        if trimmed.is_empty() {
            return Ok(vec![0]);
        }

        let mut wire = Vec::with_capacity(trimmed.len() + 2);
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(DomainError::InvalidDomainName(format!(
                    "empty label in '{}'",
                    name
                )));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(DomainError::InvalidDomainName(format!(
                    "label longer than {} octets in '{}'",
                    MAX_LABEL_LEN, name
                )));
            }
            wire.push(label.len() as u8);
            wire.extend_from_slice(label.as_bytes());
        }
        wire.push(0);

        if wire.len() > MAX_NAME_WIRE_LEN {
            return Err(DomainError::InvalidDomainName(format!(
                "name longer than {} octets: '{}'",
                MAX_NAME_WIRE_LEN, name
            )));
        }
        Ok(wire)
    }

    fn push_opt_record(buf: &mut Vec<u8>, options: &QueryOptions) {
        let ext_flags = if options.dnssec_ok { EDNS_FLAG_DO } else { 0 };

        buf.push(0); // root owner
        buf.extend_from_slice(&TYPE_OPT.to_be_bytes());
        buf.extend_from_slice(&options.edns_payload.to_be_bytes());
        buf.push(0); // extended RCODE
        buf.push(0); // EDNS version
        buf.extend_from_slice(&ext_flags.to_be_bytes());
        buf.extend_from_slice(&0u16.to_be_bytes()); // RDLENGTH
    }
}
