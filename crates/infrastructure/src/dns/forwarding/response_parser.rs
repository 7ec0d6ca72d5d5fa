use super::record_type_map::RecordTypeMapper;
use hickory_proto::op::Message;
use hickory_proto::rr::Record;
use spark_dns_domain::{DnsClass, DomainError, RecordType, ResourceRecord};
use tracing::debug;

const HEADER_LEN: usize = 12;
const RCODE_NXDOMAIN: u16 = 3;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    /// Header RCODE (low four bits).
    pub rcode: u16,

    pub truncated: bool,

    /// AD bit as set by the forwarder.
    pub authentic_data: bool,

    pub min_ttl: Option<u32>,

    pub answers: Vec<Record>,

    pub authority: Vec<Record>,
}

impl DnsResponse {
    pub fn from_sections(rcode: u16, answers: Vec<Record>, authority: Vec<Record>) -> Self {
        let min_ttl = answers.iter().chain(authority.iter()).map(Record::ttl).min();
        Self {
            id: 0,
            rcode,
            truncated: false,
            authentic_data: false,
            min_ttl,
            answers,
            authority,
        }
    }

    pub fn is_nxdomain(&self) -> bool {
        self.rcode == RCODE_NXDOMAIN
    }

    pub fn is_nodata(&self) -> bool {
        self.rcode == 0 && self.answers.is_empty()
    }

    /// Answer records of the given type. `ANY` matches every type except
    /// signatures.
    pub fn answers_of_type(&self, record_type: RecordType) -> impl Iterator<Item = &Record> + '_ {
        self.answers.iter().filter(move |record| {
            let rt = RecordTypeMapper::from_hickory(record.record_type());
            match record_type {
                RecordType::ANY => rt != RecordType::RRSIG,
                wanted => rt == wanted,
            }
        })
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        if response_bytes.len() < HEADER_LEN {
            return Err(DomainError::InvalidDnsResponse(format!(
                "response of {} bytes is shorter than a DNS header",
                response_bytes.len()
            )));
        }

        let id = u16::from_be_bytes([response_bytes[0], response_bytes[1]]);
        let truncated = response_bytes[2] & 0x02 != 0;
        let authentic_data = response_bytes[3] & 0x20 != 0;
        let rcode = u16::from(response_bytes[3] & 0x0F);

        let message = match Message::from_vec(response_bytes) {
            Ok(message) => message,
            Err(e) if truncated => {
                // A truncated answer is only used to trigger the TCP retry.
                debug!(error = %e, "Truncated response did not parse, keeping header only");
                return Ok(DnsResponse {
                    id,
                    rcode,
                    truncated,
                    authentic_data,
                    min_ttl: None,
                    answers: Vec::new(),
                    authority: Vec::new(),
                });
            }
            Err(e) => {
                return Err(DomainError::InvalidDnsResponse(format!(
                    "Failed to parse DNS response: {}",
                    e
                )))
            }
        };

        let answers = message.answers().to_vec();
        let authority = message.name_servers().to_vec();
        let min_ttl = answers.iter().chain(authority.iter()).map(Record::ttl).min();

        Ok(DnsResponse {
            id,
            rcode,
            truncated,
            authentic_data,
            min_ttl,
            answers,
            authority,
        })
    }

    pub fn to_resource_record(record: &Record, class: DnsClass) -> ResourceRecord {
        ResourceRecord::new(
            record.name().to_string(),
            record.ttl(),
            class,
            RecordTypeMapper::from_hickory(record.record_type()),
            record.data().to_string(),
        )
    }
}
