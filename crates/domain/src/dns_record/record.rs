use super::{DnsClass, RecordType};
use std::fmt;

/// One record of an answer section, already rendered to presentation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub owner: String,

    pub ttl: u32,

    pub class: DnsClass,

    pub record_type: RecordType,

    /// Presentation-format RDATA, e.g. `192.0.2.1` or `10 mail.example.`.
    pub rdata: String,
}

impl ResourceRecord {
    pub fn new(
        owner: impl Into<String>,
        ttl: u32,
        class: DnsClass,
        record_type: RecordType,
        rdata: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            ttl,
            class,
            record_type,
            rdata: rdata.into(),
        }
    }

    /// The data column only; owner, TTL, class and type are stripped.
    pub fn rdata(&self) -> &str {
        &self.rdata
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.owner, self.ttl, self.class, self.record_type, self.rdata
        )
    }
}
