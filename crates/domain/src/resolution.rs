use super::ResourceRecord;

/// What the resolution engine learned about one name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionOutcome {
    pub rcode: u16,

    /// The answer section holds data for the question.
    pub have_data: bool,

    /// The response is an explicit NXDOMAIN.
    pub nx_domain: bool,

    /// Validated up to a trust anchor.
    pub secure: bool,

    /// Validation was attempted and failed.
    pub bogus: bool,

    pub why_bogus: Option<String>,

    /// Dot-terminated name that was actually sent.
    pub qname: String,

    pub records: Vec<ResourceRecord>,
}

impl ResolutionOutcome {
    pub fn new(qname: impl Into<String>, rcode: u16) -> Self {
        Self {
            qname: qname.into(),
            rcode,
            nx_domain: rcode == 3,
            ..Self::default()
        }
    }

    pub fn with_records(mut self, records: Vec<ResourceRecord>) -> Self {
        self.have_data = !records.is_empty();
        self.records = records;
        self
    }

    pub fn secure(mut self) -> Self {
        self.secure = true;
        self.bogus = false;
        self.why_bogus = None;
        self
    }

    pub fn bogus(mut self, reason: impl Into<String>) -> Self {
        self.secure = false;
        self.bogus = true;
        self.why_bogus = Some(reason.into());
        self
    }

    pub fn why_bogus(&self) -> &str {
        self.why_bogus.as_deref().unwrap_or("")
    }
}
