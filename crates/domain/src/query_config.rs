use super::RecordType;

/// Per-run query settings, built once by the driver and read by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub record_type: RecordType,

    /// Report secure / insecure / bogus instead of response codes.
    pub check_security: bool,

    /// Prefix each name with a random label to probe denial of existence.
    pub randomize: bool,

    /// Emit one line per answer record ahead of the status line.
    pub print_records: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            record_type: RecordType::A,
            check_security: true,
            randomize: false,
            print_records: false,
        }
    }
}

impl QueryConfig {
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            ..Self::default()
        }
    }

    pub fn with_security_check(mut self, enabled: bool) -> Self {
        self.check_security = enabled;
        self
    }

    pub fn with_randomize(mut self, enabled: bool) -> Self {
        self.randomize = enabled;
        self
    }

    pub fn with_print_records(mut self, enabled: bool) -> Self {
        self.print_records = enabled;
        self
    }
}
