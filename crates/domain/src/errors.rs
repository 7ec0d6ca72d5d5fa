use thiserror::Error;

/// Failures of a single resolution call.
///
/// The `Display` text is what ends up in the output line of a task whose
/// engine call failed, so messages stay short and lower-level detail goes
/// into the payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Transport timeout connecting to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    /// Engine or socket message, printed as-is.
    #[error("{0}")]
    Io(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("No upstream servers configured")]
    NoUpstreams,

    #[error("Insecure DNSSEC delegation: no DS records")]
    InsecureDelegation,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Io(e.to_string())
    }
}
