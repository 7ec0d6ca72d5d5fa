//! Spark DNS Domain Layer
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod query_config;
pub mod resolution;
pub mod result_record;

pub use config::{
    CliOverrides, ConfigError, EngineConfig, ResolverMode, MAX_EDNS_PAYLOAD, MIN_EDNS_PAYLOAD,
};
pub use dns_protocol::{DnsProtocol, DEFAULT_DNS_PORT};
pub use dns_query::{canonical_name, DnsQuery};
pub use dns_record::{DnsClass, RecordType, ResourceRecord};
pub use errors::DomainError;
pub use query_config::QueryConfig;
pub use resolution::ResolutionOutcome;
pub use result_record::ResultRecord;
