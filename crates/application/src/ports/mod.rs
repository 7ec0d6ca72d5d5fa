mod resolution_engine;

pub use resolution_engine::ResolutionEngine;

// Re-export for convenience
pub use spark_dns_domain::{DnsQuery, ResolutionOutcome};
