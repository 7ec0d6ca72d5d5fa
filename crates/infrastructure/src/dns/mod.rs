pub mod dnssec;
pub mod forwarding;
pub mod resolver;
pub mod transport;
pub mod upstream;

pub use forwarding::{DnsResponse, MessageBuilder, QueryOptions, ResponseParser};
pub use resolver::{EngineBuilder, ValidatingResolver};
pub use upstream::{DnsExchange, UpstreamClient, UpstreamResponse};
