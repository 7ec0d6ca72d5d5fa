pub mod engine;
pub mod errors;
pub mod resolver_mode;

pub use engine::{CliOverrides, EngineConfig, MAX_EDNS_PAYLOAD, MIN_EDNS_PAYLOAD};
pub use errors::ConfigError;
pub use resolver_mode::ResolverMode;
