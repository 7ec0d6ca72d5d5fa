pub mod builder;
pub mod core;

pub use builder::{EngineBuilder, BUILTIN_UPSTREAMS};
pub use core::ValidatingResolver;
