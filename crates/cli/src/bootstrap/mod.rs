mod engine;
mod input;
mod logging;

pub use engine::{build_engine, query_config, resolver_mode};
pub use input::open_input;
pub use logging::init_logging;
