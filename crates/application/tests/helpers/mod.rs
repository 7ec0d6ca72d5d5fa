#![allow(dead_code)]
mod mock_engine;

pub use mock_engine::{rr, MockResolutionEngine};
