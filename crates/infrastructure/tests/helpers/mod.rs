#![allow(dead_code)]
pub mod dns_server_mock;
pub mod scripted_exchange;
pub mod signed_zone;

pub use dns_server_mock::{MockBehavior, MockDnsServer};
pub use scripted_exchange::ScriptedExchange;
pub use signed_zone::{SignedZone, ZoneFixture};
