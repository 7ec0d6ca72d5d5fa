pub mod chain;
pub mod rrset;

pub use chain::{ChainVerifier, ZoneTrust};
pub use rrset::{group_rrsets, SignedRrset};
