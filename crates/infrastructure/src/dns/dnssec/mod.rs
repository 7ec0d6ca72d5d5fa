pub mod cache;
pub mod crypto;
pub mod trust_anchor;
pub mod types;
pub mod validation;
pub mod validator;

pub use cache::{CacheStatsSnapshot, DnssecCache};
pub use crypto::SignatureVerifier;
pub use trust_anchor::{AnchorKey, TrustAnchor, TrustAnchorStore};
pub use types::{DnskeyRecord, DsRecord, RrsigRecord};
pub use validation::{ChainVerifier, SignedRrset, ZoneTrust};
pub use validator::{DnssecValidator, ValidationStatus};
