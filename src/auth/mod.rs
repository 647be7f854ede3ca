mod claims;
pub(crate) mod extractors;
pub mod google;
pub mod verifier;

pub use extractors::AuthUser;
pub use google::GoogleVerifier;
pub use verifier::IdentityVerifier;
