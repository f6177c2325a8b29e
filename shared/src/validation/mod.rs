mod consistency_validator;
mod error;
mod fingerprint;
mod validator_config;

pub use consistency_validator::ConsistencyValidator;
pub use error::ValidatorFault;
pub use fingerprint::{content_checksum, Fingerprint, FingerprintHasher};
pub use validator_config::ValidatorConfig;
