pub mod algorithm;
pub mod error;
pub mod mac;
pub mod signatures;

pub use algorithm::HashAlgorithm;
pub use error::{ErrorKind, VerifyError};
pub use signatures::{SignatureEnvelope, parse_envelope, sign, verify};
