//! Failure taxonomy for signature verification.
//!
//! Every kind is terminal for a single attempt. Details never carry the secret
//! and only ever quote a redacted prefix of a supplied digest.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const REDACTED_DIGEST_PREFIX: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedAlgorithm,
    MalformedEnvelope,
    AlgorithmMismatch,
    InvalidDigestEncoding,
    SignatureMismatch,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedAlgorithm => "unsupported_algorithm",
            ErrorKind::MalformedEnvelope => "malformed_envelope",
            ErrorKind::AlgorithmMismatch => "algorithm_mismatch",
            ErrorKind::InvalidDigestEncoding => "invalid_digest_encoding",
            ErrorKind::SignatureMismatch => "signature_mismatch",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct VerifyError {
    kind: ErrorKind,
    detail: String,
}

impl VerifyError {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub(crate) fn unsupported_algorithm(token: &str) -> Self {
        Self::new(
            ErrorKind::UnsupportedAlgorithm,
            format!("unsupported hash algorithm: {token:?}"),
        )
    }

    pub(crate) fn malformed_envelope(reason: &str) -> Self {
        Self::new(ErrorKind::MalformedEnvelope, reason)
    }

    pub(crate) fn algorithm_mismatch(found: &str, expected: &str) -> Self {
        Self::new(
            ErrorKind::AlgorithmMismatch,
            format!("incorrect hashing method: {found:?} (expected {expected})"),
        )
    }

    pub(crate) fn invalid_digest_encoding(digest_hex: &str, source: hex::FromHexError) -> Self {
        Self::new(
            ErrorKind::InvalidDigestEncoding,
            format!("digest {} is not valid hex: {source}", redact(digest_hex)),
        )
    }

    pub(crate) fn signature_mismatch() -> Self {
        Self::new(ErrorKind::SignatureMismatch, "invalid message digest or key")
    }
}

fn redact(digest_hex: &str) -> String {
    let prefix: String = digest_hex.chars().take(REDACTED_DIGEST_PREFIX).collect();
    if prefix.len() < digest_hex.len() {
        format!("{prefix:?}...")
    } else {
        format!("{prefix:?}")
    }
}
