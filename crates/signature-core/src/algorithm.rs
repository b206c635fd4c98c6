use crate::error::VerifyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 2] = [HashAlgorithm::Sha256, HashAlgorithm::Sha512];

    /// Token used on the wire, e.g. the `sha256` in `sha256=<hex>`.
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Size in bytes of the MAC this algorithm produces.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Matching is exact: vendors that send `SHA256=` are rejected rather than normalized.
impl FromStr for HashAlgorithm {
    type Err = VerifyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        HashAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == value)
            .ok_or_else(|| VerifyError::unsupported_algorithm(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_supported_tokens() {
        assert_eq!("sha256".parse::<HashAlgorithm>().ok(), Some(HashAlgorithm::Sha256));
        assert_eq!("sha512".parse::<HashAlgorithm>().ok(), Some(HashAlgorithm::Sha512));
    }

    #[test]
    fn rejects_unknown_and_differently_cased_tokens() {
        for token in ["md5", "sha1", "SHA256", "Sha512", " sha256", ""] {
            let error = token.parse::<HashAlgorithm>().expect_err("token must be rejected");
            assert_eq!(error.kind(), ErrorKind::UnsupportedAlgorithm, "token {token:?}");
        }
    }

    #[test]
    fn serializes_as_wire_token() {
        for algorithm in HashAlgorithm::ALL {
            let value = serde_json::to_value(algorithm).expect("serialize algorithm");
            assert_eq!(value, serde_json::Value::from(algorithm.as_str()));

            let parsed: HashAlgorithm = serde_json::from_value(value).expect("deserialize");
            assert_eq!(parsed, algorithm);
        }
        assert!(serde_json::from_str::<HashAlgorithm>("\"md5\"").is_err());
    }

    #[test]
    fn wire_token_round_trips_through_display() {
        for algorithm in HashAlgorithm::ALL {
            assert_eq!(
                algorithm.to_string().parse::<HashAlgorithm>().ok(),
                Some(algorithm)
            );
        }
    }
}
