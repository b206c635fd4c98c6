use crate::algorithm::HashAlgorithm;
use crate::error::VerifyError;
use crate::mac;
use subtle::ConstantTimeEq;

const SEPARATOR: char = '=';

/// Borrowed view of a `<algorithm>=<hexdigest>` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureEnvelope<'a> {
    pub algorithm: &'a str,
    pub digest_hex: &'a str,
}

pub fn parse_envelope(raw: &str) -> Result<SignatureEnvelope<'_>, VerifyError> {
    if raw.trim() != raw {
        return Err(VerifyError::malformed_envelope(
            "signature has surrounding whitespace",
        ));
    }

    let (algorithm, digest_hex) = raw
        .split_once(SEPARATOR)
        .ok_or_else(|| VerifyError::malformed_envelope("encoded hash does not contain a ="))?;

    if digest_hex.contains(SEPARATOR) {
        return Err(VerifyError::malformed_envelope(
            "encoded hash contains more than one =",
        ));
    }
    if algorithm.is_empty() {
        return Err(VerifyError::malformed_envelope("missing algorithm before ="));
    }
    if digest_hex.is_empty() {
        return Err(VerifyError::malformed_envelope("missing digest after ="));
    }

    Ok(SignatureEnvelope {
        algorithm,
        digest_hex,
    })
}

/// Checks `envelope` against the HMAC of `body` under `secret`.
///
/// Steps run in a fixed order and the first failure is returned: envelope
/// shape, algorithm token, hex decoding, then the constant-time comparison.
pub fn verify(
    body: &[u8],
    envelope: &str,
    secret: &[u8],
    expected: HashAlgorithm,
) -> Result<(), VerifyError> {
    let envelope = parse_envelope(envelope)?;

    if envelope.algorithm != expected.as_str() {
        return Err(VerifyError::algorithm_mismatch(
            envelope.algorithm,
            expected.as_str(),
        ));
    }

    let provided = hex::decode(envelope.digest_hex)
        .map_err(|source| VerifyError::invalid_digest_encoding(envelope.digest_hex, source))?;

    let computed = mac::compute(body, secret, expected);
    if constant_time_equals(&provided, &computed) {
        Ok(())
    } else {
        Err(VerifyError::signature_mismatch())
    }
}

/// Canonical envelope for `body`, lowercase hex.
pub fn sign(body: &[u8], secret: &[u8], algorithm: HashAlgorithm) -> String {
    format!(
        "{}{SEPARATOR}{}",
        algorithm.as_str(),
        mac::compute_hex(body, secret, algorithm)
    )
}

// `ct_eq` on slices returns false for differing lengths without touching contents.
fn constant_time_equals(left: &[u8], right: &[u8]) -> bool {
    left.ct_eq(right).into()
}
