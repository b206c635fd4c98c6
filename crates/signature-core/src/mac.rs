use crate::algorithm::HashAlgorithm;
use crate::error::VerifyError;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};

/// Single-shot HMAC of `message` under `key`.
///
/// Any key length is accepted, including an empty key; callers that care about
/// key strength have to enforce it themselves.
pub fn compute(message: &[u8], key: &[u8], algorithm: HashAlgorithm) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => keyed_digest::<Hmac<Sha256>>(message, key),
        HashAlgorithm::Sha512 => keyed_digest::<Hmac<Sha512>>(message, key),
    }
}

/// Like [`compute`], but resolves the algorithm from its wire token first.
/// Unknown tokens fail before any hashing happens.
pub fn compute_named(message: &[u8], key: &[u8], algorithm: &str) -> Result<Vec<u8>, VerifyError> {
    let algorithm = algorithm.parse::<HashAlgorithm>()?;
    Ok(compute(message, key, algorithm))
}

pub fn compute_hex(message: &[u8], key: &[u8], algorithm: HashAlgorithm) -> String {
    hex::encode(compute(message, key, algorithm))
}

fn keyed_digest<M>(message: &[u8], key: &[u8]) -> Vec<u8>
where
    M: Mac + KeyInit,
{
    let mut mac = <M as KeyInit>::new_from_slice(key).expect("HMAC accepts variable-length keys");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}
