use crate::config::Config;
use crate::headers::header_string;
use anyhow::{Result, anyhow};
use http::{HeaderMap, HeaderName};
use signature_core::{ErrorKind, HashAlgorithm, VerifyError, verify};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("missing signature header {header}")]
    MissingSignature { header: String },
    #[error("payload of {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error(transparent)]
    Invalid(#[from] VerifyError),
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingSignature { .. } => "missing_signature",
            Rejection::PayloadTooLarge { .. } => "payload_too_large",
            Rejection::Invalid(error) => error.kind().as_str(),
        }
    }

    pub fn verify_kind(&self) -> Option<ErrorKind> {
        match self {
            Rejection::Invalid(error) => Some(error.kind()),
            _ => None,
        }
    }
}

/// What the interceptor hands to the downstream collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accepted(Vec<u8>),
    Rejected(Rejection),
}

/// Header-driven signature gate with its secret and algorithm fixed at
/// construction.
#[derive(Clone)]
pub struct Interceptor {
    header_name: HeaderName,
    secret: Arc<[u8]>,
    algorithm: HashAlgorithm,
    max_body_bytes: usize,
}

impl Interceptor {
    pub fn new(header_name: HeaderName, secret: &[u8], algorithm: HashAlgorithm) -> Self {
        Self {
            header_name,
            secret: Arc::from(secret),
            algorithm,
            max_body_bytes: usize::MAX,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.header_name.clone(),
            config.secret.as_bytes(),
            config.algorithm,
        )
        .with_max_body_bytes(config.max_body_bytes)
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn check(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), Rejection> {
        if body.len() > self.max_body_bytes {
            return Err(Rejection::PayloadTooLarge {
                size: body.len(),
                limit: self.max_body_bytes,
            });
        }

        if !headers.contains_key(&self.header_name) {
            return Err(Rejection::MissingSignature {
                header: self.header_name.to_string(),
            });
        }
        let signature = header_string(headers, &self.header_name).ok_or_else(|| {
            VerifyError::new(
                ErrorKind::MalformedEnvelope,
                "signature header is not visible ASCII",
            )
        })?;

        debug!(
            header = %self.header_name,
            algorithm = %self.algorithm,
            bytes = body.len(),
            "verifying webhook signature"
        );

        verify(body, signature, &self.secret, self.algorithm)?;
        Ok(())
    }

    /// Checks the request and logs the outcome; rejection details never
    /// include the secret.
    pub fn decide(&self, headers: &HeaderMap, body: Vec<u8>) -> Decision {
        match self.check(headers, &body) {
            Ok(()) => {
                info!(
                    header = %self.header_name,
                    bytes = body.len(),
                    "webhook signature accepted"
                );
                Decision::Accepted(body)
            }
            Err(rejection) => {
                warn!(
                    header = %self.header_name,
                    reason = rejection.reason(),
                    "webhook signature rejected: {rejection}"
                );
                Decision::Rejected(rejection)
            }
        }
    }

    /// Decides and delivers the result to a concurrent collector.
    pub async fn forward(
        &self,
        headers: &HeaderMap,
        body: Vec<u8>,
        results: &mpsc::Sender<Decision>,
    ) -> Result<()> {
        let decision = self.decide(headers, body);
        results
            .send(decision)
            .await
            .map_err(|_| anyhow!("decision collector closed"))
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("header_name", &self.header_name)
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}
