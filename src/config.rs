use anyhow::{Context, Result, anyhow};
use http::HeaderName;
use signature_core::HashAlgorithm;
use std::env;
use std::fmt;

pub const HEADER_VAR: &str = "HEADER";
pub const SECRET_VAR: &str = "WEBHOOK_SECRET";
pub const ALGORITHM_VAR: &str = "WEBHOOK_ALGORITHM";
pub const MAX_BODY_BYTES_VAR: &str = "WEBHOOK_MAX_BODY_BYTES";

const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Clone)]
pub struct Config {
    pub header_name: HeaderName,
    pub secret: String,
    pub algorithm: HashAlgorithm,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any name -> value source; `from_env` is the
    /// process-environment case.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let algorithm = lookup(ALGORITHM_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                value
                    .trim()
                    .parse::<HashAlgorithm>()
                    .with_context(|| format!("invalid {ALGORITHM_VAR}"))
            })
            .transpose()?
            .unwrap_or(HashAlgorithm::Sha256);

        let config = Self {
            header_name: header_name(&required(&lookup, HEADER_VAR)?)?,
            secret: required(&lookup, SECRET_VAR)?,
            algorithm,
            max_body_bytes: env_usize(&lookup, MAX_BODY_BYTES_VAR, DEFAULT_MAX_BODY_BYTES)?,
        };

        if config.max_body_bytes == 0 {
            return Err(anyhow!("{MAX_BODY_BYTES_VAR} must be a positive integer"));
        }

        Ok(config)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("header_name", &self.header_name)
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).with_context(|| format!("missing required env var: {name}"))?;
    if value.trim().is_empty() {
        return Err(anyhow!("required env var {name} cannot be empty"));
    }
    Ok(value)
}

fn header_name(value: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(value.trim().as_bytes())
        .with_context(|| format!("{HEADER_VAR} is not a valid header name: {value:?}"))
}

fn env_usize<F>(lookup: &F, name: &str, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("invalid usize for {name}"))
        })
        .transpose()
        .map(|value| value.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = load(&[(HEADER_VAR, "X-Hub-Signature-256"), (SECRET_VAR, "s3cret")])
            .expect("valid config");

        assert_eq!(config.header_name.as_str(), "x-hub-signature-256");
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.algorithm, HashAlgorithm::Sha256);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[test]
    fn reads_optional_overrides() {
        let config = load(&[
            (HEADER_VAR, "X-Signature"),
            (SECRET_VAR, "s3cret"),
            (ALGORITHM_VAR, "sha512"),
            (MAX_BODY_BYTES_VAR, "2048"),
        ])
        .expect("valid config");

        assert_eq!(config.algorithm, HashAlgorithm::Sha512);
        assert_eq!(config.max_body_bytes, 2048);
    }

    #[test]
    fn requires_header_and_secret() {
        assert!(load(&[(SECRET_VAR, "s3cret")]).is_err());
        assert!(load(&[(HEADER_VAR, "X-Signature")]).is_err());
        assert!(load(&[(HEADER_VAR, "X-Signature"), (SECRET_VAR, "   ")]).is_err());
        assert!(load(&[(HEADER_VAR, ""), (SECRET_VAR, "s3cret")]).is_err());
    }

    #[test]
    fn rejects_illegal_header_name() {
        for header in ["X Hub Signature", "X-Sig\u{e9}"] {
            let error = load(&[(HEADER_VAR, header), (SECRET_VAR, "s3cret")])
                .expect_err("illegal header name");
            assert!(format!("{error:#}").contains(HEADER_VAR), "header {header:?}");
        }
    }

    #[test]
    fn rejects_unsupported_algorithm() {
        let error = load(&[
            (HEADER_VAR, "X-Signature"),
            (SECRET_VAR, "s3cret"),
            (ALGORITHM_VAR, "md5"),
        ])
        .expect_err("md5 is unsupported");

        assert!(format!("{error:#}").contains(ALGORITHM_VAR));
    }

    #[test]
    fn rejects_invalid_body_limit() {
        for limit in ["0", "lots"] {
            assert!(
                load(&[
                    (HEADER_VAR, "X-Signature"),
                    (SECRET_VAR, "s3cret"),
                    (MAX_BODY_BYTES_VAR, limit),
                ])
                .is_err(),
                "limit {limit}"
            );
        }
    }

    #[test]
    fn debug_output_redacts_secret() {
        let config = load(&[(HEADER_VAR, "X-Signature"), (SECRET_VAR, "do-not-print")])
            .expect("valid config");

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("do-not-print"));
        assert!(rendered.contains("<redacted>"));
    }
}
