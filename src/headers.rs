use anyhow::{Context, Result, anyhow};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::path::Path;

/// First value stored under `name`, if it is visible ASCII. The value is not
/// trimmed; surrounding whitespace is left for the verifier to reject.
pub fn header_string<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Parses captured `Name: value` lines into a header map. Blank lines and
/// `#` comments are skipped; the optional whitespace after the colon is not
/// part of the value. Repeated names keep every value in order.
pub fn parse(text: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| anyhow!("line {line_number}: expected `Name: value`"))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .with_context(|| format!("line {line_number}: invalid header name {name:?}"))?;
        let value = HeaderValue::from_str(value.trim_start_matches([' ', '\t']))
            .with_context(|| format!("line {line_number}: invalid value for {name}"))?;

        headers.append(name, value);
    }
    Ok(headers)
}

pub async fn load(path: &Path) -> Result<HeaderMap> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read headers file {}", path.display()))?;
    parse(&text).with_context(|| format!("parse headers file {}", path.display()))
}
