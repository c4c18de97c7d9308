use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::ConfigError;

/// Turns repeated `Name: Value` flags into a header map.
///
/// The first colon separates name from value, so values may contain colons.
/// Names are case-insensitive and a later entry replaces an earlier one with
/// the same name. Entries without a colon, with an empty name, or with bytes
/// HTTP does not allow are rejected.
pub fn parse_headers<S: AsRef<str>>(entries: &[S]) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for entry in entries {
        let (name, value) = parse_header(entry.as_ref())?;
        headers.insert(name, value);
    }

    Ok(headers)
}

pub fn parse_header(entry: &str) -> Result<(HeaderName, HeaderValue), ConfigError> {
    let malformed = |reason: &str| ConfigError::Header {
        entry: entry.to_string(),
        reason: reason.to_string(),
    };

    let (name, value) = entry
        .split_once(':')
        .ok_or_else(|| malformed("expected 'Name: Value'"))?;

    header_pair(name, value).map_err(malformed)
}

/// Builds a header from an already separated name and value. Both are
/// trimmed; the name must be a valid HTTP token, so it cannot hold a colon.
pub fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("header name is empty");
    }

    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| "header name contains invalid characters")?;
    let value = HeaderValue::from_str(value.trim())
        .map_err(|_| "header value contains invalid characters")?;

    Ok((name, value))
}
