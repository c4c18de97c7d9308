use crate::models::{Endpoint, HttpMethod};

/// Parses operation keys of the form `METHOD /path`.
pub struct EndpointParser;

impl EndpointParser {
    pub fn parse(input: &str) -> Result<Endpoint, String> {
        let parts: Vec<&str> = input.split_whitespace().collect();

        if parts.len() != 2 {
            return Err(format!(
                "invalid operation '{}', expected 'METHOD /path'",
                input
            ));
        }

        let method = HttpMethod::parse(parts[0]).ok_or_else(|| {
            format!(
                "invalid HTTP method '{}', supported: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS",
                parts[0]
            )
        })?;

        let path = parts[1].to_string();

        if !path.starts_with('/') {
            return Err(format!("path must start with '/': '{}'", path));
        }

        Ok(Endpoint::new(method, path))
    }
}
