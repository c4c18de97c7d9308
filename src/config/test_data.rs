//! Operator-supplied test inputs loaded from a YAML file.
//!
//! ```yaml
//! headers:
//!   X-Tenant: acme
//! path_params:
//!   userId: 42
//! query_params:
//!   limit: 10
//! request_bodies:
//!   "POST /users":
//!     name: probe
//! ```

use reqwest::header::HeaderMap;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use super::headers::header_pair;
use crate::error::{ConfigError, ConfigValidationError};
use crate::scanner::EndpointParser;

const KNOWN_KEYS: &[&str] = &["headers", "path_params", "query_params", "request_bodies"];

#[derive(Debug, Clone, Default)]
pub struct TestData {
    pub headers: HeaderMap,
    pub path_params: HashMap<String, String>,
    pub query_params: BTreeMap<String, String>,
    /// Keyed by `"METHOD /path"`.
    pub request_bodies: HashMap<String, serde_json::Value>,
}

impl TestData {
    /// Reads and validates a test data file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = read(path)?;
        let document = parse(&content)?;
        Ok(validate(&document)?)
    }

    pub fn request_body(&self, operation_key: &str) -> Option<&serde_json::Value> {
        self.request_bodies.get(operation_key)
    }
}

pub fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::TestDataFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn parse(content: &str) -> Result<Value, ConfigValidationError> {
    serde_yaml::from_str(content)
        .map_err(|e| ConfigValidationError::new("<document>", e.to_string()))
}

pub fn validate(document: &Value) -> Result<TestData, ConfigValidationError> {
    let root = match document {
        Value::Mapping(map) => map,
        Value::Null => return Ok(TestData::default()),
        _ => {
            return Err(ConfigValidationError::new(
                "<document>",
                "top level must be a mapping",
            ));
        }
    };

    for key in root.keys() {
        let name = key
            .as_str()
            .ok_or_else(|| ConfigValidationError::new("<document>", "keys must be strings"))?;
        if !KNOWN_KEYS.contains(&name) {
            return Err(ConfigValidationError::new(
                name,
                format!("unknown key, expected one of: {}", KNOWN_KEYS.join(", ")),
            ));
        }
    }

    let mut data = TestData::default();

    if let Some(section) = section(root, "headers")? {
        for (name, value) in scalar_entries(section, "headers")? {
            let (name, value) = header_pair(&name, &value)
                .map_err(|e| ConfigValidationError::new(format!("headers.{}", name), e))?;
            data.headers.insert(name, value);
        }
    }

    if let Some(section) = section(root, "path_params")? {
        data.path_params = scalar_entries(section, "path_params")?.into_iter().collect();
    }

    if let Some(section) = section(root, "query_params")? {
        data.query_params = scalar_entries(section, "query_params")?.into_iter().collect();
    }

    if let Some(section) = section(root, "request_bodies")? {
        for (key, body) in section {
            let key = key.as_str().ok_or_else(|| {
                ConfigValidationError::new("request_bodies", "operation keys must be strings")
            })?;
            let field = format!("request_bodies.{}", key);
            let endpoint =
                EndpointParser::parse(key).map_err(|e| ConfigValidationError::new(&field, e))?;
            let body = serde_json::to_value(body)
                .map_err(|e| ConfigValidationError::new(&field, e.to_string()))?;
            data.request_bodies.insert(endpoint.operation_key(), body);
        }
    }

    Ok(data)
}

fn section<'a>(
    root: &'a Mapping,
    name: &str,
) -> Result<Option<&'a Mapping>, ConfigValidationError> {
    match root.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Mapping(map)) => Ok(Some(map)),
        Some(_) => Err(ConfigValidationError::new(name, "must be a mapping")),
    }
}

fn scalar_entries(
    section: &Mapping,
    name: &str,
) -> Result<Vec<(String, String)>, ConfigValidationError> {
    section
        .iter()
        .map(|(key, value)| {
            let key = scalar(key)
                .ok_or_else(|| ConfigValidationError::new(name, "keys must be scalars"))?;
            let value = scalar(value).ok_or_else(|| {
                ConfigValidationError::new(format!("{}.{}", name, key), "value must be a scalar")
            })?;
            Ok((key, value))
        })
        .collect()
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
