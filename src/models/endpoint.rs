use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Case-insensitive; `None` for verbs the scanner does not probe.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn requires_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One operation of the target API, as listed by its OpenAPI document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub path_params: Vec<PathParam>,
    pub request_body_example: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathParam {
    pub name: String,
    pub param_type: ParamType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamType {
    String,
    Integer,
    Uuid,
    Boolean,
}

impl ParamType {
    /// Value substituted when test data has nothing for the parameter.
    pub fn placeholder(self) -> &'static str {
        match self {
            ParamType::String => "test",
            ParamType::Integer => "1",
            ParamType::Uuid => "00000000-0000-0000-0000-000000000001",
            ParamType::Boolean => "true",
        }
    }
}

impl Endpoint {
    pub fn new(method: HttpMethod, path: String) -> Self {
        let path_params = Self::extract_path_params(&path);
        Self {
            path,
            method,
            path_params,
            request_body_example: None,
        }
    }

    fn extract_path_params(path: &str) -> Vec<PathParam> {
        path.split('/')
            .filter(|segment| segment.starts_with('{') && segment.ends_with('}'))
            .map(|segment| {
                let name = segment[1..segment.len() - 1].to_string();
                let param_type = Self::infer_param_type(&name);
                PathParam { name, param_type }
            })
            .collect()
    }

    fn infer_param_type(name: &str) -> ParamType {
        let lower = name.to_lowercase();
        if lower.contains("uuid") || lower.contains("guid") {
            ParamType::Uuid
        } else if lower.contains("id") || lower.contains("count") || lower.contains("num") {
            ParamType::Integer
        } else if lower.contains("enabled") || lower.contains("active") || lower.contains("flag") {
            ParamType::Boolean
        } else {
            ParamType::String
        }
    }

    /// Substitutes `{param}` segments, preferring operator-supplied values.
    pub fn resolve_path(&self, values: &HashMap<String, String>) -> String {
        self.path_params.iter().fold(self.path.clone(), |path, param| {
            let value = values
                .get(&param.name)
                .map(String::as_str)
                .unwrap_or_else(|| param.param_type.placeholder());
            path.replace(&format!("{{{}}}", param.name), &urlencoding::encode(value))
        })
    }

    /// `"METHOD /path"`, the key test data uses for request bodies.
    pub fn operation_key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn matches(&self, pattern: Option<&Regex>) -> bool {
        pattern.is_none_or(|re| re.is_match(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_params_are_extracted_and_typed() {
        let endpoint = Endpoint::new(HttpMethod::Get, "/orgs/{org_uuid}/users/{userId}".into());
        assert_eq!(endpoint.path_params.len(), 2);
        assert_eq!(endpoint.path_params[0].param_type, ParamType::Uuid);
        assert_eq!(endpoint.path_params[1].param_type, ParamType::Integer);
    }

    #[test]
    fn test_resolve_path_prefers_custom_values() {
        let endpoint = Endpoint::new(HttpMethod::Get, "/users/{userId}/posts/{slug}".into());
        let mut custom = HashMap::new();
        custom.insert("slug".to_string(), "hello world".to_string());

        assert_eq!(endpoint.resolve_path(&custom), "/users/1/posts/hello%20world");
    }

    #[test]
    fn test_matches_without_pattern_accepts_everything() {
        let endpoint = Endpoint::new(HttpMethod::Delete, "/admin/users".into());
        let re = Regex::new("^/admin").unwrap();
        let other = Regex::new("^/public").unwrap();

        assert!(endpoint.matches(None));
        assert!(endpoint.matches(Some(&re)));
        assert!(!endpoint.matches(Some(&other)));
    }

    #[test]
    fn test_method_parse_ignores_case() {
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse(" Delete "), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::parse("TRACE"), None);
        assert_eq!(format!("{:6}|", HttpMethod::Get), "GET   |");
    }

    #[test]
    fn test_operation_key() {
        let endpoint = Endpoint::new(HttpMethod::Post, "/users".into());
        assert_eq!(endpoint.operation_key(), "POST /users");
    }
}
