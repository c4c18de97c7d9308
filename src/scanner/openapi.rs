use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::fs;
use std::time::Duration;

use crate::models::{Endpoint, HttpMethod, ParamType, PathParam};

/// Operations and server location read from an OpenAPI/Swagger document.
#[derive(Debug, Clone, Default)]
pub struct ApiSpec {
    pub title: Option<String>,
    pub base_url: Option<String>,
    pub endpoints: Vec<Endpoint>,
}

pub struct OpenApiParser {
    client: Client,
}

impl OpenApiParser {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// Loads a document from a local path or an http(s) URL.
    pub async fn load(&self, source: &str) -> Result<ApiSpec> {
        let content = if is_url(source) {
            self.client
                .get(source)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .with_context(|| format!("Failed to fetch OpenAPI spec: {}", source))?
                .text()
                .await
                .with_context(|| format!("Failed to read OpenAPI spec body: {}", source))?
        } else {
            fs::read_to_string(source)
                .with_context(|| format!("Failed to read OpenAPI spec: {}", source))?
        };

        self.parse_content(&content)
    }

    pub fn parse_content(&self, content: &str) -> Result<ApiSpec> {
        let spec: Value = if content.trim_start().starts_with('{') {
            serde_json::from_str(content).context("Failed to parse spec as JSON")?
        } else {
            serde_yaml::from_str(content).context("Failed to parse spec as YAML")?
        };

        let title = spec
            .pointer("/info/title")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let (base_url, endpoints) = match self.detect_version(&spec) {
            OpenApiVersion::V3 => (self.server_url_v3(&spec), self.parse_openapi_v3(&spec)?),
            OpenApiVersion::V2 => (self.server_url_v2(&spec), self.parse_swagger_v2(&spec)?),
            OpenApiVersion::Unknown => anyhow::bail!("Unknown OpenAPI/Swagger version"),
        };

        Ok(ApiSpec {
            title,
            base_url,
            endpoints,
        })
    }

    fn detect_version(&self, spec: &Value) -> OpenApiVersion {
        if spec.get("openapi").is_some() {
            OpenApiVersion::V3
        } else if spec.get("swagger").is_some() {
            OpenApiVersion::V2
        } else {
            OpenApiVersion::Unknown
        }
    }

    fn server_url_v3(&self, spec: &Value) -> Option<String> {
        spec.pointer("/servers/0/url")
            .and_then(|v| v.as_str())
            .filter(|url| is_url(url))
            .map(|url| url.trim_end_matches('/').to_string())
    }

    fn server_url_v2(&self, spec: &Value) -> Option<String> {
        let host = spec.get("host").and_then(|v| v.as_str())?;
        let scheme = spec
            .pointer("/schemes/0")
            .and_then(|v| v.as_str())
            .unwrap_or("https");
        let base_path = spec
            .get("basePath")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim_end_matches('/');

        Some(format!("{}://{}{}", scheme, host, base_path))
    }

    fn parse_openapi_v3(&self, spec: &Value) -> Result<Vec<Endpoint>> {
        let paths = spec
            .get("paths")
            .and_then(|p| p.as_object())
            .ok_or_else(|| anyhow::anyhow!("No 'paths' found in OpenAPI spec"))?;

        let mut endpoints = Vec::new();

        for (path, methods) in paths {
            let Some(methods_obj) = methods.as_object() else {
                continue;
            };

            for (method_str, operation) in methods_obj {
                let Some(method) = HttpMethod::parse(method_str) else {
                    continue;
                };
                let mut endpoint = Endpoint::new(method, path.clone());

                if let Some(params) = operation.get("parameters").and_then(|p| p.as_array()) {
                    let declared = self.parse_path_parameters(params, path, |param| {
                        Self::param_type(param.get("schema"))
                    });
                    if !declared.is_empty() {
                        endpoint.path_params = declared;
                    }
                }

                if let Some(request_body) = operation.get("requestBody") {
                    endpoint.request_body_example = self.request_body_example_v3(request_body);
                }

                endpoints.push(endpoint);
            }
        }

        Ok(endpoints)
    }

    fn parse_swagger_v2(&self, spec: &Value) -> Result<Vec<Endpoint>> {
        let paths = spec
            .get("paths")
            .and_then(|p| p.as_object())
            .ok_or_else(|| anyhow::anyhow!("No 'paths' found in Swagger spec"))?;

        let mut endpoints = Vec::new();

        for (path, methods) in paths {
            let Some(methods_obj) = methods.as_object() else {
                continue;
            };

            for (method_str, operation) in methods_obj {
                let Some(method) = HttpMethod::parse(method_str) else {
                    continue;
                };
                let mut endpoint = Endpoint::new(method, path.clone());

                if let Some(params) = operation.get("parameters").and_then(|p| p.as_array()) {
                    let declared =
                        self.parse_path_parameters(params, path, |param| Self::param_type(Some(param)));
                    if !declared.is_empty() {
                        endpoint.path_params = declared;
                    }
                    endpoint.request_body_example = self.body_param_example_v2(params);
                }

                endpoints.push(endpoint);
            }
        }

        Ok(endpoints)
    }

    fn parse_path_parameters<F>(&self, params: &[Value], path: &str, infer: F) -> Vec<PathParam>
    where
        F: Fn(&Value) -> ParamType,
    {
        params
            .iter()
            .filter(|param| param.get("in").and_then(|v| v.as_str()) == Some("path"))
            .filter_map(|param| {
                let name = param.get("name").and_then(|v| v.as_str())?;
                if !path.contains(&format!("{{{}}}", name)) {
                    return None;
                }
                Some(PathParam {
                    name: name.to_string(),
                    param_type: infer(param),
                })
            })
            .collect()
    }

    /// Reads `type`/`format` from a v3 schema or a v2 parameter object.
    fn param_type(schema: Option<&Value>) -> ParamType {
        let Some(schema) = schema else {
            return ParamType::String;
        };

        let type_str = schema.get("type").and_then(|v| v.as_str()).unwrap_or("");
        let format_str = schema.get("format").and_then(|v| v.as_str()).unwrap_or("");

        match (type_str, format_str) {
            ("integer", _) | ("number", _) => ParamType::Integer,
            ("string", "uuid") => ParamType::Uuid,
            ("boolean", _) => ParamType::Boolean,
            _ => ParamType::String,
        }
    }

    fn request_body_example_v3(&self, request_body: &Value) -> Option<Value> {
        let json_content = request_body.get("content")?.get("application/json")?;

        if let Some(example) = json_content.get("example") {
            return Some(example.clone());
        }

        json_content
            .get("examples")
            .and_then(|e| e.as_object())
            .and_then(|examples| examples.values().next())
            .and_then(|first| first.get("value"))
            .or_else(|| json_content.pointer("/schema/example"))
            .cloned()
    }

    fn body_param_example_v2(&self, params: &[Value]) -> Option<Value> {
        params
            .iter()
            .filter(|param| param.get("in").and_then(|v| v.as_str()) == Some("body"))
            .find_map(|param| param.pointer("/schema/example").cloned())
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

enum OpenApiVersion {
    V3,
    V2,
    Unknown,
}
