use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use crate::models::{Endpoint, HttpMethod, ResponseInfo};

/// Sends probe requests against the API under test.
pub struct HttpClient {
    client: Client,
    base_url: String,
}

/// Everything that varies between two probes of the same endpoint.
pub struct Probe<'a> {
    pub label: &'a str,
    pub headers: &'a HeaderMap,
    pub path_params: &'a HashMap<String, String>,
    pub query_params: &'a BTreeMap<String, String>,
    pub body: Option<&'a serde_json::Value>,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .danger_accept_invalid_certs(false)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn url_for(&self, endpoint: &Endpoint, probe: &Probe<'_>) -> String {
        let resolved_path = endpoint.resolve_path(probe.path_params);

        let query_string = probe
            .query_params
            .iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    urlencoding::encode(k).to_string()
                } else {
                    format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))
                }
            })
            .collect::<Vec<_>>()
            .join("&");

        if query_string.is_empty() {
            format!("{}{}", self.base_url, resolved_path)
        } else {
            format!("{}{}?{}", self.base_url, resolved_path, query_string)
        }
    }

    pub async fn send(&self, endpoint: &Endpoint, probe: &Probe<'_>) -> ResponseInfo {
        let start = Instant::now();
        let url = self.url_for(endpoint, probe);

        let mut request = self
            .client
            .request(Self::to_reqwest_method(endpoint.method), &url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .headers(probe.headers.clone());

        if endpoint.method.requires_body() {
            if let Some(body) = probe.body.or(endpoint.request_body_example.as_ref()) {
                request = request
                    .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .json(body);
            }
        }

        self.execute_request(probe.label, request, start).await
    }

    async fn execute_request(
        &self,
        label: &str,
        request: RequestBuilder,
        start: Instant,
    ) -> ResponseInfo {
        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let size = response.bytes().await.map(|b| b.len()).unwrap_or_default();
                let duration_ms = start.elapsed().as_millis() as u64;

                ResponseInfo::new(label, status, size, duration_ms)
            }
            Err(e) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                ResponseInfo::error(label, e.to_string(), duration_ms)
            }
        }
    }

    fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }
}
