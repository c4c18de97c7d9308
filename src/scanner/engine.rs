use async_trait::async_trait;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::AUTHORIZATION;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::driver::{EngineRequest, ScanEngine};
use super::openapi::ApiSpec;
use super::rate::RateLimiter;
use crate::error::EngineError;
use crate::http::{HttpClient, Probe};
use crate::models::{Endpoint, Finding, ResponseInfo};

pub const UNAUTHENTICATED_ACCESS: &str = "unauthenticated_access";

/// Built-in engine: probes every selected operation with and without the
/// `Authorization` header and flags operations that answer both with 2xx.
pub struct ProbeEngine {
    concurrency: usize,
    timeout: u64,
    show_progress: bool,
}

impl ProbeEngine {
    pub fn new(concurrency: usize, timeout: u64) -> Self {
        Self {
            concurrency: concurrency.max(1),
            timeout,
            show_progress: true,
        }
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

#[async_trait]
impl ScanEngine for ProbeEngine {
    async fn run(
        &self,
        spec: &ApiSpec,
        request: &EngineRequest,
    ) -> Result<Option<Vec<Finding>>, EngineError> {
        let endpoints: Vec<&Endpoint> = spec
            .endpoints
            .iter()
            .filter(|e| e.matches(request.path_pattern.as_ref()))
            .collect();

        if endpoints.is_empty() {
            warn!("no operations left to test after path filtering");
            return Ok(None);
        }

        let base_url = request
            .target_url
            .as_deref()
            .or(spec.base_url.as_deref())
            .ok_or_else(|| {
                EngineError::Execution(
                    "specification has no absolute server url; pass --target-url".into(),
                )
            })?;

        let client = HttpClient::new(base_url, self.timeout)
            .map_err(|e| EngineError::Execution(format!("cannot build http client: {}", e)))?;

        info!(%base_url, operations = endpoints.len(), "probing target api");

        let run = ProbeRun {
            client,
            request,
            limiter: RateLimiter::per_second(request.rate_limit),
            semaphore: Arc::new(Semaphore::new(self.concurrency)),
            empty_params: HashMap::new(),
            empty_query: BTreeMap::new(),
        };

        let pb = self.create_progress_bar(endpoints.len());
        let futures: Vec<_> = endpoints
            .into_iter()
            .map(|endpoint| run.probe_endpoint(endpoint, &pb))
            .collect();

        let findings = join_all(futures).await.into_iter().collect::<Result<Vec<_>, _>>()?;
        pb.finish_with_message("Scan complete");

        Ok(Some(findings))
    }
}

struct ProbeRun<'a> {
    client: HttpClient,
    request: &'a EngineRequest,
    limiter: RateLimiter,
    semaphore: Arc<Semaphore>,
    empty_params: HashMap<String, String>,
    empty_query: BTreeMap<String, String>,
}

impl ProbeRun<'_> {
    async fn probe_endpoint(
        &self,
        endpoint: &Endpoint,
        pb: &ProgressBar,
    ) -> Result<Finding, EngineError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| EngineError::Execution(e.to_string()))?;

        pb.set_message(endpoint.operation_key());

        let data = self.request.test_data.as_ref();
        let path_params = data.map(|d| &d.path_params).unwrap_or(&self.empty_params);
        let query_params = data.map(|d| &d.query_params).unwrap_or(&self.empty_query);
        let body = data.and_then(|d| d.request_body(&endpoint.operation_key()));

        let mut anonymous_headers = self.request.headers.clone();
        anonymous_headers.remove(AUTHORIZATION);

        let authenticated = Probe {
            label: "authenticated",
            headers: &self.request.headers,
            path_params,
            query_params,
            body,
        };
        let anonymous = Probe {
            label: "unauthenticated",
            headers: &anonymous_headers,
            ..authenticated
        };

        self.limiter.acquire().await;
        let with_auth = self.client.send(endpoint, &authenticated).await;
        self.limiter.acquire().await;
        let without_auth = self.client.send(endpoint, &anonymous).await;

        pb.inc(1);

        Ok(Self::assess(
            endpoint,
            self.client.url_for(endpoint, &authenticated),
            with_auth,
            without_auth,
        ))
    }

    fn assess(
        endpoint: &Endpoint,
        url: String,
        with_auth: ResponseInfo,
        without_auth: ResponseInfo,
    ) -> Finding {
        let vulnerable = with_auth.is_success() && without_auth.is_success();

        let description = if vulnerable {
            format!(
                "Endpoint answers {} without credentials (authenticated: {})",
                without_auth.status, with_auth.status
            )
        } else if without_auth.is_error() || with_auth.is_error() {
            "Probe could not be completed".to_string()
        } else {
            format!(
                "Access control enforced (authenticated: {}, unauthenticated: {})",
                with_auth.status, without_auth.status
            )
        };

        Finding {
            test_name: UNAUTHENTICATED_ACCESS.to_string(),
            method: endpoint.method,
            path: endpoint.path.clone(),
            url,
            vulnerable,
            description,
            responses: vec![with_auth, without_auth],
        }
    }
}
