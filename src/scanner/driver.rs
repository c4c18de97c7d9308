use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, info};

use super::openapi::{ApiSpec, OpenApiParser};
use crate::auth::Credential;
use crate::config::{ScanConfig, TestData};
use crate::error::EngineError;
use crate::models::{Artifact, Finding};

/// Generates and executes tests for a parsed specification.
///
/// `Ok(None)` means the engine had nothing to run; `Ok(Some(vec![]))` means it
/// ran and found nothing. Both differ from `Err`.
#[async_trait]
pub trait ScanEngine: Send + Sync {
    async fn run(
        &self,
        spec: &ApiSpec,
        request: &EngineRequest,
    ) -> Result<Option<Vec<Finding>>, EngineError>;
}

#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub path_pattern: Option<Regex>,
    /// Test-data headers, then CLI headers, then the bearer token.
    pub headers: HeaderMap,
    pub rate_limit: f64,
    pub test_data: Option<TestData>,
    pub target_url: Option<String>,
    pub output: Artifact,
}

impl EngineRequest {
    pub fn build(
        config: &ScanConfig,
        credential: &Credential,
        output: &Artifact,
    ) -> Result<Self, EngineError> {
        let mut headers = config
            .test_data
            .as_ref()
            .map(|data| data.headers.clone())
            .unwrap_or_default();

        for (name, value) in &config.headers {
            headers.insert(name.clone(), value.clone());
        }

        let bearer = HeaderValue::from_str(&format!("Bearer {}", credential.token()))
            .map_err(|_| EngineError::Execution("token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, bearer);

        Ok(Self {
            path_pattern: config.path_pattern.clone(),
            headers,
            rate_limit: config.rate_limit,
            test_data: config.test_data.clone(),
            target_url: config.target_url.clone(),
            output: output.clone(),
        })
    }
}

pub struct ScanDriver<'a, E: ScanEngine> {
    engine: &'a E,
    parser: &'a OpenApiParser,
}

impl<'a, E: ScanEngine> ScanDriver<'a, E> {
    pub fn new(engine: &'a E, parser: &'a OpenApiParser) -> Self {
        Self { engine, parser }
    }

    /// One blocking call into the engine. Engine errors come back untouched
    /// and are never retried.
    pub async fn drive(
        &self,
        config: &ScanConfig,
        credential: &Credential,
        output: &Artifact,
    ) -> Result<Option<Vec<Finding>>, EngineError> {
        if !credential.is_valid() {
            return Err(EngineError::Execution(
                "refusing to scan without a validated token".into(),
            ));
        }

        let spec = self
            .parser
            .load(&config.spec_source)
            .await
            .map_err(|e| EngineError::Spec(format!("{:#}", e)))?;
        info!(
            source = %config.spec_source,
            title = spec.title.as_deref().unwrap_or("-"),
            operations = spec.endpoints.len(),
            "specification loaded"
        );

        let request = EngineRequest::build(config, credential, output)?;
        debug!(rate_limit = request.rate_limit, headers = request.headers.len(), "starting engine");

        self.engine.run(&spec, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryConfig;
    use crate::models::OutputFormat;
    use reqwest::header::HeaderName;
    use std::path::PathBuf;

    fn config() -> ScanConfig {
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-tenant"), HeaderValue::from_static("cli"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic spoofed"));

        let mut data = TestData::default();
        data.headers.insert(HeaderName::from_static("x-tenant"), HeaderValue::from_static("file"));
        data.headers.insert(HeaderName::from_static("x-extra"), HeaderValue::from_static("1"));

        ScanConfig {
            spec_source: "spec.json".into(),
            rate_limit: 5.0,
            path_pattern: None,
            headers,
            test_data: Some(data),
            format: OutputFormat::Json,
            target_url: None,
            results_dir: PathBuf::from("results"),
            delivery: DeliveryConfig {
                token: "tkn".into(),
                base_url: "http://backend".into(),
                bucket: None,
                region: None,
                report: true,
                strict: false,
            },
        }
    }

    #[test]
    fn test_header_precedence_and_bearer_injection() {
        let output = Artifact::new("results/a.json", OutputFormat::Json);
        let request = EngineRequest::build(&config(), &Credential::new("tkn"), &output).unwrap();

        assert_eq!(request.headers["x-tenant"], "cli");
        assert_eq!(request.headers["x-extra"], "1");
        assert_eq!(request.headers[AUTHORIZATION], "Bearer tkn");
        assert_eq!(request.rate_limit, 5.0);
    }
}
