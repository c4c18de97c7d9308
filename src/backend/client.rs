use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::Backend;
use crate::error::{CredentialError, DeliveryError};
use crate::models::RemotePath;

pub const AUTH_PING_PATH: &str = "/api/v1/scanner/auth-ping";
pub const RESULTS_PATH: &str = "/api/v1/scanner/results";
pub const AUTH_SUCCESS_MSG: &str = "Authentication successful";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Body of the backend's JSON envelope. Both fields are optional on the wire
/// so that a half-filled body is a rejection rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendResponse {
    pub status_code: Option<u16>,
    pub msg: Option<String>,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == Some(200)
    }

    pub fn is_auth_success(&self) -> bool {
        self.is_success() && self.msg.as_deref() == Some(AUTH_SUCCESS_MSG)
    }
}

pub struct BackendClient {
    client: Client,
}

impl BackendClient {
    pub fn new(timeout_secs: u64) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }

    fn url(base_url: &str, path: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn auth_ping(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<BackendResponse, CredentialError> {
        let url = Self::url(base_url, AUTH_PING_PATH);
        debug!(%url, "checking scanner token");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| CredentialError::Transport(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CredentialError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| CredentialError::MalformedResponse(e.to_string()))
    }

    async fn push_result_path(
        &self,
        base_url: &str,
        token: &str,
        remote: &RemotePath,
    ) -> Result<(), DeliveryError> {
        let url = Self::url(base_url, RESULTS_PATH);
        let body = json!({ "s3_bucket_path": remote.to_string() });

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Report(e.to_string()))?;

        let http_status = response.status();
        let body: BackendResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Report(format!("unreadable response ({}): {}", http_status, e)))?;

        info!(status_code = ?body.status_code, msg = ?body.msg, "backend result report response");

        if body.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Report(format!(
                "backend answered status_code {:?}: {}",
                body.status_code,
                body.msg.unwrap_or_default()
            )))
        }
    }
}
