mod client;

pub use client::{
    AUTH_PING_PATH, AUTH_SUCCESS_MSG, BackendClient, BackendResponse, DEFAULT_TIMEOUT_SECS,
    RESULTS_PATH,
};

use async_trait::async_trait;

use crate::error::{CredentialError, DeliveryError};
use crate::models::RemotePath;

/// The scanner backend: checks tokens and records where results were stored.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn auth_ping(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<BackendResponse, CredentialError>;

    async fn push_result_path(
        &self,
        base_url: &str,
        token: &str,
        remote: &RemotePath,
    ) -> Result<(), DeliveryError>;
}
