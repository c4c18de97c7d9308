use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::{CredentialError, DeliveryError};
use crate::models::RemotePath;

#[derive(Debug, Clone, PartialEq)]
pub enum Validity {
    Unknown,
    Valid,
    Invalid(CredentialError),
}

/// The scanner token and what the backend said about it.
#[derive(Debug, Clone)]
pub struct Credential {
    token: String,
    validity: Validity,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            validity: Validity::Unknown,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn validity(&self) -> &Validity {
        &self.validity
    }

    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }

    /// Records the verdict. Only the first call has any effect.
    fn settle(&mut self, verdict: &Result<(), CredentialError>) {
        if self.validity != Validity::Unknown {
            return;
        }
        self.validity = match verdict {
            Ok(()) => Validity::Valid,
            Err(e) => Validity::Invalid(e.clone()),
        };
    }
}

/// Owns the only path to the backend. Results can be reported only after the
/// token has been accepted.
pub struct CredentialGate<'a, B: Backend> {
    backend: &'a B,
    base_url: String,
    credential: Credential,
}

impl<'a, B: Backend> CredentialGate<'a, B> {
    pub fn new(backend: &'a B, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            backend,
            base_url: base_url.into(),
            credential: Credential::new(token),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Asks the backend about the token once; later calls return the
    /// remembered verdict.
    pub async fn validate(&mut self) -> Result<(), CredentialError> {
        match self.credential.validity() {
            Validity::Valid => return Ok(()),
            Validity::Invalid(e) => return Err(e.clone()),
            Validity::Unknown => {}
        }

        let verdict = self.check().await;
        self.credential.settle(&verdict);

        if verdict.is_ok() {
            info!("token is valid");
        }
        verdict
    }

    async fn check(&self) -> Result<(), CredentialError> {
        if self.credential.token().is_empty() {
            return Err(CredentialError::MissingToken);
        }
        if self.base_url.is_empty() {
            return Err(CredentialError::MissingBackend);
        }

        let response = self
            .backend
            .auth_ping(&self.base_url, self.credential.token())
            .await?;
        debug!(status_code = ?response.status_code, msg = ?response.msg, "auth ping answered");

        if response.is_auth_success() {
            Ok(())
        } else {
            Err(CredentialError::Rejected {
                status_code: response.status_code,
                msg: response.msg,
            })
        }
    }

    pub async fn report(&self, remote: &RemotePath) -> Result<(), DeliveryError> {
        if !self.credential.is_valid() {
            return Err(DeliveryError::NotAuthorized(
                "token has not been validated".to_string(),
            ));
        }
        if remote.is_empty() {
            return Err(DeliveryError::Report("remote path is empty".to_string()));
        }

        self.backend
            .push_result_path(&self.base_url, self.credential.token(), remote)
            .await
    }
}
