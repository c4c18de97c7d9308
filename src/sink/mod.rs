mod storage;

pub use storage::{S3Uploader, Uploader, generate_object_name};

use tracing::{error, info, warn};

use crate::auth::CredentialGate;
use crate::backend::Backend;
use crate::error::DeliveryError;
use crate::models::{Artifact, Finding, RemotePath};
use crate::reporter::write_artifact;

#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    Reported,
    Skipped,
    Failed(DeliveryError),
}

/// What happened to the artifact after it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// No bucket configured.
    LocalOnly,
    UploadFailed(DeliveryError),
    Uploaded {
        remote: RemotePath,
        report: ReportStatus,
    },
}

/// Persists results, then hands the file to storage and its location to the
/// backend. Upload and report outcomes are returned, never raised.
pub struct ResultSink<'a, U: Uploader, B: Backend> {
    uploader: &'a U,
    gate: &'a CredentialGate<'a, B>,
    bucket: Option<&'a str>,
    report: bool,
}

impl<'a, U: Uploader, B: Backend> ResultSink<'a, U, B> {
    pub fn new(
        uploader: &'a U,
        gate: &'a CredentialGate<'a, B>,
        bucket: Option<&'a str>,
        report: bool,
    ) -> Self {
        Self {
            uploader,
            gate,
            bucket,
            report,
        }
    }

    /// Writes the artifact unless the engine already produced it, then
    /// delivers it. Only a failed write is an error.
    pub async fn store(
        &self,
        artifact: &Artifact,
        findings: &[Finding],
    ) -> Result<Delivery, DeliveryError> {
        if artifact.exists() {
            info!(path = %artifact, "engine already wrote the artifact");
        } else {
            write_artifact(artifact, findings).map_err(|e| {
                let err = DeliveryError::Write {
                    path: artifact.to_string(),
                    reason: format!("{:#}", e),
                };
                error!(stage = "write", "{}", err);
                err
            })?;
            info!(path = %artifact, findings = findings.len(), "artifact written");
        }

        Ok(self.deliver(artifact).await)
    }

    /// Uploads an existing artifact and reports its remote location.
    pub async fn deliver(&self, artifact: &Artifact) -> Delivery {
        let Some(bucket) = self.bucket else {
            info!("no bucket configured, keeping results local");
            return Delivery::LocalOnly;
        };

        let remote = match self.uploader.upload(&artifact.path, bucket, None).await {
            Ok(remote) if !remote.is_empty() => remote,
            Ok(_) => {
                let err = DeliveryError::Upload {
                    bucket: bucket.to_string(),
                    reason: "uploader returned an empty path".to_string(),
                };
                error!(stage = "upload", "{}", err);
                return Delivery::UploadFailed(err);
            }
            Err(err) => {
                error!(stage = "upload", "{}", err);
                return Delivery::UploadFailed(err);
            }
        };

        if !self.report {
            info!(%remote, "result report skipped");
            return Delivery::Uploaded {
                remote,
                report: ReportStatus::Skipped,
            };
        }

        let report = match self.gate.report(&remote).await {
            Ok(()) => {
                info!(%remote, "result path reported to backend");
                ReportStatus::Reported
            }
            Err(err) => {
                warn!(stage = "report", "{}", err);
                ReportStatus::Failed(err)
            }
        };

        Delivery::Uploaded { remote, report }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AUTH_SUCCESS_MSG, BackendResponse};
    use crate::error::CredentialError;
    use crate::models::OutputFormat;
    use async_trait::async_trait;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct CountingBackend {
        reports: AtomicUsize,
    }

    #[async_trait]
    impl Backend for CountingBackend {
        async fn auth_ping(&self, _: &str, _: &str) -> Result<BackendResponse, CredentialError> {
            Ok(BackendResponse {
                status_code: Some(200),
                msg: Some(AUTH_SUCCESS_MSG.into()),
            })
        }

        async fn push_result_path(
            &self,
            _: &str,
            _: &str,
            _: &RemotePath,
        ) -> Result<(), DeliveryError> {
            self.reports.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FixedUploader(RemotePath);

    #[async_trait]
    impl Uploader for FixedUploader {
        async fn upload(
            &self,
            _: &Path,
            _: &str,
            _: Option<&str>,
        ) -> Result<RemotePath, DeliveryError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_existing_artifact_is_kept_as_written() {
        let dir = TempDir::new().unwrap();
        let artifact = Artifact::new(dir.path().join("engine.json"), OutputFormat::Json);
        fs::write(&artifact.path, "engine output").unwrap();

        let backend = CountingBackend::default();
        let mut gate = CredentialGate::new(&backend, "http://backend", "token");
        gate.validate().await.unwrap();
        let uploader = FixedUploader(RemotePath::new("bucket", "results/a.json"));

        let sink = ResultSink::new(&uploader, &gate, Some("bucket"), true);
        let delivery = sink.store(&artifact, &[]).await.unwrap();

        assert_eq!(fs::read_to_string(&artifact.path).unwrap(), "engine output");
        assert_eq!(
            delivery,
            Delivery::Uploaded {
                remote: RemotePath::new("bucket", "results/a.json"),
                report: ReportStatus::Reported,
            }
        );
        assert_eq!(backend.reports.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_remote_path_counts_as_failed_upload() {
        let dir = TempDir::new().unwrap();
        let artifact = Artifact::allocate(dir.path(), OutputFormat::Json);

        let backend = CountingBackend::default();
        let mut gate = CredentialGate::new(&backend, "http://backend", "token");
        gate.validate().await.unwrap();
        let uploader = FixedUploader(RemotePath::new("bucket", ""));

        let sink = ResultSink::new(&uploader, &gate, Some("bucket"), true);
        let delivery = sink.store(&artifact, &[]).await.unwrap();

        assert!(matches!(delivery, Delivery::UploadFailed(_)));
        assert!(artifact.exists());
        assert_eq!(backend.reports.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_skipped_report_never_reaches_backend() {
        let dir = TempDir::new().unwrap();
        let artifact = Artifact::allocate(dir.path(), OutputFormat::Yaml);

        let backend = CountingBackend::default();
        let mut gate = CredentialGate::new(&backend, "http://backend", "token");
        gate.validate().await.unwrap();
        let uploader = FixedUploader(RemotePath::new("bucket", "results/a.yaml"));

        let sink = ResultSink::new(&uploader, &gate, Some("bucket"), false);
        let delivery = sink.deliver(&artifact).await;

        assert!(matches!(
            delivery,
            Delivery::Uploaded {
                report: ReportStatus::Skipped,
                ..
            }
        ));
        assert_eq!(backend.reports.load(Ordering::SeqCst), 0);
    }
}
