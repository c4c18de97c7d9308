use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::sync::OnceCell;
use tracing::info;
use uuid::Uuid;

use crate::error::DeliveryError;
use crate::models::RemotePath;

/// Copies a local file into object storage.
#[async_trait]
pub trait Uploader: Send + Sync {
    /// When `object_name` is `None` the uploader picks a unique key.
    async fn upload(
        &self,
        local: &Path,
        bucket: &str,
        object_name: Option<&str>,
    ) -> Result<RemotePath, DeliveryError>;
}

/// `results/<64 hex chars>.<ext>`, derived from a fresh random uuid.
pub fn generate_object_name(extension: &str) -> String {
    let digest = Sha256::digest(Uuid::new_v4().as_bytes());
    format!("results/{:x}.{}", digest, extension)
}

/// S3 uploader using the default AWS credential chain. The client is built on
/// first use so runs that never upload never touch the AWS environment.
pub struct S3Uploader {
    region: Option<String>,
    client: OnceCell<S3Client>,
}

impl S3Uploader {
    pub fn new(region: Option<String>) -> Self {
        Self {
            region,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &S3Client {
        self.client
            .get_or_init(|| async {
                let mut loader = aws_config::defaults(BehaviorVersion::latest());
                if let Some(region) = &self.region {
                    loader = loader.region(Region::new(region.clone()));
                }
                S3Client::new(&loader.load().await)
            })
            .await
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    async fn upload(
        &self,
        local: &Path,
        bucket: &str,
        object_name: Option<&str>,
    ) -> Result<RemotePath, DeliveryError> {
        let extension = local.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let key = object_name
            .map(str::to_string)
            .unwrap_or_else(|| generate_object_name(extension));

        let failed = |reason: String| DeliveryError::Upload {
            bucket: bucket.to_string(),
            reason: format!("object {}: {}", key, reason),
        };

        info!(file = %local.display(), %bucket, %key, "uploading result file");

        let body = ByteStream::from_path(local)
            .await
            .map_err(|e| failed(e.to_string()))?;

        self.client()
            .await
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(body)
            .send()
            .await
            .map_err(|e| failed(aws_sdk_s3::error::DisplayErrorContext(&e).to_string()))?;

        let remote = RemotePath::new(bucket, key);
        info!(%remote, "upload complete");
        Ok(remote)
    }
}
