use super::uploader::{BackupStore, RemoteObject, UploadMetadata};
use crate::config::AwsConfig;
use crate::error::{BackupError, Result};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::DateTime;
use std::path::Path;
use tracing::{debug, info};

const CREDENTIALS_PROVIDER: &str = "mssql-s3-backup";

pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(config: &AwsConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            CREDENTIALS_PROVIDER,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(uses_path_style(config))
            .build();

        debug!(
            "S3 client for bucket {} in {} (path style: {})",
            config.bucket,
            config.region,
            uses_path_style(config)
        );
        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

/// S3-compatible endpoints (MinIO and the like) address buckets by path.
fn uses_path_style(config: &AwsConfig) -> bool {
    config.endpoint.is_some()
}

#[async_trait]
impl BackupStore for S3Store {
    async fn put_object(&self, metadata: &UploadMetadata, file_path: &Path) -> Result<()> {
        info!(
            "Uploading {} to s3://{}/{}",
            file_path.display(),
            self.bucket,
            metadata.key
        );
        let body = ByteStream::from_path(file_path).await.map_err(|e| {
            BackupError::Upload(format!("failed to read {}: {}", file_path.display(), e))
        })?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&metadata.key)
            .body(body);
        if let Some(hash) = &metadata.sha256 {
            request = request.metadata("sha256", hash);
        }

        request.send().await.map_err(|e| {
            BackupError::Upload(format!(
                "failed to upload {}: {}",
                metadata.key,
                DisplayErrorContext(e)
            ))
        })?;

        info!("Uploaded {}", metadata.key);
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<RemoteObject>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(&self.bucket);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                BackupError::Storage(format!(
                    "failed to list bucket {}: {}",
                    self.bucket,
                    DisplayErrorContext(e)
                ))
            })?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    objects.push(RemoteObject {
                        key: key.to_string(),
                        last_modified: object
                            .last_modified()
                            .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
                    });
                }
            }

            continuation_token = response.next_continuation_token().map(str::to_string);
            if response.is_truncated() != Some(true) || continuation_token.is_none() {
                break;
            }
        }

        debug!("Listed {} object(s) in {}", objects.len(), self.bucket);
        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                BackupError::Storage(format!(
                    "failed to delete {}: {}",
                    key,
                    DisplayErrorContext(e)
                ))
            })?;
        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
