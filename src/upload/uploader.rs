use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteObject {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub key: String,
    pub sha256: Option<String>,
}

#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn put_object(&self, metadata: &UploadMetadata, file_path: &Path) -> Result<()>;
    /// Every object in the bucket.
    async fn list_objects(&self) -> Result<Vec<RemoteObject>>;
    async fn delete_object(&self, key: &str) -> Result<()>;
    fn bucket(&self) -> &str;
}
