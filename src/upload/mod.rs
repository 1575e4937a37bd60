mod s3;
mod uploader;

use s3::S3Store;
pub use uploader::{BackupStore, RemoteObject, UploadMetadata};

use crate::config::AwsConfig;

pub async fn create_store(config: &AwsConfig) -> Box<dyn BackupStore> {
    Box::new(S3Store::new(config).await)
}
