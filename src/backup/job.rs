use crate::backup::checksum::calculate_sha256;
use crate::backup::request::{BackupKind, BackupRequest};
use crate::backup::retention::{self, PruneReport};
use crate::config::BackupConfig;
use crate::database::{DatabaseDriver, RecoveryModel};
use crate::error::{BackupError, Result};
use crate::upload::{BackupStore, UploadMetadata};
use chrono::{DateTime, Utc};
use std::fs;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug)]
pub struct BackupResult {
    /// Artifact name, also the object key in the bucket.
    pub name: String,
    pub file_size: u64,
    pub sha256: Option<String>,
    pub duration_secs: u64,
    pub prune: PruneReport,
}

/// Backup, upload, local cleanup and retention, in that order. `now` stamps
/// the artifact name and anchors the retention cutoff.
pub async fn execute_backup(
    config: &BackupConfig,
    kind: BackupKind,
    driver: &mut dyn DatabaseDriver,
    store: &dyn BackupStore,
    now: DateTime<Utc>,
) -> Result<BackupResult> {
    let start = Instant::now();
    let sql = &config.sqlserver;
    let request = BackupRequest::new(kind, &sql.server, &sql.database, &sql.temp_dir, now);

    info!(
        "Starting {} backup of {}/{} as {}",
        kind, sql.server, sql.database, request.name
    );

    if !sql.temp_dir.exists() {
        info!("Creating temp directory: {:?}", sql.temp_dir);
    }
    fs::create_dir_all(&sql.temp_dir)?;

    driver.connect().await?;
    let outcome = create_backup(driver, &sql.database, &request).await;
    if let Err(e) = driver.disconnect().await {
        warn!("Failed to disconnect from {}: {}", driver.engine_name(), e);
    }
    outcome?;

    let file_size = fs::metadata(&request.path)?.len();
    let sha256 = match calculate_sha256(&request.path) {
        Ok(hash) => Some(hash),
        Err(e) => {
            warn!("Could not hash {}: {}", request.path.display(), e);
            None
        }
    };
    info!(
        "Backup written: {} ({:.2} MB, sha256 {})",
        request.path.display(),
        file_size as f64 / 1024.0 / 1024.0,
        sha256.as_deref().unwrap_or("n/a")
    );

    let metadata = UploadMetadata {
        key: request.name.clone(),
        sha256: sha256.clone(),
    };
    store.put_object(&metadata, &request.path).await?;

    fs::remove_file(&request.path)?;
    info!("Removed local copy {}", request.path.display());

    let prune = retention::prune(store, config.general.retention_policy, now, &request.name).await?;

    let duration_secs = start.elapsed().as_secs();
    info!("Backup {} completed in {} sec", request.name, duration_secs);

    Ok(BackupResult {
        name: request.name,
        file_size,
        sha256,
        duration_secs,
        prune,
    })
}

async fn create_backup(
    driver: &mut dyn DatabaseDriver,
    database: &str,
    request: &BackupRequest,
) -> Result<()> {
    let model = driver
        .recovery_model(database)
        .await?
        .ok_or_else(|| BackupError::DatabaseNotFound(database.to_string()))?;

    if request.kind == BackupKind::Incremental && model != RecoveryModel::Full {
        return Err(BackupError::RecoveryModel {
            database: database.to_string(),
            model: model.to_string(),
        });
    }

    driver.backup(database, request.kind, &request.path).await
}
