use crate::error::{BackupError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ARTIFACT_EXTENSION: &str = "bak";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// Full database backup.
    Full,
    /// Transaction log backup.
    Incremental,
}

impl BackupKind {
    /// Label embedded in artifact names.
    pub fn label(&self) -> &'static str {
        match self {
            BackupKind::Full => "full",
            BackupKind::Incremental => "incr",
        }
    }
}

impl FromStr for BackupKind {
    type Err = BackupError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(BackupKind::Full),
            "incremental" => Ok(BackupKind::Incremental),
            other => Err(BackupError::InvalidBackupKind(other.to_string())),
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupKind::Full => write!(f, "full"),
            BackupKind::Incremental => write!(f, "incremental"),
        }
    }
}

/// `<server>_<database>_<label>_<yyyy_MM_dd_HH_mm_ss>.bak`
pub fn artifact_name(server: &str, database: &str, kind: BackupKind, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}_{}.{}",
        server,
        database,
        kind.label(),
        at.format("%Y_%m_%d_%H_%M_%S"),
        ARTIFACT_EXTENSION
    )
}

#[derive(Debug, Clone)]
pub struct BackupRequest {
    pub kind: BackupKind,
    pub name: String,
    pub path: PathBuf,
}

impl BackupRequest {
    pub fn new(
        kind: BackupKind,
        server: &str,
        database: &str,
        temp_dir: &Path,
        at: DateTime<Utc>,
    ) -> Self {
        let name = artifact_name(server, database, kind, at);
        let path = temp_dir.join(&name);
        Self { kind, name, path }
    }
}
