use crate::backup::BackupKind;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryModel {
    Full,
    BulkLogged,
    Simple,
    Other(String),
}

impl RecoveryModel {
    pub fn from_desc(desc: &str) -> Self {
        match desc.to_ascii_uppercase().as_str() {
            "FULL" => RecoveryModel::Full,
            "BULK_LOGGED" => RecoveryModel::BulkLogged,
            "SIMPLE" => RecoveryModel::Simple,
            other => RecoveryModel::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RecoveryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryModel::Full => write!(f, "FULL"),
            RecoveryModel::BulkLogged => write!(f, "BULK_LOGGED"),
            RecoveryModel::Simple => write!(f, "SIMPLE"),
            RecoveryModel::Other(desc) => write!(f, "{}", desc),
        }
    }
}

#[async_trait]
pub trait DatabaseDriver: Send {
    async fn connect(&mut self) -> Result<()>;
    /// `None` when the database does not exist on the server.
    async fn recovery_model(&mut self, database: &str) -> Result<Option<RecoveryModel>>;
    async fn backup(&mut self, database: &str, kind: BackupKind, target: &Path) -> Result<()>;
    async fn disconnect(&mut self) -> Result<()>;
    fn engine_name(&self) -> &'static str;
}
