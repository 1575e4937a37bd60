use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "us-east-1";
/// Upper bound for `general.retention_policy` (100 years).
pub const MAX_RETENTION_DAYS: u32 = 36_500;

/// `[sqlserver]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlServerConfig {
    /// `host`, `host,port` or `host\instance`.
    pub server: String,
    pub database: String,
    pub temp_dir: PathBuf,
    pub username: Option<String>,
    pub password: Option<String>,
    pub trust_server_certificate: bool,
}

/// `[general]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralConfig {
    /// Days a backup is kept in the bucket.
    pub retention_policy: u32,
}

/// `[aws]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct AwsConfig {
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackupConfig {
    pub sqlserver: SqlServerConfig,
    pub general: GeneralConfig,
    pub aws: AwsConfig,
}
