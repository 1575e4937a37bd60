use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum BackupError {
    InvalidArguments,
    InvalidBackupKind(String),
    ConfigNotFound(PathBuf),
    Config(String),
    MissingKey { section: &'static str, key: &'static str },
    DatabaseNotFound(String),
    RecoveryModel { database: String, model: String },
    Database(String),
    Upload(String),
    Storage(String),
    Io(io::Error),
}

impl BackupError {
    /// Result code reported as the process exit status.
    pub fn code(&self) -> i32 {
        match self {
            BackupError::InvalidArguments => -1,
            BackupError::InvalidBackupKind(_) => -2,
            BackupError::ConfigNotFound(_) => -3,
            BackupError::RecoveryModel { .. } => -4,
            BackupError::Config(_) | BackupError::MissingKey { .. } => -5,
            BackupError::DatabaseNotFound(_) => -6,
            BackupError::Database(_) => -7,
            BackupError::Upload(_) => -8,
            BackupError::Storage(_) => -9,
            BackupError::Io(_) => -10,
        }
    }
}

impl fmt::Display for BackupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupError::InvalidArguments => write!(
                f,
                "You must specify a backup type and a configuration file, in that order."
            ),
            BackupError::InvalidBackupKind(kind) => write!(
                f,
                "You must specify either full or incremental (got '{}').",
                kind
            ),
            BackupError::ConfigNotFound(path) => write!(
                f,
                "You must specify a configuration file that exists ({}).",
                path.display()
            ),
            BackupError::Config(msg) => write!(f, "Configuration error: {}", msg),
            BackupError::MissingKey { section, key } => {
                write!(f, "Configuration error: missing key '{}.{}'", section, key)
            }
            BackupError::DatabaseNotFound(name) => {
                write!(f, "Database '{}' was not found on the server", name)
            }
            BackupError::RecoveryModel { database, model } => write!(
                f,
                "{} must be in full recovery mode to backup logs. (current: {})",
                database, model
            ),
            BackupError::Database(msg) => write!(f, "Database error: {}", msg),
            BackupError::Upload(msg) => write!(f, "Upload error: {}", msg),
            BackupError::Storage(msg) => write!(f, "Storage error: {}", msg),
            BackupError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for BackupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackupError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BackupError {
    fn from(err: io::Error) -> Self {
        BackupError::Io(err)
    }
}

impl From<tiberius::error::Error> for BackupError {
    fn from(err: tiberius::error::Error) -> Self {
        BackupError::Database(err.to_string())
    }
}

impl From<ini::Error> for BackupError {
    fn from(err: ini::Error) -> Self {
        BackupError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_codes() {
        assert_eq!(BackupError::InvalidArguments.code(), -1);
        assert_eq!(BackupError::InvalidBackupKind("diff".into()).code(), -2);
        assert_eq!(BackupError::ConfigNotFound(PathBuf::from("x.ini")).code(), -3);
        assert_eq!(
            BackupError::RecoveryModel {
                database: "db1".into(),
                model: "SIMPLE".into()
            }
            .code(),
            -4
        );
    }

    #[test]
    fn test_infrastructure_codes_are_distinct() {
        let codes = [
            BackupError::Config("bad".into()).code(),
            BackupError::DatabaseNotFound("db".into()).code(),
            BackupError::Database("down".into()).code(),
            BackupError::Upload("denied".into()).code(),
            BackupError::Storage("denied".into()).code(),
            BackupError::Io(io::Error::new(io::ErrorKind::Other, "disk")).code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            assert!(*a < -4);
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_recovery_model_message() {
        let err = BackupError::RecoveryModel {
            database: "sales".into(),
            model: "SIMPLE".into(),
        };
        assert_eq!(
            err.to_string(),
            "sales must be in full recovery mode to backup logs. (current: SIMPLE)"
        );
    }
}
