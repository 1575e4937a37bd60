use crate::backup::BackupKind;
use crate::error::{BackupError, Result};
use std::path::PathBuf;

pub const USAGE: &str = "usage: mssql-s3-backup <full|incremental> <config-file>";

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub kind: BackupKind,
    pub config_path: PathBuf,
}

/// Positional arguments, program name excluded. Extra arguments are ignored.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let (kind, config_path) = match args {
        [kind, config_path, ..] => (kind, config_path),
        _ => return Err(BackupError::InvalidArguments),
    };

    let kind = kind.parse::<BackupKind>()?;
    let config_path = PathBuf::from(config_path);
    if !config_path.is_file() {
        return Err(BackupError::ConfigNotFound(config_path));
    }

    Ok(Invocation { kind, config_path })
}
