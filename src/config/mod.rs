mod types;

pub use types::*;

use crate::error::{BackupError, Result};
use ini::{Ini, ParseOption, Properties};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub fn load_from(path: &Path) -> Result<BackupConfig> {
    if !path.is_file() {
        return Err(BackupError::ConfigNotFound(path.to_path_buf()));
    }

    info!("Loading configuration from {:?}", path);
    // Backslashes are literal: `host\instance` names and Windows paths.
    let options = ParseOption {
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_file_opt(path, options)?;
    parse(&ini)
}

fn parse(ini: &Ini) -> Result<BackupConfig> {
    let sqlserver = SqlServerConfig {
        server: required(ini, "sqlserver", "server")?,
        database: required(ini, "sqlserver", "database")?,
        temp_dir: PathBuf::from(required(ini, "sqlserver", "temp_dir")?),
        username: optional(ini, "sqlserver", "username"),
        password: optional(ini, "sqlserver", "password"),
        trust_server_certificate: match optional(ini, "sqlserver", "trust_server_certificate") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                BackupError::Config(format!(
                    "sqlserver.trust_server_certificate must be true or false, got '{}'",
                    value
                ))
            })?,
            None => false,
        },
    };

    let raw_retention = required(ini, "general", "retention_policy")?;
    let retention_policy = raw_retention
        .parse::<u32>()
        .ok()
        .filter(|days| *days <= MAX_RETENTION_DAYS)
        .ok_or_else(|| {
            BackupError::Config(format!(
                "general.retention_policy must be a whole number of days between 0 and {}, got '{}'",
                MAX_RETENTION_DAYS, raw_retention
            ))
        })?;

    let aws = AwsConfig {
        bucket: required(ini, "aws", "bucket")?,
        access_key: required(ini, "aws", "access_key")?,
        secret_key: required(ini, "aws", "secret_key")?,
        region: optional(ini, "aws", "region").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        endpoint: optional(ini, "aws", "endpoint"),
    };

    debug!(
        "Configured {}/{} -> s3://{} ({}), retention {} day(s)",
        sqlserver.server, sqlserver.database, aws.bucket, aws.region, retention_policy
    );

    Ok(BackupConfig {
        sqlserver,
        general: GeneralConfig { retention_policy },
        aws,
    })
}

fn section<'a>(ini: &'a Ini, name: &str) -> Option<&'a Properties> {
    ini.section(Some(name))
}

fn optional(ini: &Ini, section_name: &str, key: &str) -> Option<String> {
    section(ini, section_name)
        .and_then(|props| props.get(key))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required(ini: &Ini, section_name: &'static str, key: &'static str) -> Result<String> {
    optional(ini, section_name, key).ok_or(BackupError::MissingKey {
        section: section_name,
        key,
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
