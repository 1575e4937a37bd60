mod driver;
mod mssql;

pub use driver::{DatabaseDriver, RecoveryModel};
use mssql::MssqlDriver;

use crate::config::SqlServerConfig;
use crate::error::Result;

/// Builds an unconnected driver; no network traffic happens until `connect`.
pub fn create_driver(config: &SqlServerConfig) -> Result<Box<dyn DatabaseDriver>> {
    let driver = MssqlDriver::new(config)?;
    Ok(Box::new(driver))
}
