mod args;

pub use args::{parse_args, USAGE};

use crate::backup::{execute_backup, BackupResult};
use crate::config;
use crate::database::create_driver;
use crate::error::Result;
use crate::upload::create_store;
use chrono::Utc;
use tracing::info;

pub async fn run(args: &[String]) -> Result<BackupResult> {
    let invocation = parse_args(args)?;
    let config = config::load_from(&invocation.config_path)?;

    let mut driver = create_driver(&config.sqlserver)?;
    let store = create_store(&config.aws).await;
    info!(
        "Using {} -> s3://{}",
        driver.engine_name(),
        store.bucket()
    );

    execute_backup(
        &config,
        invocation.kind,
        driver.as_mut(),
        store.as_ref(),
        Utc::now(),
    )
    .await
}
