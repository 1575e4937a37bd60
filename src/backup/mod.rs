pub mod checksum;
pub mod job;
pub mod request;
pub mod retention;

pub use job::{execute_backup, BackupResult};
pub use request::BackupKind;
