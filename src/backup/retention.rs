use crate::error::{BackupError, Result};
use crate::upload::{BackupStore, RemoteObject};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

pub fn cutoff(now: DateTime<Utc>, retention_days: u32) -> Result<DateTime<Utc>> {
    Duration::try_days(i64::from(retention_days))
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| {
            BackupError::Config(format!(
                "retention policy of {} day(s) is out of range",
                retention_days
            ))
        })
}

/// Objects strictly older than `cutoff`. Objects without a timestamp are kept.
pub fn expired<'a>(objects: &'a [RemoteObject], cutoff: DateTime<Utc>) -> Vec<&'a RemoteObject> {
    objects
        .iter()
        .filter(|object| matches!(object.last_modified, Some(modified) if modified < cutoff))
        .collect()
}

#[derive(Debug, Default, PartialEq)]
pub struct PruneReport {
    pub listed: usize,
    pub deleted: Vec<String>,
}

/// Deletes expired objects, never touching `keep`. The first failed delete
/// aborts the pass.
pub async fn prune(
    store: &dyn BackupStore,
    retention_days: u32,
    now: DateTime<Utc>,
    keep: &str,
) -> Result<PruneReport> {
    let cutoff = cutoff(now, retention_days)?;
    info!(
        "Pruning objects in {} older than {}",
        store.bucket(),
        cutoff.to_rfc3339()
    );

    let objects = store.list_objects().await?;
    let mut report = PruneReport {
        listed: objects.len(),
        deleted: Vec::new(),
    };

    for object in expired(&objects, cutoff) {
        if object.key == keep {
            debug!("Skipping {}, it is the current upload", object.key);
            continue;
        }
        store.delete_object(&object.key).await?;
        report.deleted.push(object.key.clone());
    }

    info!(
        "Retention pass removed {} of {} object(s)",
        report.deleted.len(),
        report.listed
    );
    Ok(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::upload::UploadMetadata;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// In-memory bucket recording every call.
    #[derive(Default)]
    pub struct FakeStore {
        pub objects: Mutex<Vec<RemoteObject>>,
        pub uploads: Mutex<Vec<(String, PathBuf, bool, Option<String>)>>,
        pub deletes: Mutex<Vec<String>>,
        pub fail_delete_of: Option<String>,
        pub fail_upload: bool,
    }

    impl FakeStore {
        pub fn with_objects(objects: Vec<RemoteObject>) -> Self {
            Self {
                objects: Mutex::new(objects),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl BackupStore for FakeStore {
        async fn put_object(&self, metadata: &UploadMetadata, file_path: &Path) -> Result<()> {
            if self.fail_upload {
                return Err(BackupError::Upload("access denied".to_string()));
            }
            self.uploads.lock().unwrap().push((
                metadata.key.clone(),
                file_path.to_path_buf(),
                file_path.exists(),
                metadata.sha256.clone(),
            ));
            self.objects.lock().unwrap().push(RemoteObject {
                key: metadata.key.clone(),
                last_modified: Some(Utc::now()),
            });
            Ok(())
        }

        async fn list_objects(&self) -> Result<Vec<RemoteObject>> {
            Ok(self.objects.lock().unwrap().clone())
        }

        async fn delete_object(&self, key: &str) -> Result<()> {
            if self.fail_delete_of.as_deref() == Some(key) {
                return Err(BackupError::Storage(format!("cannot delete {}", key)));
            }
            self.deletes.lock().unwrap().push(key.to_string());
            self.objects.lock().unwrap().retain(|o| o.key != key);
            Ok(())
        }

        fn bucket(&self) -> &str {
            "test-bucket"
        }
    }

    pub fn object(key: &str, last_modified: DateTime<Utc>) -> RemoteObject {
        RemoteObject {
            key: key.to_string(),
            last_modified: Some(last_modified),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_cutoff() {
        assert_eq!(
            cutoff(now(), 7).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 8, 10, 30, 0).unwrap()
        );
        assert_eq!(cutoff(now(), 0).unwrap(), now());
    }

    #[test]
    fn test_cutoff_out_of_range() {
        let err = cutoff(now(), u32::MAX).unwrap_err();
        assert_eq!(err.code(), -5);
    }

    #[tokio::test]
    async fn test_prune_rejects_huge_retention_without_listing() {
        let store = FakeStore::with_objects(vec![object("old.bak", now() - Duration::days(400))]);

        let err = prune(&store, 100_000_000, now(), "x").await.unwrap_err();

        assert!(matches!(err, BackupError::Config(_)));
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[test]
    fn test_expired_is_strictly_older() {
        let cut = cutoff(now(), 7).unwrap();
        let objects = vec![
            object("old.bak", cut - Duration::seconds(1)),
            object("edge.bak", cut),
            object("new.bak", cut + Duration::days(1)),
            RemoteObject {
                key: "undated.bak".to_string(),
                last_modified: None,
            },
        ];

        let keys: Vec<&str> = expired(&objects, cut)
            .into_iter()
            .map(|o| o.key.as_str())
            .collect();
        assert_eq!(keys, vec!["old.bak"]);
    }

    #[tokio::test]
    async fn test_prune_deletes_only_stale_objects() {
        let store = FakeStore::with_objects(vec![
            object("t1.bak", now() - Duration::days(10)),
            object("t2.bak", now() - Duration::days(2)),
        ]);

        let report = prune(&store, 7, now(), "current.bak").await.unwrap();

        assert_eq!(report.listed, 2);
        assert_eq!(report.deleted, vec!["t1.bak".to_string()]);
        let remaining: Vec<String> = store
            .objects
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.key.clone())
            .collect();
        assert_eq!(remaining, vec!["t2.bak".to_string()]);
    }

    #[tokio::test]
    async fn test_prune_keeps_current_upload() {
        let store = FakeStore::with_objects(vec![object("current.bak", now() - Duration::days(1))]);

        let report = prune(&store, 0, now(), "current.bak").await.unwrap();

        assert!(report.deleted.is_empty());
        assert!(store.deletes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prune_aborts_on_first_failure() {
        let mut store = FakeStore::with_objects(vec![
            object("a.bak", now() - Duration::days(30)),
            object("b.bak", now() - Duration::days(20)),
            object("c.bak", now() - Duration::days(10)),
        ]);
        store.fail_delete_of = Some("b.bak".to_string());

        let err = prune(&store, 7, now(), "current.bak").await.unwrap_err();

        assert_eq!(err.code(), -9);
        assert_eq!(*store.deletes.lock().unwrap(), vec!["a.bak".to_string()]);
        assert_eq!(store.objects.lock().unwrap().len(), 2);
    }
}
