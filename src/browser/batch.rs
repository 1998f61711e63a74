//! Batch mutations against the remote directory.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{FsError, Result};
use crate::fs::path::with_trailing_slash;
use crate::fs::{RemoteDirectory, PARENT_KEY};

/// A single failed item of a batch.
#[derive(Debug)]
pub struct ItemFailure {
    pub key: String,
    pub error: FsError,
}

/// Result of a batch: successes and failures, both in submission order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What a rename actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Old and new path were equal; nothing was sent.
    Unchanged,
    Renamed { old_path: String, new_path: String },
}

/// Runs mutations for one session.
#[derive(Clone)]
pub struct BatchOperationExecutor {
    remote: Arc<dyn RemoteDirectory>,
    session_id: String,
    concurrency: usize,
}

impl BatchOperationExecutor {
    pub fn new(remote: Arc<dyn RemoteDirectory>, session_id: impl Into<String>) -> Self {
        Self {
            remote,
            session_id: session_id.into(),
            concurrency: 1,
        }
    }

    /// Set how many removals may be in flight at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Remove every key except the parent sentinel.
    ///
    /// A failing item never stops its siblings. With a concurrency of one the
    /// removals run strictly in order.
    pub async fn delete(&self, keys: &[String]) -> BatchReport {
        let targets: Vec<String> = keys
            .iter()
            .filter(|k| k.as_str() != PARENT_KEY)
            .cloned()
            .collect();
        debug!(
            session = %self.session_id,
            count = targets.len(),
            concurrency = self.concurrency,
            "batch delete"
        );

        let results: Vec<(String, Result<()>)> = stream::iter(targets)
            .map(|key| {
                let remote = Arc::clone(&self.remote);
                let session_id = self.session_id.clone();
                async move {
                    let result = remote.remove(session_id, key.clone()).await;
                    (key, result)
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (key, result) in results {
            match result {
                Ok(()) => report.succeeded.push(key),
                Err(error) => {
                    warn!(session = %self.session_id, key = %key, error = %error, "delete failed");
                    report.failures.push(ItemFailure { key, error });
                }
            }
        }
        if report.is_clean() {
            info!(session = %self.session_id, deleted = report.succeeded.len(), "batch delete finished");
        } else {
            warn!(
                session = %self.session_id,
                attempted = report.attempted(),
                failed = report.failures.len(),
                "batch delete finished with failures"
            );
        }
        report
    }

    /// Rename `old_path` to `new_path`. Equal paths succeed without a request.
    pub async fn rename(&self, old_path: &str, new_path: &str) -> Result<RenameOutcome> {
        if old_path == new_path {
            return Ok(RenameOutcome::Unchanged);
        }
        self.remote
            .rename(
                self.session_id.clone(),
                old_path.to_string(),
                new_path.to_string(),
            )
            .await?;
        info!(session = %self.session_id, from = old_path, to = new_path, "renamed");
        Ok(RenameOutcome::Renamed {
            old_path: old_path.to_string(),
            new_path: new_path.to_string(),
        })
    }

    /// Create `name` inside `parent`.
    pub async fn mkdir(&self, parent: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FsError::Validation("Folder name is required".to_string()));
        }
        self.remote
            .mkdir(self.session_id.clone(), parent.to_string(), name.to_string())
            .await?;
        info!(session = %self.session_id, parent = parent, name = name, "directory created");
        Ok(())
    }
}

/// Path an entry of `current_dir` moves to when renamed to `new_name`.
pub fn rename_target(current_dir: &str, new_name: &str) -> String {
    format!("{}{}", with_trailing_slash(current_dir), new_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockRemoteDirectory;
    use futures::FutureExt;
    use std::sync::Mutex;

    fn keys(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rename_target() {
        assert_eq!(rename_target("/", "b"), "/b");
        assert_eq!(rename_target("/a", "b"), "/a/b");
    }

    #[tokio::test]
    async fn test_delete_isolates_failures() {
        let mut mock = MockRemoteDirectory::new();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&calls);
        mock.expect_remove().times(3).returning(move |_, path| {
            seen.lock().unwrap().push(path.clone());
            async move {
                if path == "/a" {
                    Err(FsError::RemoteError {
                        code: 0,
                        message: "permission denied".to_string(),
                    })
                } else {
                    Ok(())
                }
            }
            .boxed()
        });

        let executor = BatchOperationExecutor::new(Arc::new(mock), "s1");
        let report = executor.delete(&keys(&["/a", "..", "/b", "/c"])).await;

        assert_eq!(*calls.lock().unwrap(), keys(&["/a", "/b", "/c"]));
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.succeeded, keys(&["/b", "/c"]));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, "/a");
        assert_eq!(report.failures[0].error.to_string(), "permission denied");
    }

    #[tokio::test]
    async fn test_concurrent_delete_reports_in_order() {
        let mut mock = MockRemoteDirectory::new();
        mock.expect_remove().times(4).returning(|_, path| {
            async move {
                if path == "/1" {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                }
                if path == "/1" || path == "/3" {
                    Err(FsError::Timeout)
                } else {
                    Ok(())
                }
            }
            .boxed()
        });

        let executor = BatchOperationExecutor::new(Arc::new(mock), "s1").with_concurrency(4);
        let report = executor.delete(&keys(&["/1", "/2", "/3", "/4"])).await;

        let failed: Vec<&str> = report.failures.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(failed, ["/1", "/3"]);
        assert_eq!(report.succeeded, keys(&["/2", "/4"]));
    }

    #[tokio::test]
    async fn test_rename_same_path_sends_nothing() {
        let mut mock = MockRemoteDirectory::new();
        mock.expect_rename().never();

        let executor = BatchOperationExecutor::new(Arc::new(mock), "s1");
        let outcome = executor.rename("/a/x", "/a/x").await.unwrap();
        assert_eq!(outcome, RenameOutcome::Unchanged);
    }

    #[tokio::test]
    async fn test_rename_forwards_paths() {
        let mut mock = MockRemoteDirectory::new();
        mock.expect_rename()
            .withf(|sid, old, new| sid == "s1" && old == "/a/x" && new == "/a/y")
            .times(1)
            .returning(|_, _, _| async { Ok(()) }.boxed());

        let executor = BatchOperationExecutor::new(Arc::new(mock), "s1");
        let outcome = executor.rename("/a/x", "/a/y").await.unwrap();
        assert_eq!(
            outcome,
            RenameOutcome::Renamed {
                old_path: "/a/x".to_string(),
                new_path: "/a/y".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_mkdir_requires_name() {
        let mut mock = MockRemoteDirectory::new();
        mock.expect_mkdir().never();

        let executor = BatchOperationExecutor::new(Arc::new(mock), "s1");
        let err = executor.mkdir("/a", "  ").await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_zero_concurrency_is_sequential() {
        let executor =
            BatchOperationExecutor::new(Arc::new(MockRemoteDirectory::new()), "s1").with_concurrency(0);
        assert_eq!(executor.concurrency(), 1);
    }
}
