//! Local-directory backend
//!
//! Synchronizes from a directory on the local filesystem: every regular
//! file under the root is read and fed to the parser sink. Files are
//! processed in name order so the change list is deterministic.
//!
//! The cancellation token is checked between files; a cancelled run
//! returns the resources processed so far.

use std::path::PathBuf;

use async_trait::async_trait;
use shared::sync::ResourceId;
use tokio_util::sync::CancellationToken;

use super::{ParserSink, Synchronizer};
use crate::utils::{AppError, AppResult};

pub struct LocalDirSynchronizer {
    root: PathBuf,
}

impl LocalDirSynchronizer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    async fn list_files(&self) -> AppResult<Vec<(String, PathBuf)>> {
        let mut entries = tokio::fs::read_dir(&self.root).await.map_err(|e| {
            AppError::backend(format!("cannot read sync root {}: {e}", self.root.display()))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AppError::backend(format!("directory walk failed: {e}")))?
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            // dotfiles are bookkeeping, not content
            if name.starts_with('.') {
                continue;
            }
            files.push((name.to_string(), path));
        }

        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }
}

#[async_trait]
impl Synchronizer for LocalDirSynchronizer {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn run(
        &mut self,
        sink: &dyn ParserSink,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<ResourceId>> {
        let files = self.list_files().await?;
        tracing::debug!(count = files.len(), root = %self.root.display(), "Local sync pass");

        let mut changed: Vec<ResourceId> = Vec::new();
        for (name, path) in files {
            // cooperative cancellation checkpoint
            if cancel.is_cancelled() {
                tracing::info!(
                    processed = changed.len(),
                    "Local sync cancelled, returning partial result"
                );
                return Ok(changed);
            }

            let content = match tokio::fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "Skipping unreadable file");
                    continue;
                }
            };

            sink.ingest(&name, &content).await?;
            changed.push(name);
        }

        Ok(changed)
    }

    async fn close(&mut self) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSink {
        seen: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ParserSink for RecordingSink {
        async fn ingest(&self, resource: &str, _content: &str) -> AppResult<()> {
            self.seen.lock().unwrap().push(resource.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn syncs_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.org"), "* B").unwrap();
        std::fs::write(dir.path().join("a.org"), "* A").unwrap();
        std::fs::write(dir.path().join(".checksums"), "x").unwrap();

        let mut backend = LocalDirSynchronizer::new(dir.path().to_path_buf());
        let sink = RecordingSink::new();
        let changed = backend
            .run(&sink, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(changed, vec!["a.org", "b.org"]);
        assert_eq!(*sink.seen.lock().unwrap(), vec!["a.org", "b.org"]);
        backend.close().await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_run_returns_partial_result() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.org"), "* A").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut backend = LocalDirSynchronizer::new(dir.path().to_path_buf());
        let changed = backend.run(&RecordingSink::new(), &cancel).await.unwrap();
        assert!(changed.is_empty());
        // close must be safe after cancellation
        backend.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_root_is_a_backend_error() {
        let mut backend = LocalDirSynchronizer::new(PathBuf::from("/nonexistent/sync-root"));
        let err = backend
            .run(&RecordingSink::new(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Backend(_)));
    }
}
