//! Synchronizer backends
//!
//! A backend performs one synchronization pass over its transport and
//! reports the changed resources. The supervisor treats backends as
//! opaque: it resolves one per run from the current settings, invokes
//! `run`, and always invokes `close` afterwards.
//!
//! Bundled backends: [`NullSynchronizer`] (no-op) and
//! [`LocalDirSynchronizer`] (local filesystem source). The network
//! kinds (`webdav`, `cloud`, `scp`) are resolved through a
//! caller-supplied [`SynchronizerFactory`]; transport implementations
//! live outside this crate.

mod local;
mod null;

pub use local::LocalDirSynchronizer;
pub use null::NullSynchronizer;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use shared::sync::{BackendKind, ResourceId, SyncSettings};
use tokio_util::sync::CancellationToken;

use crate::utils::{AppError, AppResult};

/// One synchronization transport
///
/// `run` may block for the duration of the transfer; it must poll the
/// cancellation token at safe checkpoints (between files / chunks) and
/// return the partial change list when cancelled. `close` must be safe
/// to call after a cancellation signal and is called on both success
/// and error paths.
#[async_trait]
pub trait Synchronizer: Send {
    /// Backend name, for logs
    fn name(&self) -> &'static str;

    /// Perform one pass, feeding fetched content into the sink
    ///
    /// Returns the identifiers of resources that changed, in the order
    /// they were processed.
    async fn run(
        &mut self,
        sink: &dyn ParserSink,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<ResourceId>>;

    /// Release transport resources
    async fn close(&mut self) -> AppResult<()>;
}

/// Consumer of fetched file contents
///
/// The real parser/persistence lives outside this crate; the bundled
/// [`TracingSink`] only logs what it receives.
#[async_trait]
pub trait ParserSink: Send + Sync {
    async fn ingest(&self, resource: &str, content: &str) -> AppResult<()>;
}

/// Sink that logs ingested resources and drops the content
pub struct TracingSink;

#[async_trait]
impl ParserSink for TracingSink {
    async fn ingest(&self, resource: &str, content: &str) -> AppResult<()> {
        tracing::debug!(resource = %resource, bytes = content.len(), "Ingested resource");
        Ok(())
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Resolves the configured backend kind into a backend instance
///
/// Called once per run with fresh settings; the result is never cached
/// across runs, so a settings change takes effect at the next trigger.
pub trait SynchronizerFactory: Send + Sync {
    fn create(&self, settings: &SyncSettings) -> AppResult<Box<dyn Synchronizer>>;
}

/// Factory for the backends bundled with this server
pub struct DefaultSynchronizerFactory {
    /// Source directory for the local backend
    pub sync_root: PathBuf,
}

impl DefaultSynchronizerFactory {
    pub fn new(sync_root: PathBuf) -> Arc<Self> {
        Arc::new(Self { sync_root })
    }
}

impl SynchronizerFactory for DefaultSynchronizerFactory {
    fn create(&self, settings: &SyncSettings) -> AppResult<Box<dyn Synchronizer>> {
        match settings.backend {
            BackendKind::Null => Ok(Box::new(NullSynchronizer)),
            BackendKind::LocalDir => {
                Ok(Box::new(LocalDirSynchronizer::new(self.sync_root.clone())))
            }
            kind => Err(AppError::config(format!(
                "backend '{kind}' is not bundled with this server; register a SynchronizerFactory that provides it"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factory_rejects_network_kinds() {
        let factory = DefaultSynchronizerFactory::new(PathBuf::from("/tmp"));
        let settings = SyncSettings {
            backend: BackendKind::Webdav,
            ..Default::default()
        };
        assert!(matches!(
            factory.create(&settings),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn default_factory_resolves_bundled_kinds() {
        let factory = DefaultSynchronizerFactory::new(PathBuf::from("/tmp"));
        for kind in [BackendKind::Null, BackendKind::LocalDir] {
            let settings = SyncSettings {
                backend: kind,
                ..Default::default()
            };
            assert!(factory.create(&settings).is_ok());
        }
    }
}
