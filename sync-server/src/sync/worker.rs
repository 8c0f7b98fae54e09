//! One synchronization run
//!
//! The worker is the only place that blocks on the backend transfer.
//! Whatever happens inside the run — success, backend error, even a
//! panic — it reports completion back to the supervisor, so the run
//! state can never stick at Running.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use shared::sync::ResourceId;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use super::{Command, RunId};
use crate::synchronizers::{ParserSink, Synchronizer};
use crate::utils::AppResult;

pub struct SyncWorker {
    run_id: RunId,
    backend: Box<dyn Synchronizer>,
    sink: Arc<dyn ParserSink>,
    cancel: CancellationToken,
    tx: UnboundedSender<Command>,
}

impl SyncWorker {
    pub fn new(
        run_id: RunId,
        backend: Box<dyn Synchronizer>,
        sink: Arc<dyn ParserSink>,
        cancel: CancellationToken,
        tx: UnboundedSender<Command>,
    ) -> Self {
        Self {
            run_id,
            backend,
            sink,
            cancel,
            tx,
        }
    }

    /// Execute the run and report completion, unconditionally
    pub async fn run(self) {
        let Self {
            run_id,
            backend,
            sink,
            cancel,
            tx,
        } = self;

        let name = backend.name();
        tracing::info!(run_id, backend = %name, "Sync run started");

        let outcome = AssertUnwindSafe(run_once(backend, sink, cancel))
            .catch_unwind()
            .await;

        let changed = match outcome {
            Ok(Ok(changed)) => {
                tracing::info!(run_id, changed = changed.len(), "Sync run finished");
                changed
            }
            Ok(Err(e)) => {
                tracing::error!(run_id, backend = %name, error = %e, "Sync run failed");
                Vec::new()
            }
            Err(_) => {
                tracing::error!(run_id, backend = %name, "Sync run panicked");
                Vec::new()
            }
        };

        // The supervisor may already have disowned this run (timeout);
        // it filters by run id.
        let _ = tx.send(Command::RunCompleted(run_id, changed));
    }
}

async fn run_once(
    mut backend: Box<dyn Synchronizer>,
    sink: Arc<dyn ParserSink>,
    cancel: CancellationToken,
) -> AppResult<Vec<ResourceId>> {
    let outcome = backend.run(sink.as_ref(), &cancel).await;

    // close even when the run failed or was cancelled
    if let Err(e) = backend.close().await {
        tracing::warn!(backend = %backend.name(), error = %e, "Backend close failed");
    }

    outcome
}
