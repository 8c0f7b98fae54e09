//! Sync Server - background synchronization daemon
//!
//! # Architecture overview
//!
//! The core is the run supervisor (`sync`): a single-writer state
//! machine that guarantees at most one synchronization run at a time,
//! arms a per-run timeout, re-arms the periodic trigger only after the
//! current run has closed, and reacts live to settings changes.
//!
//! Everything that actually moves or interprets data is an external
//! collaborator behind a narrow seam:
//!
//! - **Synchronizer backends** (`synchronizers`): pluggable transports
//!   resolved per run from the current settings
//! - **Parser sink** (`synchronizers::ParserSink`): consumes fetched
//!   file contents
//! - **Downstream notifier** (`sync::notify`): receives the changed
//!   resource list after a successful run
//!
//! # Module structure
//!
//! ```text
//! sync-server/src/
//! ├── core/            # config, state, background task manager
//! ├── sync/            # run supervisor, timer facility, worker
//! ├── synchronizers/   # backend trait + bundled backends
//! ├── api/             # HTTP trigger entrypoints
//! └── utils/           # errors, logging
//! ```

pub mod api;
pub mod core;
pub mod sync;
pub mod synchronizers;
pub mod utils;

// Re-export public types
pub use crate::core::{BackgroundTasks, Config, ServerState, SettingsStore, TaskKind};
pub use crate::sync::{ChangeNotifier, Supervisor, SupervisorHandle, SyncStatus};
pub use crate::synchronizers::{ParserSink, Synchronizer, SynchronizerFactory};
pub use crate::utils::{AppError, AppResult};

// Re-export logger functions
pub use crate::utils::logger::init_logger;
