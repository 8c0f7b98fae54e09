//! Shared types for the sync daemon
//!
//! Cross-crate types used by the server and by embedders that register
//! custom synchronizer backends: the live sync settings, the closed
//! backend enum, resource identifiers, and small time utilities.

pub mod sync;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Sync re-exports (for convenient access)
pub use sync::{BackendKind, ResourceId, SettingsPatch, SyncSettings};
