//! Live synchronization settings and the backend enum
//!
//! [`SyncSettings`] is the mutable half of configuration: it can change
//! at runtime (API or preference file) and the supervisor re-reads it at
//! every scheduling decision. The static server config lives in the
//! server crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a synchronized resource (remote file name / path)
pub type ResourceId = String;

/// Default periodic sync interval: 30 minutes
pub const DEFAULT_AUTO_SYNC_INTERVAL_MILLIS: u64 = 1_800_000;

/// Default per-run timeout
pub const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// BackendKind
// ============================================================================

/// Closed set of synchronizer backends
///
/// Selection happens once per run from the current settings; the chosen
/// backend is never cached across runs.
///
/// | Variant | Wire name | Transport |
/// |---------|-----------|-----------|
/// | Null | `null` | no-op (testing / disabled) |
/// | LocalDir | `local` | local filesystem directory |
/// | Webdav | `webdav` | WebDAV share |
/// | CloudDrive | `cloud` | cloud drive provider |
/// | Ssh | `scp` | SSH/SCP remote |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Null,
    #[serde(rename = "local")]
    LocalDir,
    Webdav,
    #[serde(rename = "cloud")]
    CloudDrive,
    #[serde(rename = "scp")]
    Ssh,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Null => "null",
            BackendKind::LocalDir => "local",
            BackendKind::Webdav => "webdav",
            BackendKind::CloudDrive => "cloud",
            BackendKind::Ssh => "scp",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown backend name in configuration
#[derive(Debug, thiserror::Error)]
#[error("unknown synchronizer backend: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(BackendKind::Null),
            "local" => Ok(BackendKind::LocalDir),
            "webdav" => Ok(BackendKind::Webdav),
            "cloud" => Ok(BackendKind::CloudDrive),
            "scp" => Ok(BackendKind::Ssh),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

// ============================================================================
// SyncSettings
// ============================================================================

/// Live scheduling settings
///
/// Read fresh by the supervisor at every decision point; no stale copy
/// is kept across decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSettings {
    /// Whether the periodic trigger may be armed
    pub auto_sync_enabled: bool,
    /// Period of the repeating trigger (milliseconds)
    pub auto_sync_interval_millis: u64,
    /// Budget for one run; exceeding it force-stops the run
    pub sync_timeout_seconds: u64,
    /// Backend selected for the next run
    pub backend: BackendKind,
    /// Whether changed resources are propagated downstream (calendar)
    pub calendar_enabled: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            auto_sync_enabled: false,
            auto_sync_interval_millis: DEFAULT_AUTO_SYNC_INTERVAL_MILLIS,
            sync_timeout_seconds: DEFAULT_SYNC_TIMEOUT_SECS,
            backend: BackendKind::Null,
            calendar_enabled: false,
        }
    }
}

impl SyncSettings {
    /// Apply a partial update; absent fields keep their values
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(enabled) = patch.auto_sync_enabled {
            self.auto_sync_enabled = enabled;
        }
        if let Some(millis) = patch.auto_sync_interval_millis {
            self.auto_sync_interval_millis = millis;
        }
        if let Some(secs) = patch.sync_timeout_seconds {
            self.sync_timeout_seconds = secs;
        }
        if let Some(backend) = patch.backend {
            self.backend = backend;
        }
        if let Some(calendar) = patch.calendar_enabled {
            self.calendar_enabled = calendar;
        }
    }
}

/// Partial settings update (PUT /api/settings body)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub auto_sync_enabled: Option<bool>,
    pub auto_sync_interval_millis: Option<u64>,
    pub sync_timeout_seconds: Option<u64>,
    pub backend: Option<BackendKind>,
    pub calendar_enabled: Option<bool>,
}
