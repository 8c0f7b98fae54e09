//! Server configuration
//!
//! Two layers: [`Config`] is static for the process lifetime and loaded
//! once at startup; [`SettingsStore`] holds the live [`SyncSettings`]
//! that may change at runtime and notifies subscribers on change.
//!
//! # Environment variables (static)
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | HTTP_PORT | 3000 | HTTP control API port |
//! | SYNC_ROOT | ./sync-files | source directory for the local backend |
//! | LOG_DIR | (unset) | daily-rotated log file directory |
//! | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown budget |
//! | ENVIRONMENT | development | development \| staging \| production |
//!
//! # Environment variables (initial live settings)
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | AUTO_SYNC_ENABLED | false | arm the periodic trigger at startup |
//! | AUTO_SYNC_INTERVAL_MS | 1800000 | periodic trigger interval |
//! | SYNC_TIMEOUT_SECS | 60 | per-run timeout |
//! | SYNC_BACKEND | null | one of null \| local \| webdav \| cloud \| scp |
//! | CALENDAR_SYNC_ENABLED | false | propagate changed resources downstream |
//!
//! Unparseable values fall back to the documented defaults; a bad value
//! never prevents startup.

use std::path::PathBuf;

use shared::sync::{
    BackendKind, SettingsPatch, SyncSettings, DEFAULT_AUTO_SYNC_INTERVAL_MILLIS,
    DEFAULT_SYNC_TIMEOUT_SECS,
};
use tokio::sync::watch;

/// Static server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP control API port
    pub http_port: u16,
    /// Source directory for the bundled local-directory backend
    pub sync_root: PathBuf,
    /// Optional log file directory
    pub log_dir: Option<String>,
    /// Graceful shutdown budget (milliseconds)
    pub shutdown_timeout_ms: u64,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparseable variables use defaults.
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            sync_root: std::env::var("SYNC_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./sync-files")),
            log_dir: std::env::var("LOG_DIR").ok(),
            shutdown_timeout_ms: std::env::var("SHUTDOWN_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Load the initial live settings from environment variables
///
/// Bad values fall back to defaults with a warning (configuration
/// errors never crash the supervisor).
pub fn settings_from_env() -> SyncSettings {
    SyncSettings {
        auto_sync_enabled: parse_env("AUTO_SYNC_ENABLED", false),
        auto_sync_interval_millis: parse_env(
            "AUTO_SYNC_INTERVAL_MS",
            DEFAULT_AUTO_SYNC_INTERVAL_MILLIS,
        ),
        sync_timeout_seconds: parse_env("SYNC_TIMEOUT_SECS", DEFAULT_SYNC_TIMEOUT_SECS),
        backend: parse_env("SYNC_BACKEND", BackendKind::Null),
        calendar_enabled: parse_env("CALENDAR_SYNC_ENABLED", false),
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key = %key, value = %raw, "Unparseable setting, using default");
            default
        }),
        Err(_) => default,
    }
}

// ============================================================================
// SettingsStore
// ============================================================================

/// Live settings store
///
/// Wraps a watch channel: the supervisor subscribes and reads the
/// current value fresh at every scheduling decision; `apply` publishes
/// a partial update and wakes subscribers.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    tx: watch::Sender<SyncSettings>,
}

impl SettingsStore {
    pub fn new(initial: SyncSettings) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    /// Current settings snapshot
    pub fn current(&self) -> SyncSettings {
        self.tx.borrow().clone()
    }

    /// Subscribe for change notifications
    pub fn subscribe(&self) -> watch::Receiver<SyncSettings> {
        self.tx.subscribe()
    }

    /// Apply a partial update and return the resulting settings
    ///
    /// Subscribers are only woken when something actually changed.
    pub fn apply(&self, patch: SettingsPatch) -> SyncSettings {
        self.tx.send_if_modified(|settings| {
            let before = settings.clone();
            settings.apply(patch);
            *settings != before
        });
        self.current()
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(SyncSettings::default())
    }
}
