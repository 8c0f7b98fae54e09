//! End-to-end supervisor flow against the real local-directory backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shared::sync::{BackendKind, ResourceId, SettingsPatch, SyncSettings};
use sync_server::core::SettingsStore;
use sync_server::synchronizers::{DefaultSynchronizerFactory, TracingSink};
use sync_server::{ChangeNotifier, Supervisor, SupervisorHandle};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<Vec<ResourceId>>>,
}

#[async_trait]
impl ChangeNotifier for RecordingNotifier {
    async fn notify_changed(&self, changed: &[ResourceId]) {
        self.calls.lock().unwrap().push(changed.to_vec());
    }
}

// The local backend does real file I/O on the blocking pool; the paused
// clock only auto-advances once that work is done, so a short sleep per
// iteration lets runs finish before we assert.
async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

fn start(
    sync_root: std::path::PathBuf,
    settings: SyncSettings,
) -> (SupervisorHandle, SettingsStore, Arc<RecordingNotifier>) {
    let store = SettingsStore::new(settings);
    let notifier = Arc::new(RecordingNotifier::default());
    let (supervisor, handle) = Supervisor::new(
        store.subscribe(),
        DefaultSynchronizerFactory::new(sync_root),
        Arc::new(TracingSink),
        notifier.clone(),
        CancellationToken::new(),
    );
    tokio::spawn(supervisor.run());
    (handle, store, notifier)
}

#[tokio::test(start_paused = true)]
async fn local_backend_run_reports_changed_files_downstream() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("agenda.org"), "* TODO water plants").unwrap();
    std::fs::write(dir.path().join("notes.org"), "* Notes").unwrap();

    let settings = SyncSettings {
        backend: BackendKind::LocalDir,
        calendar_enabled: true,
        ..Default::default()
    };
    let (handle, _store, notifier) = start(dir.path().to_path_buf(), settings);

    handle.request_run().unwrap();
    settle().await;

    let status = handle.status();
    assert!(!status.running);
    assert_eq!(status.runs_started, 1);
    assert_eq!(status.last_changed_count, Some(2));
    assert_eq!(
        *notifier.calls.lock().unwrap(),
        vec![vec!["agenda.org".to_string(), "notes.org".to_string()]]
    );
}

#[tokio::test(start_paused = true)]
async fn periodic_trigger_drives_repeated_runs_until_disabled() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.org"), "* A").unwrap();

    let settings = SyncSettings {
        backend: BackendKind::LocalDir,
        auto_sync_enabled: true,
        auto_sync_interval_millis: 1000,
        ..Default::default()
    };
    let (handle, store, _notifier) = start(dir.path().to_path_buf(), settings);
    settle().await;
    assert!(handle.status().periodic_armed);

    tokio::time::sleep(Duration::from_millis(2100)).await;
    settle().await;
    assert_eq!(handle.status().runs_started, 2);

    store.apply(SettingsPatch {
        auto_sync_enabled: Some(false),
        ..Default::default()
    });
    settle().await;
    assert!(!handle.status().periodic_armed);

    tokio::time::sleep(Duration::from_secs(5)).await;
    settle().await;
    assert_eq!(handle.status().runs_started, 2);
}

#[tokio::test(start_paused = true)]
async fn switching_backend_takes_effect_on_the_next_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.org"), "* A").unwrap();

    // start on the null backend: a run changes nothing
    let settings = SyncSettings {
        backend: BackendKind::Null,
        calendar_enabled: true,
        ..Default::default()
    };
    let (handle, store, notifier) = start(dir.path().to_path_buf(), settings);

    handle.request_run().unwrap();
    settle().await;
    assert_eq!(handle.status().last_changed_count, Some(0));
    assert!(notifier.calls.lock().unwrap().is_empty());

    // backend selection is resolved fresh per run
    store.apply(SettingsPatch {
        backend: Some(BackendKind::LocalDir),
        ..Default::default()
    });
    settle().await;

    handle.request_run().unwrap();
    settle().await;
    assert_eq!(handle.status().last_changed_count, Some(1));
    assert_eq!(
        *notifier.calls.lock().unwrap(),
        vec![vec!["a.org".to_string()]]
    );
}
