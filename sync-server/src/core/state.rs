//! Server state - shared references to the daemon's services
//!
//! `ServerState` is cloned into every HTTP handler; all fields are
//! cheap handles (`Arc`/channel-backed).

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::config::{settings_from_env, Config, SettingsStore};
use crate::sync::{Supervisor, SupervisorHandle, TracingNotifier};
use crate::synchronizers::{DefaultSynchronizerFactory, TracingSink};

#[derive(Clone)]
pub struct ServerState {
    /// Static configuration
    pub config: Config,
    /// Live sync settings store
    pub settings: SettingsStore,
    /// Handle to the run supervisor
    pub supervisor: SupervisorHandle,
}

impl ServerState {
    /// Build the state and the (not yet running) supervisor actor
    ///
    /// The caller spawns the returned supervisor as a background task;
    /// `shutdown` is the task manager's cancellation token.
    pub fn initialize(config: &Config, shutdown: CancellationToken) -> (Self, Supervisor) {
        let settings = SettingsStore::new(settings_from_env());

        let factory = DefaultSynchronizerFactory::new(config.sync_root.clone());
        let (supervisor, handle) = Supervisor::new(
            settings.subscribe(),
            factory,
            Arc::new(TracingSink),
            Arc::new(TracingNotifier),
            shutdown,
        );

        let state = Self {
            config: config.clone(),
            settings,
            supervisor: handle,
        };
        (state, supervisor)
    }
}
