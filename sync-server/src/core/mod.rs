pub mod config;
pub mod state;
pub mod tasks;

pub use config::{Config, SettingsStore};
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
