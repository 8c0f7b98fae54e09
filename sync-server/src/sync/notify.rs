//! Downstream change notification
//!
//! After a completed run with a non-empty change list (and calendar
//! propagation enabled), the supervisor hands the list to a
//! [`ChangeNotifier`] exactly once. Real consumers (calendar feeds,
//! indexers) live outside this crate and register through the trait.

use async_trait::async_trait;
use shared::sync::ResourceId;

#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    async fn notify_changed(&self, changed: &[ResourceId]);
}

/// Notifier that only logs the changed resources
pub struct TracingNotifier;

#[async_trait]
impl ChangeNotifier for TracingNotifier {
    async fn notify_changed(&self, changed: &[ResourceId]) {
        tracing::info!(
            count = changed.len(),
            resources = ?changed,
            "Propagating changed resources downstream"
        );
    }
}
