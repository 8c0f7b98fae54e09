//! No-op backend: synchronizes nothing, reports nothing changed.
//!
//! Useful when sync is configured off and in tests.

use async_trait::async_trait;
use shared::sync::ResourceId;
use tokio_util::sync::CancellationToken;

use super::{ParserSink, Synchronizer};
use crate::utils::AppResult;

pub struct NullSynchronizer;

#[async_trait]
impl Synchronizer for NullSynchronizer {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn run(
        &mut self,
        _sink: &dyn ParserSink,
        _cancel: &CancellationToken,
    ) -> AppResult<Vec<ResourceId>> {
        Ok(Vec::new())
    }

    async fn close(&mut self) -> AppResult<()> {
        Ok(())
    }
}
