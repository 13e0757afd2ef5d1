//! Observation source trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{CredoError, CredoResult};
use crate::types::DEFAULT_CONFIDENCE;

/// Something that yields observation records when polled.
///
/// Implementations should not enforce their own timeout; the aggregator
/// wraps every call. `collect` must not block the thread: synchronous work
/// goes through [`collect_blocking`], otherwise the timeout cannot fire on a
/// current-thread runtime.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Stable name, used as the observation `source` and in logs.
    fn name(&self) -> &str;

    /// Confidence attached to every record from this source.
    fn confidence(&self) -> f64 {
        DEFAULT_CONFIDENCE
    }

    /// Collect the current records. An empty vector is a valid answer.
    async fn collect(&self) -> CredoResult<Vec<Value>>;
}

/// Run a synchronous source body on the blocking pool.
///
/// A panic in `f` becomes a source error for `source_name`.
pub async fn collect_blocking<F>(source_name: &str, f: F) -> CredoResult<Vec<Value>>
where
    F: FnOnce() -> CredoResult<Vec<Value>> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CredoError::source(source_name, format!("blocking collect failed: {}", e)))?
}
