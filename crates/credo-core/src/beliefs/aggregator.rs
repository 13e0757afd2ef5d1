//! Belief aggregator: poll sources, deduplicate, summarize.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::ObservationSource;
use crate::error::{CredoError, CredoResult};
use crate::store::ObservationStore;
use crate::types::{CycleSummary, Observation};

/// Default per-source timeout.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(10);

/// Pulls from a fixed list of sources and appends new observations.
pub struct BeliefAggregator {
    store: Arc<dyn ObservationStore>,
    sources: Vec<Arc<dyn ObservationSource>>,
    timeout: Duration,
}

impl BeliefAggregator {
    pub fn new(store: Arc<dyn ObservationStore>) -> Self {
        Self {
            store,
            sources: Vec::new(),
            timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    /// Builder method to set the per-source timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to register a source. Sources are visited in
    /// registration order.
    pub fn with_source(mut self, source: impl ObservationSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Register a boxed source.
    pub fn add_source(&mut self, source: Box<dyn ObservationSource>) {
        self.sources.push(Arc::from(source));
    }

    /// Names of the registered sources, in visit order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run one pass over every source.
    ///
    /// A failing or hanging source is counted in `errors` and skipped. Only
    /// the final store count can fail the whole pass.
    pub async fn update_beliefs(&self) -> CredoResult<CycleSummary> {
        let start = Instant::now();
        let mut summary = CycleSummary::default();

        for source in &self.sources {
            let name = source.name();

            let records = match self.collect_one(source).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(source = %name, code = e.code().as_str(), error = %e, "Source failed");
                    summary.record_error(name);
                    continue;
                }
            };

            summary.sources_processed += 1;
            let returned = records.len();

            for content in records {
                summary.beliefs_processed += 1;
                match self.ingest(name, source.confidence(), content) {
                    Ok(true) => summary.new_beliefs += 1,
                    Ok(false) => {}
                    Err(e) => {
                        warn!(source = %name, error = %e, "Failed to store observation, skipping");
                    }
                }
            }

            debug!(source = %name, records = returned, "Source collected");
        }

        summary.count = self.store.count()?;
        summary.duration = start.elapsed();

        info!(
            processed = summary.beliefs_processed,
            new = summary.new_beliefs,
            errors = summary.errors,
            total = summary.count,
            duration_ms = summary.duration.as_millis() as u64,
            "Beliefs updated"
        );

        Ok(summary)
    }

    /// Poll one source on its own task under the timeout. A timed-out task
    /// is aborted and a panic is reported as that source's error.
    async fn collect_one(&self, source: &Arc<dyn ObservationSource>) -> CredoResult<Vec<serde_json::Value>> {
        let name = source.name();
        let collector = Arc::clone(source);
        let mut task = tokio::spawn(async move { collector.collect().await });

        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) if join.is_panic() => Err(CredoError::source(name, "source panicked")),
            Ok(Err(join)) => Err(CredoError::source(name, join.to_string())),
            Err(_) => {
                task.abort();
                Err(CredoError::source_timeout(name, self.timeout))
            }
        }
    }

    /// Store one record. Returns whether it was new.
    fn ingest(&self, source: &str, confidence: f64, content: serde_json::Value) -> CredoResult<bool> {
        let observation = Observation::new(source, content, confidence)?;
        if self.store.contains(&observation.id)? {
            return Ok(false);
        }
        self.store.insert(&observation)
    }
}
