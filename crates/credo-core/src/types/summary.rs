//! Per-cycle belief summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// What one belief-update pass saw.
///
/// Produced by the aggregator, consumed immediately by the desire optimizer
/// and then only logged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Records returned by sources this cycle (new or already known).
    pub beliefs_processed: u64,
    /// Records stored for the first time this cycle.
    pub new_beliefs: u64,
    /// Sources that failed or timed out.
    pub errors: u64,
    /// Sources that returned successfully.
    pub sources_processed: u64,
    /// Failure count keyed by source name.
    #[serde(default)]
    pub source_errors: BTreeMap<String, u64>,
    /// Wall-clock time of the pass.
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    /// Total observations stored after the pass.
    pub count: u64,
}

impl CycleSummary {
    /// Summary with only the three counters the value rules read.
    pub fn with_counts(beliefs_processed: u64, new_beliefs: u64, errors: u64) -> Self {
        Self {
            beliefs_processed,
            new_beliefs,
            errors,
            ..Default::default()
        }
    }

    /// Record a failure for `source`.
    pub fn record_error(&mut self, source: &str) {
        self.errors += 1;
        *self.source_errors.entry(source.to_string()).or_insert(0) += 1;
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
