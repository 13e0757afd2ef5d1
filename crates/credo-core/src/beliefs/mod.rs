//! Belief aggregation.
//!
//! Sources are pulled one after another, each under its own timeout. Every
//! returned record becomes an [`Observation`](crate::types::Observation)
//! keyed by a content hash, so re-reading unchanged data is a no-op.

mod aggregator;
mod source;

pub use aggregator::BeliefAggregator;
pub use source::{collect_blocking, ObservationSource};
