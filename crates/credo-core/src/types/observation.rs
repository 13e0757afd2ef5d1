//! Observation (belief) records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CredoResult;

/// Confidence assigned to observations when a source does not say otherwise.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// A stored observation derived from an external source.
///
/// Identity is a content hash over `(source, canonical content)`, so feeding
/// the same payload from the same source twice maps to one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Content hash (lowercase hex md5).
    pub id: String,
    /// Opaque payload as returned by the source.
    pub content: serde_json::Value,
    /// Name of the source that produced this observation.
    pub source: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// When the observation was first stored.
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// Build an observation for `content` collected from `source`.
    pub fn new(source: impl Into<String>, content: serde_json::Value, confidence: f64) -> CredoResult<Self> {
        let source = source.into();
        let id = observation_id(&source, &content)?;
        Ok(Self {
            id,
            content,
            source,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp: Utc::now(),
        })
    }
}

/// Serialize a JSON value with object keys in sorted order.
///
/// `serde_json::Map` is ordered by key unless the `preserve_order` feature is
/// on, so a plain compact serialization is already canonical.
pub fn canonical_json(value: &serde_json::Value) -> CredoResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Deterministic observation id for `content` collected from `source`.
pub fn observation_id(source: &str, content: &serde_json::Value) -> CredoResult<String> {
    let canonical = canonical_json(content)?;
    Ok(format!("{:x}", md5::compute(format!("{}_{}", source, canonical).as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_ignores_key_order() {
        let a: serde_json::Value = serde_json::from_str(r#"{"type":"battery","data":{"level":80,"plugged":"AC"}}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"data":{"plugged":"AC","level":80},"type":"battery"}"#).unwrap();

        assert_eq!(observation_id("local_sensors", &a).unwrap(), observation_id("local_sensors", &b).unwrap());
    }

    #[test]
    fn test_id_depends_on_source() {
        let content = json!({"type": "disk_usage", "data": {"free": 10}});
        let a = observation_id("file_system", &content).unwrap();
        let b = observation_id("api_endpoints", &content).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn test_new_clamps_confidence() {
        let obs = Observation::new("file_system", json!({"free": 1}), 1.7).unwrap();
        assert_eq!(obs.confidence, 1.0);
        assert_eq!(obs.source, "file_system");
    }
}
