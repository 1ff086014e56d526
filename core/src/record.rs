//! Telemetry record model
//!
//! Records are the opaque input unit of the engine: a category tag plus a
//! mapping of named raw metrics to real values. A record is immutable once
//! ingested; everything the engine derives from it lives in separate value
//! types so the original observation survives unchanged through scoring.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::feature::FeatureVector;

/// A single telemetry observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Stable identity for per-record failure reporting
    pub id: Uuid,

    /// Source category (e.g. sensor type)
    pub category: String,

    /// Named raw metrics as reported by the telemetry source
    pub metrics: HashMap<String, f64>,
}

impl TelemetryRecord {
    /// Create a record with a freshly generated identity.
    pub fn new(category: impl Into<String>, metrics: HashMap<String, f64>) -> Self {
        Self::with_id(Uuid::new_v4(), category, metrics)
    }

    /// Create a record with a caller-supplied identity.
    pub fn with_id(id: Uuid, category: impl Into<String>, metrics: HashMap<String, f64>) -> Self {
        Self {
            id,
            category: category.into(),
            metrics,
        }
    }

    /// Look up a raw metric by name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// The engine's sole output row: a record together with its extracted
/// features, its anomaly score, and the binary classification under the
/// fitted threshold. Higher scores are more anomalous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// The original observation, untouched
    pub record: TelemetryRecord,

    /// Features extracted from the record (pre-standardization units)
    pub features: FeatureVector,

    /// Anomaly score in (0, 1]
    pub score: f64,

    /// Whether the score met the fitted threshold
    pub is_anomaly: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_metrics() -> HashMap<String, f64> {
        let mut metrics = HashMap::new();
        metrics.insert("energy_consumption".to_string(), 92.4);
        metrics.insert("data_size_bytes".to_string(), 310.0);
        metrics
    }

    #[test]
    fn metric_lookup_by_name() {
        let record = TelemetryRecord::new("ECG", sample_metrics());
        assert_eq!(record.metric("energy_consumption"), Some(92.4));
        assert_eq!(record.metric("not_a_metric"), None);
    }

    #[test]
    fn records_keep_distinct_identities() {
        let a = TelemetryRecord::new("ECG", sample_metrics());
        let b = TelemetryRecord::new("ECG", sample_metrics());
        assert_ne!(a.id, b.id);
    }
}
