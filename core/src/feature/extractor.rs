//! Default telemetry feature schema
//!
//! Derives four features per sensor record: the reported efficiency ratio
//! and energy consumption, a throughput figure (payload bytes per unit of
//! transmission time), and a composite performance score relating all
//! three. Derived values inherit the same finiteness contract as raw
//! metrics, so a zero-duration transmission fails extraction instead of
//! producing an infinite throughput.

use log::trace;

use crate::error::{DetectionError, MalformedDetail};
use crate::feature::{FeatureExtractor, FeatureVector};
use crate::record::TelemetryRecord;

/// Raw metric: reported energy efficiency ratio
pub const METRIC_EFFICIENCY: &str = "energy_efficiency_ratio";

/// Raw metric: energy drawn over the reporting window
pub const METRIC_CONSUMPTION: &str = "energy_consumption";

/// Raw metric: payload size in bytes
pub const METRIC_DATA_SIZE: &str = "data_size_bytes";

/// Raw metric: transmission duration in seconds
pub const METRIC_DURATION: &str = "transmission_duration";

const FEATURE_NAMES: [&str; 4] = [
    METRIC_EFFICIENCY,
    METRIC_CONSUMPTION,
    "bytes_per_duration",
    "performance_score",
];

/// Feature extractor for the standard sensor telemetry schema
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryFeatureExtractor;

impl TelemetryFeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Fetch a raw metric, rejecting absent or non-finite values.
    fn require(record: &TelemetryRecord, metric: &str) -> Result<f64, DetectionError> {
        match record.metric(metric) {
            None => Err(DetectionError::MalformedRecord {
                record: record.id,
                detail: MalformedDetail::MissingMetric {
                    metric: metric.to_string(),
                },
            }),
            Some(value) if !value.is_finite() => Err(DetectionError::MalformedRecord {
                record: record.id,
                detail: MalformedDetail::NonFiniteMetric {
                    metric: metric.to_string(),
                    value,
                },
            }),
            Some(value) => Ok(value),
        }
    }

    /// Derived features carry the same finiteness contract as raw metrics.
    fn finite(record: &TelemetryRecord, name: &'static str, value: f64) -> Result<f64, DetectionError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(DetectionError::MalformedRecord {
                record: record.id,
                detail: MalformedDetail::NonFiniteMetric {
                    metric: name.to_string(),
                    value,
                },
            })
        }
    }
}

impl FeatureExtractor for TelemetryFeatureExtractor {
    fn extract(&self, record: &TelemetryRecord) -> Result<FeatureVector, DetectionError> {
        let efficiency = Self::require(record, METRIC_EFFICIENCY)?;
        let consumption = Self::require(record, METRIC_CONSUMPTION)?;
        let data_size = Self::require(record, METRIC_DATA_SIZE)?;
        let duration = Self::require(record, METRIC_DURATION)?;

        let throughput = Self::finite(record, "bytes_per_duration", data_size / duration)?;
        let performance =
            Self::finite(record, "performance_score", efficiency * throughput / consumption)?;

        trace!(
            "extracted features for record {} ({})",
            record.id,
            record.category
        );

        Ok(FeatureVector::new(vec![
            efficiency,
            consumption,
            throughput,
            performance,
        ]))
    }

    fn dimensionality(&self) -> usize {
        FEATURE_NAMES.len()
    }

    fn feature_names(&self) -> &[&'static str] {
        &FEATURE_NAMES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn record(metrics: &[(&str, f64)]) -> TelemetryRecord {
        let metrics: HashMap<String, f64> = metrics
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        TelemetryRecord::new("PulseOximeter", metrics)
    }

    fn complete_record() -> TelemetryRecord {
        record(&[
            (METRIC_EFFICIENCY, 1400.0),
            (METRIC_CONSUMPTION, 100.0),
            (METRIC_DATA_SIZE, 300.0),
            (METRIC_DURATION, 5.0),
        ])
    }

    #[test]
    fn extracts_schema_in_order() {
        let extractor = TelemetryFeatureExtractor::new();
        let features = extractor.extract(&complete_record()).unwrap();

        assert_eq!(features.len(), extractor.dimensionality());
        assert_relative_eq!(features.values[0], 1400.0);
        assert_relative_eq!(features.values[1], 100.0);
        // throughput: 300 bytes over 5 seconds
        assert_relative_eq!(features.values[2], 60.0);
        // performance: efficiency * throughput / consumption
        assert_relative_eq!(features.values[3], 1400.0 * 60.0 / 100.0);
    }

    #[test]
    fn extraction_is_pure() {
        let extractor = TelemetryFeatureExtractor::new();
        let record = complete_record();
        assert_eq!(
            extractor.extract(&record).unwrap(),
            extractor.extract(&record).unwrap()
        );
    }

    #[test]
    fn missing_metric_fails_extraction() {
        let extractor = TelemetryFeatureExtractor::new();
        let incomplete = record(&[
            (METRIC_EFFICIENCY, 1400.0),
            (METRIC_CONSUMPTION, 100.0),
            (METRIC_DATA_SIZE, 300.0),
        ]);

        match extractor.extract(&incomplete) {
            Err(DetectionError::MalformedRecord { record: id, detail }) => {
                assert_eq!(id, incomplete.id);
                assert_eq!(
                    detail,
                    MalformedDetail::MissingMetric {
                        metric: METRIC_DURATION.to_string()
                    }
                );
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_metric_fails_extraction() {
        let extractor = TelemetryFeatureExtractor::new();
        let poisoned = record(&[
            (METRIC_EFFICIENCY, f64::NAN),
            (METRIC_CONSUMPTION, 100.0),
            (METRIC_DATA_SIZE, 300.0),
            (METRIC_DURATION, 5.0),
        ]);

        assert!(matches!(
            extractor.extract(&poisoned),
            Err(DetectionError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn zero_duration_fails_as_non_finite_derived_feature() {
        let extractor = TelemetryFeatureExtractor::new();
        let stalled = record(&[
            (METRIC_EFFICIENCY, 1400.0),
            (METRIC_CONSUMPTION, 100.0),
            (METRIC_DATA_SIZE, 300.0),
            (METRIC_DURATION, 0.0),
        ]);

        match extractor.extract(&stalled) {
            Err(DetectionError::MalformedRecord { detail, .. }) => match detail {
                MalformedDetail::NonFiniteMetric { metric, .. } => {
                    assert_eq!(metric, "bytes_per_duration");
                }
                other => panic!("expected NonFiniteMetric, got {other:?}"),
            },
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }
}
