//! Error taxonomy for the detection engine
//!
//! Every failure the engine can produce is a caller-correctable precondition
//! violation detected before any model state is constructed. There is no
//! transient failure mode: nothing in this core talks to a network or an
//! external service, so nothing is retried.

use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Error types for detection engine operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectionError {
    /// A raw record is missing a required metric or carries a non-finite
    /// value. Raised at extraction, never silently coerced to a default.
    #[error("malformed record {record}: {detail}")]
    MalformedRecord { record: Uuid, detail: MalformedDetail },

    /// A feature has zero variance across the fitting reference set. The
    /// fit is rejected rather than patched with an epsilon floor.
    #[error("feature {feature} has zero variance across the reference set")]
    DegenerateFeature { feature: usize },

    /// Fewer reference samples than the operation requires.
    #[error("insufficient reference data: {required} samples required, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A configuration parameter is outside its valid domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A vector's width disagrees with the fitted feature schema.
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// The specific way a record failed extraction
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedDetail {
    /// Required metric absent from the record's metric map
    MissingMetric { metric: String },

    /// Metric present but NaN or infinite (raw or derived)
    NonFiniteMetric { metric: String, value: f64 },
}

impl fmt::Display for MalformedDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMetric { metric } => {
                write!(f, "missing required metric '{metric}'")
            }
            Self::NonFiniteMetric { metric, value } => {
                write!(f, "metric '{metric}' is non-finite ({value})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_carry_context() {
        let err = DetectionError::MalformedRecord {
            record: Uuid::nil(),
            detail: MalformedDetail::MissingMetric {
                metric: "energy_consumption".to_string(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("energy_consumption"));
        assert!(text.contains("missing"));

        let err = DetectionError::MalformedRecord {
            record: Uuid::nil(),
            detail: MalformedDetail::NonFiniteMetric {
                metric: "transmission_duration".to_string(),
                value: f64::NAN,
            },
        };
        assert!(err.to_string().contains("non-finite"));
    }

    #[test]
    fn insufficient_data_names_both_counts() {
        let err = DetectionError::InsufficientData {
            required: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "insufficient reference data: 2 samples required, got 1"
        );
    }
}
