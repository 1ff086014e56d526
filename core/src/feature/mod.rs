//! Feature extraction and standardization
//!
//! This module owns the first two stages of the scoring pipeline: turning a
//! raw telemetry record into a fixed-width numeric feature vector, and
//! rescaling those vectors to zero mean and unit variance using statistics
//! fitted once over a reference corpus.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod extractor;
pub mod standardize;

pub use self::extractor::TelemetryFeatureExtractor;
pub use self::standardize::StandardizationParams;

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;
use crate::record::TelemetryRecord;

/// Fixed-order sequence of real-valued features derived from one record.
/// The width is constant across all records in one run; every fitted
/// component checks it and rejects disagreement with `DimensionMismatch`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature values, one per configured feature, in schema order
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// Extraction seam between raw records and the numeric pipeline.
///
/// Implementors must be pure: the same record and schema always produce the
/// same vector, in the same units and order. Missing or non-finite inputs
/// fail extraction rather than silently substituting a default.
pub trait FeatureExtractor: Send + Sync {
    /// Derive the feature vector for one record.
    fn extract(&self, record: &TelemetryRecord) -> Result<FeatureVector, DetectionError>;

    /// Width of every vector this extractor produces.
    fn dimensionality(&self) -> usize;

    /// Stable names of the extracted features, in vector order.
    fn feature_names(&self) -> &[&'static str];
}
