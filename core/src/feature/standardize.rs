//! Per-feature standardization
//!
//! Rescales feature vectors to zero mean and unit variance using statistics
//! fitted once over a reference corpus. The fitted parameters are the first
//! piece of persisted model state; they are immutable after `fit` and
//! shared read-only by every subsequent scoring pass.
//!
//! Standard deviations are population deviations (divisor n, not n - 1),
//! matching the scaler the telemetry pipeline standardized on. A feature
//! that is constant across the reference set is rejected as degenerate
//! rather than floored to an epsilon, so every fitted deviation is strictly
//! positive.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::DetectionError;
use crate::feature::FeatureVector;

/// Fitted per-feature (mean, standard deviation) pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizationParams {
    mean: Vec<f64>,
    std_dev: Vec<f64>,
}

impl StandardizationParams {
    /// Fit means and population standard deviations over a reference set.
    ///
    /// Requires at least 2 vectors of equal width. Fails with
    /// `DegenerateFeature` if any feature takes a single value across the
    /// whole set, since such a feature cannot be rescaled.
    pub fn fit(vectors: &[FeatureVector]) -> Result<Self, DetectionError> {
        if vectors.len() < 2 {
            return Err(DetectionError::InsufficientData {
                required: 2,
                actual: vectors.len(),
            });
        }

        let width = vectors[0].len();
        for vector in vectors {
            if vector.len() != width {
                return Err(DetectionError::DimensionMismatch {
                    expected: width,
                    actual: vector.len(),
                });
            }
        }

        let n = vectors.len() as f64;

        let mut mean = vec![0.0; width];
        let mut min = vec![f64::INFINITY; width];
        let mut max = vec![f64::NEG_INFINITY; width];
        for vector in vectors {
            for (feature, &value) in vector.as_slice().iter().enumerate() {
                mean[feature] += value;
                min[feature] = min[feature].min(value);
                max[feature] = max[feature].max(value);
            }
        }
        for value in &mut mean {
            *value /= n;
        }

        // Constancy is the exact degeneracy test; a summed variance can land
        // a hair above zero for identical inputs.
        for feature in 0..width {
            if min[feature] == max[feature] {
                return Err(DetectionError::DegenerateFeature { feature });
            }
        }

        let mut variance = vec![0.0; width];
        for vector in vectors {
            for (feature, &value) in vector.as_slice().iter().enumerate() {
                variance[feature] += (value - mean[feature]).powi(2);
            }
        }

        let std_dev: Vec<f64> = variance.iter().map(|v| (v / n).sqrt()).collect();

        debug!(
            "fitted standardization over {} vectors, {} features",
            vectors.len(),
            width
        );

        Ok(Self { mean, std_dev })
    }

    /// Rescale one vector: `(x - mean) / std_dev` per feature index.
    /// Pure; the fitted parameters are never mutated.
    pub fn transform(&self, vector: &FeatureVector) -> Result<FeatureVector, DetectionError> {
        if vector.len() != self.mean.len() {
            return Err(DetectionError::DimensionMismatch {
                expected: self.mean.len(),
                actual: vector.len(),
            });
        }

        let values = vector
            .as_slice()
            .iter()
            .zip(self.mean.iter().zip(self.std_dev.iter()))
            .map(|(&value, (&mean, &std_dev))| (value - mean) / std_dev)
            .collect();

        Ok(FeatureVector::new(values))
    }

    /// Rescale a batch, preserving order.
    pub fn transform_batch(
        &self,
        vectors: &[FeatureVector],
    ) -> Result<Vec<FeatureVector>, DetectionError> {
        vectors.iter().map(|v| self.transform(v)).collect()
    }

    pub fn dimensionality(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std_dev(&self) -> &[f64] {
        &self.std_dev
    }
}
