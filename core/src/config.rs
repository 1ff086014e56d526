//! Detector configuration
//!
//! All hyperparameters are validated up front, before any feature
//! extraction or tree construction begins. A configuration that passes
//! `validate` cannot fail later for configuration reasons.

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// Ensemble size used when none is configured
pub const DEFAULT_NUM_TREES: usize = 100;

/// Per-tree subsample size used when none is configured
pub const DEFAULT_SUBSAMPLE_SIZE: usize = 256;

/// Expected anomaly fraction used when none is configured
pub const DEFAULT_CONTAMINATION: f64 = 0.1;

/// Behavior when the reference set is smaller than the requested
/// per-tree subsample size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsamplePolicy {
    /// Use the whole reference set for every tree
    Clamp,

    /// Reject the fit with `InsufficientData`
    Strict,
}

/// Hyperparameters for a detector fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of isolation trees in the ensemble (> 0)
    pub num_trees: usize,

    /// Samples drawn without replacement per tree (> 1)
    pub subsample_size: usize,

    /// Depth cap per tree; `None` resolves to ceil(log2(subsample))
    pub max_depth: Option<usize>,

    /// Expected anomalous fraction of the reference population, in (0, 1)
    pub contamination: f64,

    /// Master seed for reproducible fits; `None` draws from entropy
    pub random_seed: Option<u64>,

    /// Fallback policy when the reference set is smaller than
    /// `subsample_size`
    pub subsample_policy: SubsamplePolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            num_trees: DEFAULT_NUM_TREES,
            subsample_size: DEFAULT_SUBSAMPLE_SIZE,
            max_depth: None,
            contamination: DEFAULT_CONTAMINATION,
            random_seed: None,
            subsample_policy: SubsamplePolicy::Clamp,
        }
    }
}

impl DetectorConfig {
    /// Check every parameter against its valid domain.
    pub fn validate(&self) -> Result<(), DetectionError> {
        if self.num_trees == 0 {
            return Err(DetectionError::InvalidConfiguration(
                "num_trees must be positive".to_string(),
            ));
        }

        if self.subsample_size < 2 {
            return Err(DetectionError::InvalidConfiguration(format!(
                "subsample_size must be at least 2, got {}",
                self.subsample_size
            )));
        }

        if self.max_depth == Some(0) {
            return Err(DetectionError::InvalidConfiguration(
                "max_depth must be positive when set".to_string(),
            ));
        }

        if !(self.contamination > 0.0 && self.contamination < 1.0) {
            return Err(DetectionError::InvalidConfiguration(format!(
                "contamination must lie in (0, 1), got {}",
                self.contamination
            )));
        }

        Ok(())
    }

    /// Depth cap for trees built over `subsample` samples: the configured
    /// value, or ceil(log2(subsample)) when unset.
    pub(crate) fn resolved_max_depth(&self, subsample: usize) -> usize {
        self.max_depth
            .unwrap_or_else(|| (subsample as f64).log2().ceil() as usize)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_trees, 100);
        assert_eq!(config.subsample_size, 256);
        assert_eq!(config.contamination, 0.1);
        assert_eq!(config.subsample_policy, SubsamplePolicy::Clamp);
    }

    #[test]
    fn default_depth_is_log2_of_subsample() {
        let config = DetectorConfig::default();
        assert_eq!(config.resolved_max_depth(256), 8);
        assert_eq!(config.resolved_max_depth(100), 7);
        assert_eq!(config.resolved_max_depth(2), 1);
    }

    #[test]
    fn explicit_depth_wins() {
        let config = DetectorConfig {
            max_depth: Some(12),
            ..DetectorConfig::default()
        };
        assert_eq!(config.resolved_max_depth(256), 12);
    }

    #[test]
    fn rejects_out_of_domain_parameters() {
        let zero_trees = DetectorConfig {
            num_trees: 0,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            zero_trees.validate(),
            Err(DetectionError::InvalidConfiguration(_))
        ));

        let tiny_subsample = DetectorConfig {
            subsample_size: 1,
            ..DetectorConfig::default()
        };
        assert!(matches!(
            tiny_subsample.validate(),
            Err(DetectionError::InvalidConfiguration(_))
        ));

        for contamination in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let config = DetectorConfig {
                contamination,
                ..DetectorConfig::default()
            };
            assert!(
                matches!(
                    config.validate(),
                    Err(DetectionError::InvalidConfiguration(_))
                ),
                "contamination {contamination} should be rejected"
            );
        }
    }
}
