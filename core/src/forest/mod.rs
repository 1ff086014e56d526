//! Isolation forest ensemble
//!
//! An ordered collection of randomized binary partition trees built over
//! independent subsamples of the standardized reference set. Anomaly scores
//! derive from the average isolation path length across the ensemble:
//! points that separate from the rest in few splits score near 1, points
//! deep inside dense regions score well below 0.5.
//!
//! # Determinism
//!
//! Tree construction is driven entirely by per-tree RNGs whose seeds are
//! drawn up front from a single master seed. Trees build on worker threads
//! and collect in index order, so a fixed `random_seed` reproduces the
//! forest and every score bit-identically regardless of thread scheduling.
//! The forest is immutable after `fit`; scoring shares it read-only with no
//! locking.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod tree;

pub use self::tree::IsolationTree;

use log::debug;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DetectorConfig, SubsamplePolicy};
use crate::error::DetectionError;
use crate::feature::FeatureVector;

/// Euler-Mascheroni constant, for the harmonic-number approximation
const EULER_MASCHERONI: f64 = 0.577_215_664_901_532_9;

/// Average path length of `n` points under pure random partitioning:
/// `c(n) = 2 H(n-1) - 2 (n-1) / n`, with the harmonic number approximated
/// by `H(i) = ln(i) + gamma`. This is the standard closed-form estimator;
/// the approximation is only applied for n >= 3 where it is accurate.
pub(crate) fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let m = (n - 1) as f64;
            2.0 * (m.ln() + EULER_MASCHERONI) - 2.0 * m / n as f64
        }
    }
}

/// Ensemble of isolation trees plus the subsample size they were built
/// with. Owns its trees exclusively; built once, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    subsample_size: usize,
    num_features: usize,
}

impl IsolationForest {
    /// Build the ensemble over a standardized reference set.
    ///
    /// All preconditions (configuration domain, reference size, vector
    /// widths, subsample policy) are checked before the first tree is
    /// constructed; a failed fit never yields a partial forest.
    pub fn fit(vectors: &[FeatureVector], config: &DetectorConfig) -> Result<Self, DetectionError> {
        config.validate()?;

        if vectors.len() < 2 {
            return Err(DetectionError::InsufficientData {
                required: 2,
                actual: vectors.len(),
            });
        }

        let num_features = vectors[0].len();
        for vector in vectors {
            if vector.len() != num_features {
                return Err(DetectionError::DimensionMismatch {
                    expected: num_features,
                    actual: vector.len(),
                });
            }
        }

        let subsample_size = match config.subsample_policy {
            SubsamplePolicy::Clamp => config.subsample_size.min(vectors.len()),
            SubsamplePolicy::Strict => {
                if config.subsample_size > vectors.len() {
                    return Err(DetectionError::InsufficientData {
                        required: config.subsample_size,
                        actual: vectors.len(),
                    });
                }
                config.subsample_size
            }
        };

        let max_depth = config.resolved_max_depth(subsample_size);

        let mut master = match config.random_seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        let tree_seeds: Vec<u64> = (0..config.num_trees).map(|_| master.next_u64()).collect();

        debug!(
            "building {} isolation trees (subsample {}, max depth {})",
            config.num_trees, subsample_size, max_depth
        );

        let trees: Vec<IsolationTree> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha20Rng::seed_from_u64(seed);
                let picked = rand::seq::index::sample(&mut rng, vectors.len(), subsample_size);
                let subsample: Vec<&[f64]> =
                    picked.iter().map(|i| vectors[i].as_slice()).collect();
                IsolationTree::build(&subsample, max_depth, &mut rng)
            })
            .collect();

        Ok(Self {
            trees,
            subsample_size,
            num_features,
        })
    }

    /// Anomaly score for one standardized vector, in (0, 1]. Deterministic
    /// for a fixed forest; no side effects.
    pub fn score(&self, vector: &FeatureVector) -> Result<f64, DetectionError> {
        if vector.len() != self.num_features {
            return Err(DetectionError::DimensionMismatch {
                expected: self.num_features,
                actual: vector.len(),
            });
        }

        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(vector.as_slice()))
            .sum();
        let avg_path_length = total / self.trees.len() as f64;

        Ok(2.0_f64.powf(-avg_path_length / average_path_length(self.subsample_size)))
    }

    /// Score a batch in parallel against the shared immutable forest,
    /// preserving input order.
    pub fn score_batch(&self, vectors: &[FeatureVector]) -> Result<Vec<f64>, DetectionError> {
        vectors.par_iter().map(|v| self.score(v)).collect()
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Effective subsample size the trees were built with (after any
    /// clamping against the reference set size).
    pub fn subsample_size(&self) -> usize {
        self.subsample_size
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }
}
