//! Detection engine facade
//!
//! Wires the pipeline end to end: records flow through feature extraction,
//! standardization, isolation scoring, and thresholding, in that order and
//! never backwards. A fit pass over a reference corpus produces a
//! `FittedModel`; scoring passes reuse that model unchanged, so many
//! independently configured models can coexist and a retrain simply
//! replaces the whole value.
//!
//! # Failure semantics
//!
//! Fitting fails fast: every precondition is checked before tree
//! construction begins and no partial model is ever returned. Scoring is
//! the opposite: one malformed record must not poison an otherwise valid
//! batch, so per-record failures are collected alongside the successfully
//! scored rows and the caller decides whether to skip or abort.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::sync::Arc;

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::AnomalyThreshold;
use crate::config::DetectorConfig;
use crate::error::DetectionError;
use crate::feature::{FeatureExtractor, StandardizationParams};
use crate::forest::IsolationForest;
use crate::record::{ScoredRecord, TelemetryRecord};

/// Everything a scoring pass needs, produced by one fit pass and immutable
/// afterwards. Retraining builds a fresh value; swapping the old one out is
/// atomic from any concurrent scorer's point of view because nothing inside
/// is ever mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    params: StandardizationParams,
    forest: IsolationForest,
    threshold: AnomalyThreshold,
}

impl FittedModel {
    pub fn params(&self) -> &StandardizationParams {
        &self.params
    }

    pub fn forest(&self) -> &IsolationForest {
        &self.forest
    }

    pub fn threshold(&self) -> &AnomalyThreshold {
        &self.threshold
    }
}

/// A record that could not be scored, with its position in the input batch
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// Index of the record in the submitted batch
    pub index: usize,

    /// Identity of the failing record
    pub record: Uuid,

    /// Why scoring was refused
    pub error: DetectionError,
}

/// Outcome of scoring one batch: scored rows in input order, plus the
/// records that failed, also in input order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreReport {
    pub scored: Vec<ScoredRecord>,
    pub failures: Vec<RecordFailure>,
}

impl ScoreReport {
    /// True when every submitted record scored.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// The scored rows flagged as anomalous.
    pub fn anomalies(&self) -> impl Iterator<Item = &ScoredRecord> {
        self.scored.iter().filter(|row| row.is_anomaly)
    }
}

/// The engine's in-memory API surface: fit over a reference corpus, then
/// score batches against the resulting model
pub struct DetectionEngine {
    extractor: Arc<dyn FeatureExtractor>,
    config: DetectorConfig,
}

impl DetectionEngine {
    /// Create an engine. The configuration is validated here so a
    /// constructed engine cannot fail later for configuration reasons.
    pub fn new(
        extractor: Arc<dyn FeatureExtractor>,
        config: DetectorConfig,
    ) -> Result<Self, DetectionError> {
        config.validate()?;
        Ok(Self { extractor, config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Fit standardization parameters, the isolation forest, and the
    /// anomaly threshold over a reference corpus.
    ///
    /// Any malformed record fails the whole fit; reference corpora are
    /// expected to be clean, and a silently narrowed fit would skew the
    /// threshold calibration.
    pub fn fit(&self, records: &[TelemetryRecord]) -> Result<FittedModel, DetectionError> {
        let raw: Vec<_> = records
            .iter()
            .map(|record| self.extractor.extract(record))
            .collect::<Result<_, _>>()?;

        let params = StandardizationParams::fit(&raw)?;
        let standardized = params.transform_batch(&raw)?;

        let forest = IsolationForest::fit(&standardized, &self.config)?;

        let reference_scores = forest.score_batch(&standardized)?;
        let threshold = AnomalyThreshold::derive(&reference_scores, self.config.contamination)?;

        info!(
            "fitted model: {} trees over {} reference records, cutoff {:.4}",
            forest.num_trees(),
            records.len(),
            threshold.cutoff()
        );

        Ok(FittedModel {
            params,
            forest,
            threshold,
        })
    }

    /// Score a batch against a fitted model.
    ///
    /// Records score independently and in parallel against the shared
    /// immutable model. Failures are reported per record; they never abort
    /// the rest of the batch.
    pub fn score(&self, records: &[TelemetryRecord], model: &FittedModel) -> ScoreReport {
        let outcomes: Vec<Result<ScoredRecord, RecordFailure>> = records
            .par_iter()
            .enumerate()
            .map(|(index, record)| {
                self.score_one(record, model).map_err(|error| RecordFailure {
                    index,
                    record: record.id,
                    error,
                })
            })
            .collect();

        let mut report = ScoreReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(row) => report.scored.push(row),
                Err(failure) => report.failures.push(failure),
            }
        }

        debug!(
            "scored batch: {} ok, {} failed, {} flagged",
            report.scored.len(),
            report.failures.len(),
            report.anomalies().count()
        );

        report
    }

    fn score_one(
        &self,
        record: &TelemetryRecord,
        model: &FittedModel,
    ) -> Result<ScoredRecord, DetectionError> {
        let features = self.extractor.extract(record)?;
        let standardized = model.params.transform(&features)?;
        let score = model.forest.score(&standardized)?;

        Ok(ScoredRecord {
            record: record.clone(),
            features,
            score,
            is_anomaly: model.threshold.is_anomaly(score),
        })
    }
}
