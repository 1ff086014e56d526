//! SENTRA Core: Unsupervised Telemetry Anomaly Detection
//!
//! This crate implements the detection engine at the heart of SENTRA:
//! feature extraction over multivariate telemetry records, per-feature
//! standardization, ensemble isolation scoring, and contamination-based
//! threshold derivation, with no labeled ground truth anywhere in the
//! pipeline.
//!
//! # Architecture
//!
//! Data flows one way through four stages:
//!
//! ```text
//! records -> FeatureExtractor -> StandardizationParams -> IsolationForest -> AnomalyThreshold
//! ```
//!
//! A fit pass over a reference corpus produces an immutable
//! [`engine::FittedModel`] (standardization parameters, forest, threshold);
//! scoring passes reuse it unchanged and in parallel. Reporting layers
//! consume the resulting [`record::ScoredRecord`] table; nothing in this
//! crate renders, exports, or persists beyond the model types' serde
//! implementations.
//!
//! # Reproducibility
//!
//! Every random choice descends from an explicit seed in
//! [`config::DetectorConfig`]; two fits with the same seed and data produce
//! bit-identical scores.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod forest;
pub mod record;

pub use self::classify::AnomalyThreshold;
pub use self::config::{DetectorConfig, SubsamplePolicy};
pub use self::engine::{DetectionEngine, FittedModel, RecordFailure, ScoreReport};
pub use self::error::{DetectionError, MalformedDetail};
pub use self::feature::{
    FeatureExtractor, FeatureVector, StandardizationParams, TelemetryFeatureExtractor,
};
pub use self::forest::{IsolationForest, IsolationTree};
pub use self::record::{ScoredRecord, TelemetryRecord};
