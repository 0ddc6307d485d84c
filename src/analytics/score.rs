//! Composite scoring
//!
//! An undefined sub-score counts as 0 in the weighted sum, so a company
//! missing a metric scores as worst-in-class on it. The weights are not
//! renormalized over the defined sub-scores.

use super::classify::{classify, Persona};
use super::metrics::CompanyMetricBundle;
use super::normalize::{normalize, peer_max_streak, SubScores};
use crate::config::{PipelineConfig, ScoreWeights};
use serde::{Deserialize, Serialize};

/// A company with its sub-scores, composite and persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCompany {
    #[serde(flatten)]
    pub metrics: CompanyMetricBundle,
    pub scores: SubScores,
    /// Weighted score in [0, 100]
    pub composite: f64,
    pub persona: Persona,
}

/// `100 * weighted sum` of the sub-scores, undefined read as 0
pub fn composite_score(scores: &SubScores, weights: &ScoreWeights) -> f64 {
    let weighted = weights.consistency * scores.consistency.unwrap_or(0.0)
        + weights.growth * scores.growth.unwrap_or(0.0)
        + weights.yield_ * scores.yield_.unwrap_or(0.0)
        + weights.stability * scores.stability.unwrap_or(0.0);
    (100.0 * weighted).clamp(0.0, 100.0)
}

/// Normalize, score and classify a comparison set.
///
/// Streak normalization is relative to the set, so the result for one
/// company depends on which peers are scored with it.
pub fn score_companies(
    bundles: Vec<CompanyMetricBundle>,
    config: &PipelineConfig,
) -> Vec<ScoredCompany> {
    let max_streak = peer_max_streak(&bundles);
    bundles
        .into_iter()
        .map(|metrics| {
            let scores = normalize(&metrics, max_streak, &config.bounds);
            let composite = composite_score(&scores, &config.weights);
            let persona = classify(&metrics, &config.thresholds);
            ScoredCompany {
                metrics,
                scores,
                composite,
                persona,
            }
        })
        .collect()
}
