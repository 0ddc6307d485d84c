//! Rescaling raw metrics onto [0, 1]
//!
//! Each input is clamped to a fixed range and mapped linearly. Undefined or
//! non-finite inputs stay `None`.

use super::metrics::CompanyMetricBundle;
use crate::config::NormalizationBounds;
use serde::{Deserialize, Serialize};

/// Normalized sub-scores, each in [0, 1] or undefined
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub consistency: Option<f64>,
    pub growth: Option<f64>,
    #[serde(rename = "yield")]
    pub yield_: Option<f64>,
    pub stability: Option<f64>,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Unweighted mean of the defined values
fn mean_defined(values: &[Option<f64>]) -> Option<f64> {
    let defined: Vec<f64> = values.iter().flatten().copied().collect();
    if defined.is_empty() {
        None
    } else {
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }
}

pub fn coverage_score(coverage: Option<f64>) -> Option<f64> {
    finite(coverage).map(|c| c.clamp(0.0, 1.0))
}

pub fn growth_score(cagr: Option<f64>, bounds: &NormalizationBounds) -> Option<f64> {
    finite(cagr).map(|g| bounds.cagr.unit(g))
}

pub fn yield_score(ttm_yield: Option<f64>, bounds: &NormalizationBounds) -> Option<f64> {
    finite(ttm_yield).map(|y| bounds.ttm_yield.unit(y))
}

/// Mean of inverted CV and inverted cut count
pub fn stability_score(
    coefficient_of_variation: Option<f64>,
    cuts: Option<usize>,
    bounds: &NormalizationBounds,
) -> Option<f64> {
    let cv = finite(coefficient_of_variation)
        .map(|cv| 1.0 - bounds.coefficient_of_variation.unit(cv));
    let cuts = cuts.map(|n| 1.0 - bounds.cuts.unit(n as f64));
    mean_defined(&[cv, cuts])
}

/// Streak relative to the best streak among peers
pub fn streak_score(longest_streak: usize, peer_max_streak: usize) -> Option<f64> {
    if peer_max_streak == 0 {
        return None;
    }
    Some((longest_streak as f64 / peer_max_streak as f64).clamp(0.0, 1.0))
}

/// Longest streak across the comparison set
pub fn peer_max_streak(bundles: &[CompanyMetricBundle]) -> usize {
    bundles.iter().map(|b| b.longest_streak).max().unwrap_or(0)
}

/// Normalize one company against its peers
pub fn normalize(
    bundle: &CompanyMetricBundle,
    peer_max_streak: usize,
    bounds: &NormalizationBounds,
) -> SubScores {
    let consistency = mean_defined(&[
        coverage_score(bundle.coverage),
        streak_score(bundle.longest_streak, peer_max_streak),
    ]);

    SubScores {
        consistency,
        growth: growth_score(bundle.cagr, bounds),
        yield_: yield_score(bundle.ttm_yield.value(), bounds),
        stability: stability_score(bundle.coefficient_of_variation, bundle.cuts, bounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds() -> NormalizationBounds {
        NormalizationBounds::default()
    }

    #[test]
    fn test_growth_mapping() {
        let b = bounds();
        assert_relative_eq!(growth_score(Some(-0.5), &b).unwrap(), 0.0);
        assert_relative_eq!(growth_score(Some(0.0), &b).unwrap(), 0.5);
        assert_relative_eq!(growth_score(Some(2.0), &b).unwrap(), 1.0);
        assert_eq!(growth_score(None, &b), None);
        assert_eq!(growth_score(Some(f64::NAN), &b), None);
    }

    #[test]
    fn test_yield_mapping() {
        let b = bounds();
        assert_relative_eq!(yield_score(Some(0.05), &b).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(yield_score(Some(0.25), &b).unwrap(), 1.0);
        assert_relative_eq!(yield_score(Some(-0.01), &b).unwrap(), 0.0);
    }

    #[test]
    fn test_stability_uses_defined_parts() {
        let b = bounds();
        // cv 0.5 -> 0.75, 2 cuts -> 0.5
        assert_relative_eq!(stability_score(Some(0.5), Some(2), &b).unwrap(), 0.625);
        assert_relative_eq!(stability_score(None, Some(0), &b).unwrap(), 1.0);
        assert_relative_eq!(stability_score(Some(5.0), None, &b).unwrap(), 0.0);
        assert_eq!(stability_score(None, None, &b), None);
    }

    #[test]
    fn test_streak_is_relative_to_peers() {
        assert_relative_eq!(streak_score(3, 6).unwrap(), 0.5);
        assert_eq!(streak_score(0, 0), None);
    }

    #[test]
    fn test_coverage_clamped() {
        assert_relative_eq!(coverage_score(Some(1.3)).unwrap(), 1.0);
        assert_eq!(coverage_score(None), None);
    }
}
