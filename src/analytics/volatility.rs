//! Dispersion of annual totals and dividend cuts

use super::aggregate::AnnualDividend;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    pub mean_annual: Option<f64>,
    /// Population standard deviation of annual totals
    pub std_annual: Option<f64>,
    /// `std / mean`; `None` when the mean is exactly zero
    pub coefficient_of_variation: Option<f64>,
    /// Years with strictly negative year-over-year growth
    pub cuts: Option<usize>,
}

pub fn volatility(annual: &[AnnualDividend]) -> VolatilityMetrics {
    if annual.is_empty() {
        return VolatilityMetrics {
            mean_annual: None,
            std_annual: None,
            coefficient_of_variation: None,
            cuts: None,
        };
    }

    let amounts: Vec<f64> = annual.iter().map(|a| a.amount).collect();
    let mean = amounts.iter().mean();
    let std = amounts.iter().population_std_dev();
    let coefficient_of_variation = if mean == 0.0 || !std.is_finite() {
        None
    } else {
        Some(std / mean)
    };

    let cuts = annual
        .iter()
        .filter(|a| matches!(a.yoy_growth, Some(g) if g < 0.0))
        .count();

    VolatilityMetrics {
        mean_annual: Some(mean),
        std_annual: std.is_finite().then_some(std),
        coefficient_of_variation,
        cuts: Some(cuts),
    }
}
