//! Payment consistency: coverage, streaks and frequency

use super::aggregate::AnnualDividend;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyMetrics {
    /// Distinct years with a positive total
    pub years_paid: usize,
    /// `max year - min year + 1`; `None` without any record
    pub years_observed: Option<u32>,
    /// `years_paid / years_observed`, within [0, 1]
    pub coverage: Option<f64>,
    /// Longest run of consecutive paying years
    pub longest_streak: usize,
    /// Mean number of payment events per year with records
    pub payments_per_year: Option<f64>,
}

/// Consistency over a company's full annual history (ordered by year)
pub fn consistency(history: &[AnnualDividend]) -> ConsistencyMetrics {
    let paying: Vec<i32> = history
        .iter()
        .filter(|a| a.amount > 0.0)
        .map(|a| a.year)
        .collect();

    let years_observed = match (
        history.iter().map(|a| a.year).min(),
        history.iter().map(|a| a.year).max(),
    ) {
        (Some(first), Some(last)) => Some((last - first + 1) as u32),
        _ => None,
    };

    let coverage =
        years_observed.map(|observed| (paying.len() as f64 / observed as f64).clamp(0.0, 1.0));

    let mut longest_streak = 0;
    let mut run = 0;
    let mut prev: Option<i32> = None;
    for &year in &paying {
        run = match prev {
            Some(p) if year == p + 1 => run + 1,
            _ => 1,
        };
        longest_streak = longest_streak.max(run);
        prev = Some(year);
    }

    let payments_per_year = if history.is_empty() {
        None
    } else {
        let total: usize = history.iter().map(|a| a.payments).sum();
        Some(total as f64 / history.len() as f64)
    };

    ConsistencyMetrics {
        years_paid: paying.len(),
        years_observed,
        coverage,
        longest_streak,
        payments_per_year,
    }
}
