//! Per-company metric bundle

use super::aggregate::AnnualDividend;
use super::consistency::consistency;
use super::growth::cagr;
use super::payout_yield::{window_yield, YieldObservation};
use super::volatility::volatility;
use crate::types::{DateWindow, DividendEvent, PricePoint, Ticker};
use serde::{Deserialize, Serialize};

/// Everything the extractors need for one company
#[derive(Debug, Clone, Copy)]
pub struct MetricInputs<'a> {
    pub ticker: &'a str,
    /// Full event history, ordered by date
    pub events: &'a [DividendEvent],
    /// Annual totals over the full history
    pub history: &'a [AnnualDividend],
    /// Annual totals inside the query window
    pub annual: &'a [AnnualDividend],
    pub prices: &'a [PricePoint],
    pub query: DateWindow,
    pub ttm: DateWindow,
}

/// Raw dividend metrics for one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMetricBundle {
    pub ticker: Ticker,
    /// Payment events inside the query window
    pub payment_count: usize,
    pub years_paid: usize,
    pub years_observed: Option<u32>,
    pub coverage: Option<f64>,
    pub longest_streak: usize,
    pub payments_per_year: Option<f64>,
    pub mean_annual: Option<f64>,
    pub std_annual: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
    pub cuts: Option<usize>,
    pub cagr: Option<f64>,
    pub ttm_paid: f64,
    pub ttm_yield: YieldObservation,
    pub period_paid: f64,
    pub period_yield: YieldObservation,
}

impl CompanyMetricBundle {
    /// True when at least one metric could be computed
    pub fn has_any_metric(&self) -> bool {
        self.coverage.is_some()
            || self.coefficient_of_variation.is_some()
            || self.cuts.is_some()
            || self.cagr.is_some()
            || self.ttm_yield.value().is_some()
    }
}

/// Run the four extractors and assemble the bundle.
///
/// Consistency looks at the full history so coverage reflects the whole
/// payment record. Volatility and growth use the query window.
pub fn extract_metrics(inputs: &MetricInputs<'_>) -> CompanyMetricBundle {
    let consistency = consistency(inputs.history);
    let volatility = volatility(inputs.annual);
    let cagr = cagr(inputs.annual);
    let ttm = window_yield(inputs.events, inputs.prices, &inputs.ttm);
    let period = window_yield(inputs.events, inputs.prices, &inputs.query);

    let payment_count = inputs
        .events
        .iter()
        .filter(|e| inputs.query.contains(e.date))
        .count();

    CompanyMetricBundle {
        ticker: inputs.ticker.to_string(),
        payment_count,
        years_paid: consistency.years_paid,
        years_observed: consistency.years_observed,
        coverage: consistency.coverage,
        longest_streak: consistency.longest_streak,
        payments_per_year: consistency.payments_per_year,
        mean_annual: volatility.mean_annual,
        std_annual: volatility.std_annual,
        coefficient_of_variation: volatility.coefficient_of_variation,
        cuts: volatility.cuts,
        cagr,
        ttm_paid: ttm.paid,
        ttm_yield: ttm.observation,
        period_paid: period.paid,
        period_yield: period.observation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::aggregate::aggregate_annual;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_coverage_uses_full_history_growth_uses_window() {
        let events = vec![
            DividendEvent::new("X", d(2015, 6, 1), 0.10),
            DividendEvent::new("X", d(2018, 6, 1), 0.10),
            DividendEvent::new("X", d(2021, 6, 1), 0.10),
            DividendEvent::new("X", d(2022, 6, 1), 0.12),
            DividendEvent::new("X", d(2023, 6, 1), 0.09),
        ];
        let prices = vec![PricePoint::new(d(2023, 3, 1), 1.0, None)];
        let query = DateWindow::new(d(2021, 1, 1), d(2023, 12, 31)).unwrap();
        let history = aggregate_annual(&events, &DateWindow::all());
        let annual = aggregate_annual(&events, &query);

        let bundle = extract_metrics(&MetricInputs {
            ticker: "X",
            events: &events,
            history: &history,
            annual: &annual,
            prices: &prices,
            query,
            ttm: DateWindow::trailing_months(query.end, 12),
        });

        assert_eq!(bundle.years_observed, Some(9));
        assert_eq!(bundle.years_paid, 5);
        assert_eq!(bundle.longest_streak, 3);
        assert_eq!(bundle.payment_count, 3);
        assert_eq!(bundle.cuts, Some(1));
        assert_relative_eq!(bundle.cagr.unwrap(), 0.9f64.sqrt() - 1.0, epsilon = 1e-12);
        assert_relative_eq!(bundle.ttm_paid, 0.09, epsilon = 1e-12);
        assert_relative_eq!(bundle.ttm_yield.value().unwrap(), 0.09, epsilon = 1e-12);
        assert_relative_eq!(bundle.period_paid, 0.31, epsilon = 1e-12);
        assert!(bundle.has_any_metric());
    }

    #[test]
    fn test_company_without_events() {
        let query = DateWindow::new(d(2021, 1, 1), d(2023, 12, 31)).unwrap();
        let bundle = extract_metrics(&MetricInputs {
            ticker: "Y",
            events: &[],
            history: &[],
            annual: &[],
            prices: &[],
            query,
            ttm: DateWindow::trailing_months(query.end, 12),
        });
        assert_eq!(bundle.coverage, None);
        assert_eq!(bundle.cagr, None);
        assert_eq!(bundle.ttm_yield, YieldObservation::NoDistribution);
        assert!(!bundle.has_any_metric());
    }
}
