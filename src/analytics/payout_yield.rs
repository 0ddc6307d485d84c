//! Dividend yield over a date window

use crate::types::{DateWindow, DividendEvent, PricePoint};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;

/// Outcome of a yield computation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum YieldObservation {
    /// Paid amount over mean price
    Defined(f64),
    /// Nothing was paid in the window
    NoDistribution,
    /// No usable price in the window
    NoPriceData,
}

impl YieldObservation {
    pub fn value(&self) -> Option<f64> {
        match self {
            YieldObservation::Defined(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for YieldObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YieldObservation::Defined(v) => write!(f, "{:.2}%", v * 100.0),
            YieldObservation::NoDistribution => write!(f, "no distribution"),
            YieldObservation::NoPriceData => write!(f, "no price data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowYield {
    /// Dividends paid inside the window
    pub paid: f64,
    /// Mean reference price inside the window
    pub mean_price: Option<f64>,
    pub observation: YieldObservation,
}

/// Yield of `events` against `prices` over `window`.
///
/// Both inputs may extend beyond the window; only rows inside it count.
pub fn window_yield(
    events: &[DividendEvent],
    prices: &[PricePoint],
    window: &DateWindow,
) -> WindowYield {
    let paid: f64 = events
        .iter()
        .filter(|e| window.contains(e.date))
        .map(|e| e.amount)
        .sum();

    let in_window: Vec<f64> = prices
        .iter()
        .filter(|p| window.contains(p.date))
        .filter_map(PricePoint::reference_price)
        .collect();
    let mean_price = if in_window.is_empty() {
        None
    } else {
        let mean = in_window.iter().mean();
        (mean.is_finite() && mean > 0.0).then_some(mean)
    };

    let observation = match mean_price {
        _ if paid == 0.0 => YieldObservation::NoDistribution,
        None => YieldObservation::NoPriceData,
        Some(price) => YieldObservation::Defined(paid / price),
    };

    WindowYield {
        paid,
        mean_price,
        observation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn window() -> DateWindow {
        DateWindow::new(d(2023, 1, 1), d(2023, 12, 31)).unwrap()
    }

    #[test]
    fn test_yield_uses_adjusted_close() {
        let events = vec![
            DividendEvent::new("X", d(2023, 3, 1), 0.02),
            DividendEvent::new("X", d(2023, 9, 1), 0.03),
            DividendEvent::new("X", d(2022, 9, 1), 0.50),
        ];
        let prices = vec![
            PricePoint::new(d(2023, 2, 1), 9.0, Some(0.9)),
            PricePoint::new(d(2023, 8, 1), 9.0, Some(1.1)),
        ];
        let y = window_yield(&events, &prices, &window());
        assert_relative_eq!(y.paid, 0.05, epsilon = 1e-12);
        assert_relative_eq!(y.mean_price.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(y.observation.value().unwrap(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_no_distribution_is_not_zero_yield() {
        let prices = vec![PricePoint::new(d(2023, 2, 1), 1.0, None)];
        let y = window_yield(&[], &prices, &window());
        assert_eq!(y.observation, YieldObservation::NoDistribution);
        assert_eq!(y.observation.value(), None);
    }

    #[test]
    fn test_missing_prices() {
        let events = vec![DividendEvent::new("X", d(2023, 3, 1), 0.02)];
        let prices = vec![PricePoint::new(d(2022, 2, 1), 1.0, None)];
        let y = window_yield(&events, &prices, &window());
        assert_eq!(y.mean_price, None);
        assert_eq!(y.observation, YieldObservation::NoPriceData);
    }

    #[test]
    fn test_display() {
        assert_eq!(YieldObservation::Defined(0.0525).to_string(), "5.25%");
        assert_eq!(YieldObservation::NoPriceData.to_string(), "no price data");
    }
}
