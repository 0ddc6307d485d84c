//! Event aggregation into annual totals

use crate::types::{Amount, DateWindow, DividendEvent, Ticker};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Total dividend paid by one company in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualDividend {
    pub ticker: Ticker,
    pub year: i32,
    pub amount: Amount,
    /// Number of payment events in the year
    pub payments: usize,
    /// `amount / previous year's amount - 1`; `None` when the immediately
    /// preceding year has no record or its total is 0
    pub yoy_growth: Option<f64>,
}

/// Events inside `window`, in input order
pub fn filter_window(events: &[DividendEvent], window: &DateWindow) -> Vec<DividendEvent> {
    events
        .iter()
        .filter(|e| window.contains(e.date))
        .cloned()
        .collect()
}

/// Sum events per (ticker, year) inside `window`.
///
/// Output is ordered by ticker then year. A ticker with no events in the
/// window produces no records at all.
pub fn aggregate_annual(events: &[DividendEvent], window: &DateWindow) -> Vec<AnnualDividend> {
    let mut buckets: BTreeMap<(&str, i32), (Amount, usize)> = BTreeMap::new();
    for event in events.iter().filter(|e| window.contains(e.date)) {
        let bucket = buckets
            .entry((event.ticker.as_str(), event.year()))
            .or_insert((0.0, 0));
        bucket.0 += event.amount;
        bucket.1 += 1;
    }

    let mut annual: Vec<AnnualDividend> = Vec::with_capacity(buckets.len());
    for ((ticker, year), (amount, payments)) in buckets {
        let yoy_growth = match annual.last() {
            Some(prev) if prev.ticker == ticker && prev.year == year - 1 && prev.amount > 0.0 => {
                Some(amount / prev.amount - 1.0)
            }
            _ => None,
        };
        annual.push(AnnualDividend {
            ticker: ticker.to_string(),
            year,
            amount,
            payments,
            yoy_growth,
        });
    }
    annual
}

/// Records belonging to `ticker`
pub fn series_for<'a>(annual: &'a [AnnualDividend], ticker: &str) -> Vec<&'a AnnualDividend> {
    annual.iter().filter(|a| a.ticker == ticker).collect()
}
