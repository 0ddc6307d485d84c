//! Market data access
//!
//! The pipeline only sees the [`MarketDataProvider`] trait. Concrete sources
//! live in the sub-modules; [`InMemoryProvider`] backs tests and benchmarks.

pub mod cache;
pub mod csv_source;
pub mod yahoo;

pub use cache::CachingProvider;
pub use csv_source::CsvProvider;
#[cfg(feature = "yahoo")]
pub use yahoo::YahooFinanceSource;

use crate::error::{DividendError, Result};
use crate::types::{DateWindow, DividendEvent, PricePoint};
use hashbrown::HashMap;

/// Source of dividend events and daily prices
pub trait MarketDataProvider: Send + Sync {
    /// Full dividend history for `ticker`
    fn dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>>;

    /// Daily prices for `ticker` inside `window`
    fn prices(&self, ticker: &str, window: &DateWindow) -> Result<Vec<PricePoint>>;

    /// Get the source name
    fn name(&self) -> &str;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
        (**self).dividends(ticker)
    }

    fn prices(&self, ticker: &str, window: &DateWindow) -> Result<Vec<PricePoint>> {
        (**self).prices(ticker, window)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Validate and order a provider's dividend rows.
///
/// Non-finite amounts are dropped. A negative amount means the response is
/// malformed and the whole series is rejected.
pub fn clean_dividends(ticker: &str, events: Vec<DividendEvent>) -> Result<Vec<DividendEvent>> {
    let before = events.len();
    let mut cleaned = Vec::with_capacity(before);
    for event in events {
        if !event.amount.is_finite() {
            continue;
        }
        if event.amount < 0.0 {
            return Err(DividendError::malformed(
                ticker,
                format!("negative dividend {} on {}", event.amount, event.date),
            ));
        }
        cleaned.push(event);
    }
    if cleaned.len() < before {
        log::debug!(
            "Dropped {} non-numeric dividend rows for {}",
            before - cleaned.len(),
            ticker
        );
    }
    cleaned.sort_by_key(|e| e.date);
    Ok(cleaned)
}

/// Keep rows inside `window`, ordered by date
pub fn clean_prices(prices: Vec<PricePoint>, window: &DateWindow) -> Vec<PricePoint> {
    let mut rows: Vec<PricePoint> = prices
        .into_iter()
        .filter(|p| window.contains(p.date))
        .collect();
    rows.sort_by_key(|p| p.date);
    rows
}

/// In-memory provider for tests and offline runs
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    dividends: HashMap<String, Vec<DividendEvent>>,
    prices: HashMap<String, Vec<PricePoint>>,
    failing: HashMap<String, String>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dividend event
    pub fn add_dividend(&mut self, event: DividendEvent) {
        self.dividends
            .entry(event.ticker.clone())
            .or_insert_with(Vec::new)
            .push(event);
    }

    /// Add a daily price row for `ticker`
    pub fn add_price(&mut self, ticker: &str, price: PricePoint) {
        self.prices
            .entry(ticker.to_string())
            .or_insert_with(Vec::new)
            .push(price);
    }

    /// Make every request for `ticker` fail with `reason`
    pub fn fail_ticker(&mut self, ticker: &str, reason: &str) {
        self.failing.insert(ticker.to_string(), reason.to_string());
    }

    fn check(&self, ticker: &str) -> Result<()> {
        match self.failing.get(ticker) {
            Some(reason) => Err(DividendError::provider(ticker, reason.clone())),
            None => Ok(()),
        }
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
        self.check(ticker)?;
        Ok(self.dividends.get(ticker).cloned().unwrap_or_default())
    }

    fn prices(&self, ticker: &str, window: &DateWindow) -> Result<Vec<PricePoint>> {
        self.check(ticker)?;
        Ok(self
            .prices
            .get(ticker)
            .map(|rows| rows.iter().filter(|p| window.contains(p.date)).cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_clean_dividends_drops_nan_and_sorts() {
        let events = vec![
            DividendEvent::new("X", d(2023, 6, 1), 0.02),
            DividendEvent::new("X", d(2022, 6, 1), f64::NAN),
            DividendEvent::new("X", d(2021, 6, 1), 0.01),
        ];
        let cleaned = clean_dividends("X", events).unwrap();
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].date, d(2021, 6, 1));
    }

    #[test]
    fn test_clean_dividends_rejects_negative() {
        let events = vec![DividendEvent::new("X", d(2023, 6, 1), -0.02)];
        let err = clean_dividends("X", events).unwrap_err();
        assert!(matches!(err, DividendError::MalformedData { .. }));
    }

    #[test]
    fn test_in_memory_prices_respect_window() {
        let mut provider = InMemoryProvider::new();
        provider.add_price("X", PricePoint::new(d(2023, 1, 3), 1.0, None));
        provider.add_price("X", PricePoint::new(d(2024, 1, 3), 2.0, None));

        let window = DateWindow::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
        let rows = provider.prices("X", &window).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, 2.0);
    }

    #[test]
    fn test_in_memory_failure() {
        let mut provider = InMemoryProvider::new();
        provider.fail_ticker("X", "timeout");
        assert!(provider.dividends("X").is_err());
        assert!(provider.dividends("Y").unwrap().is_empty());
    }
}
