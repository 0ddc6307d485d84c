//! Core types shared by the data and analytics layers

use crate::error::{DividendError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Exchange ticker symbol, e.g. `5789.KL`
pub type Ticker = String;

/// Per-share amount in the listing currency
pub type Amount = f64;

/// Price type (using f64 for precision)
pub type Price = f64;

/// One dividend payment as reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub ticker: Ticker,
    pub date: NaiveDate,
    pub amount: Amount,
}

impl DividendEvent {
    pub fn new(ticker: impl Into<Ticker>, date: NaiveDate, amount: Amount) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            amount,
        }
    }

    /// Calendar year of the payment date
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Daily closing price row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Price,
    /// Split/dividend adjusted close, when the provider has one
    pub adj_close: Option<Price>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: Price, adj_close: Option<Price>) -> Self {
        Self {
            date,
            close,
            adj_close,
        }
    }

    /// Price used for yield: adjusted close if usable, else raw close.
    /// Non-finite and non-positive prices are unusable.
    pub fn reference_price(&self) -> Option<Price> {
        let usable = |p: Price| p.is_finite() && p > 0.0;
        match self.adj_close {
            Some(adj) if usable(adj) => Some(adj),
            _ if usable(self.close) => Some(self.close),
            _ => None,
        }
    }
}

/// Inclusive calendar date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DividendError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window covering every representable date
    pub fn all() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    /// Trailing window of `months` ending at `end`: `[end - months + 1 day, end]`
    pub fn trailing_months(end: NaiveDate, months: u32) -> Self {
        let start = end
            .checked_sub_months(Months::new(months))
            .map(|d| d + Duration::days(1))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Smallest window covering both `self` and `other`
    pub fn union(&self, other: &DateWindow) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}
