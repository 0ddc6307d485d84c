//! Yahoo Finance chart API
//!
//! The response model and parsing are always compiled so they can be tested
//! offline. The HTTP client needs the `yahoo` feature.

use crate::error::{DividendError, Result};
use crate::types::{DividendEvent, PricePoint};
use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::BTreeMap;

#[cfg(feature = "yahoo")]
pub use client::YahooFinanceSource;

pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

/// One symbol's chart payload
#[derive(Debug, Default, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    events: Option<ChartEvents>,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartEvents {
    #[serde(default)]
    dividends: BTreeMap<String, DividendPayload>,
}

#[derive(Debug, Deserialize)]
struct DividendPayload {
    amount: Option<f64>,
    date: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
    #[serde(default)]
    adjclose: Vec<AdjCloseSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseSeries {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Calendar date of a unix timestamp in the exchange time zone
fn local_date(tz: &Tz, timestamp: i64) -> Option<NaiveDate> {
    tz.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.date_naive())
}

/// Parse a chart response body
pub fn parse_chart(ticker: &str, body: &str) -> Result<ChartResult> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| DividendError::malformed(ticker, format!("chart JSON: {}", e)))?;

    if let Some(err) = envelope.chart.error {
        return Err(DividendError::provider(
            ticker,
            format!("{}: {}", err.code, err.description),
        ));
    }

    Ok(envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .unwrap_or_default())
}

impl ChartResult {
    /// Dividend events, oldest first. Events without an amount are dropped.
    pub fn dividends(&self, ticker: &str, tz: &Tz) -> Vec<DividendEvent> {
        let Some(events) = &self.events else {
            return Vec::new();
        };

        let mut out: Vec<DividendEvent> = events
            .dividends
            .values()
            .filter_map(|payload| {
                let amount = payload.amount?;
                let date = local_date(tz, payload.date)?;
                Some(DividendEvent::new(ticker, date, amount))
            })
            .collect();
        out.sort_by_key(|e| e.date);
        out
    }

    /// Daily closes aligned with their timestamps. Rows without a close are dropped.
    pub fn prices(&self, ticker: &str, tz: &Tz) -> Result<Vec<PricePoint>> {
        let Some(indicators) = &self.indicators else {
            return Ok(Vec::new());
        };
        let closes = indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or(&[]);
        let adjusted = indicators.adjclose.first().map(|a| a.adjclose.as_slice());

        if closes.len() != self.timestamp.len() {
            return Err(DividendError::malformed(
                ticker,
                format!(
                    "{} timestamps but {} closes",
                    self.timestamp.len(),
                    closes.len()
                ),
            ));
        }

        let mut out = Vec::with_capacity(closes.len());
        for (idx, (&ts, close)) in self.timestamp.iter().zip(closes).enumerate() {
            let (Some(close), Some(date)) = (*close, local_date(tz, ts)) else {
                continue;
            };
            let adj_close = adjusted.and_then(|a| a.get(idx).copied().flatten());
            out.push(PricePoint::new(date, close, adj_close));
        }
        Ok(out)
    }
}

#[cfg(feature = "yahoo")]
mod client {
    use super::{parse_chart, YAHOO_CHART_URL};
    use crate::data::MarketDataProvider;
    use crate::error::{DividendError, Result};
    use crate::types::{DateWindow, DividendEvent, PricePoint};
    use chrono::{NaiveDate, Utc};
    use chrono_tz::Tz;
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// Yahoo Finance data source (no API key required)
    pub struct YahooFinanceSource {
        client: Client,
        tz: Tz,
    }

    impl YahooFinanceSource {
        /// Create a source that dates events in `tz`
        pub fn new(tz: Tz) -> Result<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
                .build()
                .map_err(|e| {
                    DividendError::DataError(format!("Failed to create HTTP client: {}", e))
                })?;

            Ok(Self { client, tz })
        }

        fn epoch(&self, date: NaiveDate) -> i64 {
            date.and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp())
                .unwrap_or(0)
        }

        fn fetch_chart(&self, ticker: &str, period1: i64, period2: i64) -> Result<super::ChartResult> {
            let url = format!(
                "{}/{}?period1={}&period2={}&interval=1d&events=div",
                YAHOO_CHART_URL, ticker, period1, period2
            );
            log::debug!("GET {}", url);

            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| DividendError::provider(ticker, format!("HTTP request failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(DividendError::provider(
                    ticker,
                    format!("Yahoo Finance returned error: {}", response.status()),
                ));
            }

            let body = response
                .text()
                .map_err(|e| DividendError::provider(ticker, format!("Failed to read response: {}", e)))?;

            parse_chart(ticker, &body)
        }
    }

    impl MarketDataProvider for YahooFinanceSource {
        fn dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
            let chart = self.fetch_chart(ticker, 0, Utc::now().timestamp())?;
            Ok(chart.dividends(ticker, &self.tz))
        }

        fn prices(&self, ticker: &str, window: &DateWindow) -> Result<Vec<PricePoint>> {
            let period1 = self.epoch(window.start);
            // period2 is exclusive
            let period2 = self.epoch(window.end) + 24 * 60 * 60;
            let chart = self.fetch_chart(ticker, period1, period2)?;
            chart.prices(ticker, &self.tz)
        }

        fn name(&self) -> &str {
            "yahoo"
        }
    }
}
