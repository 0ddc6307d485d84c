//! Offline provider backed by CSV exports
//!
//! A data directory holds `dividends.csv` (`Ticker,Date,Dividend`) and
//! optionally `prices.csv` (`Ticker,Date,Close,Adj Close`). Dates are
//! `YYYY-MM-DD`. Rows whose numeric fields do not parse are skipped.
//!
//! A row that cannot be read at all (bad date, missing columns) marks its
//! ticker as malformed: requests for that ticker fail while every other
//! ticker in the file stays usable. Only a row without a ticker fails `open`.

use super::{InMemoryProvider, MarketDataProvider};
use crate::error::{DividendError, Result};
use crate::types::{DateWindow, DividendEvent, PricePoint};
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DIVIDENDS_FILE: &str = "dividends.csv";
pub const PRICES_FILE: &str = "prices.csv";

#[derive(Debug, Deserialize)]
struct DividendRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Dividend", deserialize_with = "csv::invalid_option")]
    dividend: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Close", deserialize_with = "csv::invalid_option")]
    close: Option<f64>,
    #[serde(rename = "Adj Close", default, deserialize_with = "csv::invalid_option")]
    adj_close: Option<f64>,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| DividendError::ParseError(format!("Date parse error for {:?}: {}", raw, e)))
}

/// First load failure per ticker
type Malformed = HashMap<String, String>;

fn mark_malformed(malformed: &mut Malformed, ticker: &str, line: u64, reason: impl fmt::Display) {
    log::warn!("Malformed CSV row for {} at line {}: {}", ticker, line, reason);
    malformed
        .entry(ticker.to_string())
        .or_insert_with(|| format!("line {}: {}", line, reason));
}

/// Deserialize every row of `path`, paired with its line number.
///
/// Rows that fail to deserialize are charged to the ticker in their
/// `Ticker` column.
fn read_rows<T: DeserializeOwned>(path: &Path, malformed: &mut Malformed) -> Result<Vec<(u64, T)>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let ticker_col = headers.iter().position(|h| h.trim() == "Ticker").ok_or_else(|| {
        DividendError::DataError(format!("{} has no Ticker column", path.display()))
    })?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        match record.deserialize::<T>(Some(&headers)) {
            Ok(row) => rows.push((line, row)),
            Err(e) => match record.get(ticker_col).map(str::trim).filter(|t| !t.is_empty()) {
                Some(ticker) => mark_malformed(malformed, ticker, line, e),
                None => {
                    return Err(DividendError::DataError(format!(
                        "{} line {}: row without a ticker: {}",
                        path.display(),
                        line,
                        e
                    )))
                }
            },
        }
    }
    Ok(rows)
}

/// CSV-backed provider, loaded eagerly on open
#[derive(Debug)]
pub struct CsvProvider {
    dir: PathBuf,
    data: InMemoryProvider,
    malformed: Malformed,
    dividend_rows: usize,
    price_rows: usize,
}

impl CsvProvider {
    /// Load `dividends.csv` and, if present, `prices.csv` from `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        let mut data = InMemoryProvider::new();
        let mut malformed = Malformed::new();

        let dividends_path = dir.join(DIVIDENDS_FILE);
        if !dividends_path.exists() {
            return Err(DividendError::DataError(format!(
                "{} not found in {}",
                DIVIDENDS_FILE,
                dir.display()
            )));
        }
        let dividend_rows = Self::load_dividends(&dividends_path, &mut data, &mut malformed)?;

        let prices_path = dir.join(PRICES_FILE);
        let price_rows = if prices_path.exists() {
            Self::load_prices(&prices_path, &mut data, &mut malformed)?
        } else {
            log::info!("No {} in {}, yields will be undefined", PRICES_FILE, dir.display());
            0
        };

        log::info!(
            "Loaded {} dividend rows and {} price rows from {}",
            dividend_rows,
            price_rows,
            dir.display()
        );
        if !malformed.is_empty() {
            log::warn!("{} tickers have malformed rows and will be skipped", malformed.len());
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            data,
            malformed,
            dividend_rows,
            price_rows,
        })
    }

    fn load_dividends(
        path: &Path,
        data: &mut InMemoryProvider,
        malformed: &mut Malformed,
    ) -> Result<usize> {
        let mut loaded = 0;
        for (line, row) in read_rows::<DividendRow>(path, malformed)? {
            let Some(amount) = row.dividend else {
                log::debug!("Skipping non-numeric dividend for {} on {}", row.ticker, row.date);
                continue;
            };
            match parse_date(&row.date) {
                Ok(date) => {
                    data.add_dividend(DividendEvent::new(row.ticker, date, amount));
                    loaded += 1;
                }
                Err(e) => mark_malformed(malformed, &row.ticker, line, e),
            }
        }
        Ok(loaded)
    }

    fn load_prices(
        path: &Path,
        data: &mut InMemoryProvider,
        malformed: &mut Malformed,
    ) -> Result<usize> {
        let mut loaded = 0;
        for (line, row) in read_rows::<PriceRow>(path, malformed)? {
            let Some(close) = row.close else {
                continue;
            };
            match parse_date(&row.date) {
                Ok(date) => {
                    data.add_price(&row.ticker, PricePoint::new(date, close, row.adj_close));
                    loaded += 1;
                }
                Err(e) => mark_malformed(malformed, &row.ticker, line, e),
            }
        }
        Ok(loaded)
    }

    fn check(&self, ticker: &str) -> Result<()> {
        match self.malformed.get(ticker) {
            Some(reason) => Err(DividendError::malformed(ticker, reason.clone())),
            None => Ok(()),
        }
    }

    /// Tickers with at least one unreadable row
    pub fn malformed_tickers(&self) -> Vec<&str> {
        let mut tickers: Vec<&str> = self.malformed.keys().map(String::as_str).collect();
        tickers.sort_unstable();
        tickers
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// (dividend rows, price rows) loaded
    pub fn row_counts(&self) -> (usize, usize) {
        (self.dividend_rows, self.price_rows)
    }
}

impl MarketDataProvider for CsvProvider {
    fn dividends(&self, ticker: &str) -> Result<Vec<DividendEvent>> {
        self.check(ticker)?;
        self.data.dividends(ticker)
    }

    fn prices(&self, ticker: &str, window: &DateWindow) -> Result<Vec<PricePoint>> {
        self.check(ticker)?;
        self.data.prices(ticker, window)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
