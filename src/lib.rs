//! # dividend-health
//!
//! Dividend health scoring for a basket of listed companies.
//!
//! Dividend events and daily prices are fetched per ticker, aggregated into
//! annual totals, reduced to consistency, volatility, growth and yield
//! metrics, normalized onto [0, 1], combined into a 0-100 composite score and
//! labelled with a persona.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dividend_health::prelude::*;
//! use chrono::NaiveDate;
//!
//! # fn main() -> dividend_health::error::Result<()> {
//! let provider = CsvProvider::open(std::path::Path::new("data"))?;
//! let universe = Universe::default();
//! let companies: Vec<Company> = universe.companies().cloned().collect();
//! let window = DateWindow::new(
//!     NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
//! )?;
//!
//! let report = DividendPipeline::new(PipelineConfig::default())?
//!     .run(&provider, &companies, window)?;
//! for scored in report.ranked() {
//!     println!("{} {:.1} {}", scored.metrics.ticker, scored.composite, scored.persona);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod universe;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::analytics::{
        AnnualDividend, CompanyMetricBundle, Persona, ScoredCompany, SubScores, YieldObservation,
    };
    pub use crate::config::PipelineConfig;
    pub use crate::data::{CachingProvider, CsvProvider, InMemoryProvider, MarketDataProvider};
    pub use crate::error::{DividendError, Result};
    pub use crate::pipeline::{DividendPipeline, PipelineReport};
    pub use crate::types::*;
    pub use crate::universe::{Company, Universe};
}
