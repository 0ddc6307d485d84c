//! End-to-end dividend scoring run
//!
//! One refresh fetches every selected company, then aggregates, extracts,
//! normalizes, scores and classifies. A provider failure only removes the
//! affected company from the run.

use crate::analytics::{
    aggregate_annual, extract_metrics, filter_window, score_companies, AnnualDividend,
    MetricInputs, ScoredCompany,
};
use crate::config::PipelineConfig;
use crate::data::{clean_dividends, clean_prices, MarketDataProvider};
use crate::error::{DividendError, Result};
use crate::types::{DateWindow, DividendEvent, PricePoint};
use crate::universe::Company;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Informational state for a company that is still scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CompanyNotice {
    /// No dividend events inside the query window
    NoDividends { company: Company },
    /// No price rows inside the query window
    NoPrices { company: Company },
}

impl fmt::Display for CompanyNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompanyNotice::NoDividends { company } => write!(
                f,
                "{} ({}): no dividend events in this period",
                company.name, company.ticker
            ),
            CompanyNotice::NoPrices { company } => write!(
                f,
                "{} ({}): no price history in this period",
                company.name, company.ticker
            ),
        }
    }
}

/// A company dropped from the run because its data could not be fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyWarning {
    pub company: Company,
    pub reason: String,
}

impl fmt::Display for CompanyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.company.name, self.company.ticker, self.reason)
    }
}

/// Everything a refresh produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub window: DateWindow,
    pub ttm: DateWindow,
    /// Companies that were fetched successfully, in request order
    pub companies: Vec<Company>,
    /// Events inside the window, ordered by company then date
    pub events: Vec<DividendEvent>,
    /// Annual totals inside the window
    pub annual: Vec<AnnualDividend>,
    pub scored: Vec<ScoredCompany>,
    pub notices: Vec<CompanyNotice>,
    pub warnings: Vec<CompanyWarning>,
}

impl PipelineReport {
    /// True when no company had a single event in the window
    pub fn has_no_events(&self) -> bool {
        self.events.is_empty()
    }

    pub fn company(&self, ticker: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.ticker == ticker)
    }

    /// Display name for `ticker`, falling back to the ticker itself
    pub fn name_for<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.company(ticker).map(|c| c.name.as_str()).unwrap_or(ticker)
    }

    pub fn scored_for(&self, ticker: &str) -> Option<&ScoredCompany> {
        self.scored.iter().find(|s| s.metrics.ticker == ticker)
    }

    /// Scored companies, best composite first
    pub fn ranked(&self) -> Vec<&ScoredCompany> {
        let mut ranked: Vec<&ScoredCompany> = self.scored.iter().collect();
        ranked.sort_by(|a, b| b.composite.total_cmp(&a.composite));
        ranked
    }
}

struct Fetched {
    company: Company,
    events: Vec<DividendEvent>,
    prices: Vec<PricePoint>,
}

/// Runs the scoring pipeline with a fixed configuration
#[derive(Debug, Clone)]
pub struct DividendPipeline {
    config: PipelineConfig,
}

impl DividendPipeline {
    /// Create a pipeline, validating `config`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch, aggregate and score `companies` over `window`
    pub fn run<P: MarketDataProvider + ?Sized>(
        &self,
        provider: &P,
        companies: &[Company],
        window: DateWindow,
    ) -> Result<PipelineReport> {
        if companies.is_empty() {
            return Err(DividendError::NoData("no companies selected".to_string()));
        }
        let window = DateWindow::new(window.start, window.end)?;
        let ttm = DateWindow::trailing_months(window.end, self.config.ttm_months);
        let price_window = window.union(&ttm);

        log::info!(
            "Scoring {} companies from {} to {} using {}",
            companies.len(),
            window.start,
            window.end,
            provider.name()
        );

        let mut warnings = Vec::new();
        let mut fetched = Vec::with_capacity(companies.len());
        for company in companies {
            match Self::fetch(provider, company, &price_window) {
                Ok(f) => fetched.push(f),
                Err(e) => {
                    log::warn!("Skipping {} ({}): {}", company.name, company.ticker, e);
                    warnings.push(CompanyWarning {
                        company: company.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let notices = Self::notices(&fetched, &window);

        let extracted: Vec<(Vec<AnnualDividend>, _)> = fetched
            .par_iter()
            .map(|f| {
                let history = aggregate_annual(&f.events, &DateWindow::all());
                let annual = aggregate_annual(&f.events, &window);
                let bundle = extract_metrics(&MetricInputs {
                    ticker: &f.company.ticker,
                    events: &f.events,
                    history: &history,
                    annual: &annual,
                    prices: &f.prices,
                    query: window,
                    ttm,
                });
                (annual, bundle)
            })
            .collect();

        let mut annual = Vec::new();
        let mut bundles = Vec::with_capacity(extracted.len());
        for (company_annual, bundle) in extracted {
            annual.extend(company_annual);
            bundles.push(bundle);
        }
        let scored = score_companies(bundles, &self.config);

        let events: Vec<DividendEvent> = fetched
            .iter()
            .flat_map(|f| filter_window(&f.events, &window))
            .collect();

        log::info!(
            "Scored {} companies ({} events, {} skipped)",
            scored.len(),
            events.len(),
            warnings.len()
        );

        Ok(PipelineReport {
            window,
            ttm,
            companies: fetched.into_iter().map(|f| f.company).collect(),
            events,
            annual,
            scored,
            notices,
            warnings,
        })
    }

    fn fetch<P: MarketDataProvider + ?Sized>(
        provider: &P,
        company: &Company,
        price_window: &DateWindow,
    ) -> Result<Fetched> {
        let ticker = company.ticker.as_str();
        let events: Vec<DividendEvent> = provider
            .dividends(ticker)?
            .into_iter()
            .filter(|e| e.ticker == ticker)
            .collect();
        let events = clean_dividends(ticker, events)?;
        let prices = clean_prices(provider.prices(ticker, price_window)?, price_window);

        Ok(Fetched {
            company: company.clone(),
            events,
            prices,
        })
    }

    fn notices(fetched: &[Fetched], window: &DateWindow) -> Vec<CompanyNotice> {
        let mut notices = Vec::new();
        for f in fetched {
            if !f.events.iter().any(|e| window.contains(e.date)) {
                notices.push(CompanyNotice::NoDividends {
                    company: f.company.clone(),
                });
            }
            if !f.prices.iter().any(|p| window.contains(p.date)) {
                notices.push(CompanyNotice::NoPrices {
                    company: f.company.clone(),
                });
            }
        }
        notices
    }
}
