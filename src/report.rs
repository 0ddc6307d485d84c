//! Tabular views of a pipeline report and file export

use crate::error::{DividendError, Result};
use crate::pipeline::PipelineReport;
use chrono::NaiveDate;
use hashbrown::HashMap;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Total paid by one company inside the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Total Dividend")]
    pub total: f64,
    #[serde(rename = "Events")]
    pub events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Dividend")]
    pub dividend: f64,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Ticker")]
    pub ticker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualRow {
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "AnnualDividend")]
    pub annual_dividend: f64,
    #[serde(rename = "YoY_Growth")]
    pub yoy_growth: Option<f64>,
}

/// Flat score row, one per company
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub company: String,
    pub ticker: String,
    pub persona: String,
    pub composite: f64,
    pub consistency: Option<f64>,
    pub growth: Option<f64>,
    #[serde(rename = "yield")]
    pub yield_: Option<f64>,
    pub stability: Option<f64>,
    pub coverage: Option<f64>,
    pub years_paid: usize,
    pub years_observed: Option<u32>,
    pub longest_streak: usize,
    pub payments_per_year: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
    pub cuts: Option<usize>,
    pub cagr: Option<f64>,
    pub ttm_yield: Option<f64>,
    pub period_yield: Option<f64>,
}

/// Per-company totals, largest first. Companies with no events are omitted.
pub fn period_totals(report: &PipelineReport) -> Vec<PeriodTotal> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for event in &report.events {
        let entry = totals.entry(event.ticker.as_str()).or_insert((0.0, 0));
        entry.0 += event.amount;
        entry.1 += 1;
    }

    let mut rows: Vec<PeriodTotal> = totals
        .into_iter()
        .map(|(ticker, (total, events))| PeriodTotal {
            company: report.name_for(ticker).to_string(),
            ticker: ticker.to_string(),
            total,
            events,
        })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.company.cmp(&b.company)));
    rows
}

/// Events ordered by company name then date
pub fn event_rows(report: &PipelineReport) -> Vec<EventRow> {
    let mut rows: Vec<EventRow> = report
        .events
        .iter()
        .map(|e| EventRow {
            date: e.date,
            dividend: e.amount,
            company: report.name_for(&e.ticker).to_string(),
            ticker: e.ticker.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.company.cmp(&b.company).then(a.date.cmp(&b.date)));
    rows
}

pub fn annual_rows(report: &PipelineReport) -> Vec<AnnualRow> {
    report
        .annual
        .iter()
        .map(|a| AnnualRow {
            company: report.name_for(&a.ticker).to_string(),
            ticker: a.ticker.clone(),
            year: a.year,
            annual_dividend: a.amount,
            yoy_growth: a.yoy_growth,
        })
        .collect()
}

/// Score rows, best composite first
pub fn score_rows(report: &PipelineReport) -> Vec<ScoreRow> {
    report
        .ranked()
        .into_iter()
        .map(|s| {
            let m = &s.metrics;
            ScoreRow {
                company: report.name_for(&m.ticker).to_string(),
                ticker: m.ticker.clone(),
                persona: s.persona.to_string(),
                composite: s.composite,
                consistency: s.scores.consistency,
                growth: s.scores.growth,
                yield_: s.scores.yield_,
                stability: s.scores.stability,
                coverage: m.coverage,
                years_paid: m.years_paid,
                years_observed: m.years_observed,
                longest_streak: m.longest_streak,
                payments_per_year: m.payments_per_year,
                coefficient_of_variation: m.coefficient_of_variation,
                cuts: m.cuts,
                cagr: m.cagr,
                ttm_yield: m.ttm_yield.value(),
                period_yield: m.period_yield.value(),
            }
        })
        .collect()
}

/// Write `rows` as CSV with a header line
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Full report as pretty JSON
pub fn to_json(report: &PipelineReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Output format chosen from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
            Some(ext) if ext == "csv" => Ok(ExportFormat::Csv),
            Some(ext) if ext == "json" => Ok(ExportFormat::Json),
            _ => Err(DividendError::ConfigError(format!(
                "cannot infer output format from {}, use .csv or .json",
                path.display()
            ))),
        }
    }
}

/// Write score rows (CSV) or the full report (JSON) to `path`
pub fn export(report: &PipelineReport, path: &Path) -> Result<()> {
    let format = ExportFormat::from_path(path)?;
    let mut file = File::create(path)?;
    match format {
        ExportFormat::Csv => write_csv(file, &score_rows(report)),
        ExportFormat::Json => {
            file.write_all(to_json(report)?.as_bytes())?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::data::InMemoryProvider;
    use crate::pipeline::DividendPipeline;
    use crate::types::{DateWindow, DividendEvent};
    use crate::universe::Company;
    use tempfile::tempdir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn report() -> PipelineReport {
        let mut provider = InMemoryProvider::new();
        provider.add_dividend(DividendEvent::new("5789.KL", d(2022, 6, 1), 0.02));
        provider.add_dividend(DividendEvent::new("5789.KL", d(2023, 6, 1), 0.03));
        provider.add_dividend(DividendEvent::new("8583.KL", d(2023, 3, 1), 0.10));
        let companies = [
            Company::new("LBS Bina", "5789.KL"),
            Company::new("Mah Sing", "8583.KL"),
        ];
        let window = DateWindow::new(d(2020, 1, 1), d(2023, 12, 31)).unwrap();
        DividendPipeline::new(PipelineConfig::default())
            .unwrap()
            .run(&provider, &companies, window)
            .unwrap()
    }

    #[test]
    fn test_period_totals_sorted_descending() {
        let totals = period_totals(&report());
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].company, "Mah Sing");
        assert_eq!(totals[1].events, 2);
    }

    #[test]
    fn test_event_rows_sorted_by_company_then_date() {
        let rows = event_rows(&report());
        assert_eq!(rows[0].company, "LBS Bina");
        assert!(rows[0].date < rows[1].date);
        assert_eq!(rows[2].company, "Mah Sing");
    }

    #[test]
    fn test_annual_csv_leaves_first_yoy_blank() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &annual_rows(&report())).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Company,Ticker,Year,AnnualDividend,YoY_Growth"));
        assert_eq!(lines.next(), Some("LBS Bina,5789.KL,2022,0.02,"));
    }

    #[test]
    fn test_export_formats() {
        let dir = tempdir().unwrap();
        let report = report();

        let csv_path = dir.path().join("scores.csv");
        export(&report, &csv_path).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.starts_with("company,ticker,persona,composite"));

        let json_path = dir.path().join("report.json");
        export(&report, &json_path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["scored"].as_array().unwrap().len(), 2);

        assert!(export(&report, &dir.path().join("scores.xlsx")).is_err());
    }
}
