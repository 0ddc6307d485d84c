//! Integration tests for dividend-health

use approx::assert_relative_eq;
use chrono::NaiveDate;
use dividend_health::analytics::{Persona, YieldObservation};
use dividend_health::config::PipelineConfig;
use dividend_health::data::{CachingProvider, CsvProvider, InMemoryProvider};
use dividend_health::pipeline::{CompanyNotice, DividendPipeline};
use dividend_health::report::{annual_rows, period_totals};
use dividend_health::types::{DateWindow, DividendEvent, PricePoint};
use dividend_health::universe::{Company, Universe};
use std::fs;
use tempfile::tempdir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn pipeline() -> DividendPipeline {
    DividendPipeline::new(PipelineConfig::default()).unwrap()
}

#[test]
fn test_three_year_scenario() {
    let mut provider = InMemoryProvider::new();
    provider.add_dividend(DividendEvent::new("X.KL", d(2021, 6, 1), 0.10));
    provider.add_dividend(DividendEvent::new("X.KL", d(2022, 6, 1), 0.12));
    provider.add_dividend(DividendEvent::new("X.KL", d(2023, 6, 1), 0.09));

    let window = DateWindow::new(d(2021, 1, 1), d(2023, 12, 31)).unwrap();
    let report = pipeline()
        .run(&provider, &[Company::new("X", "X.KL")], window)
        .unwrap();

    let annual = &report.annual;
    assert_eq!(annual.len(), 3);
    assert_eq!(annual[0].yoy_growth, None);
    assert_relative_eq!(annual[1].yoy_growth.unwrap(), 0.20, epsilon = 1e-9);
    assert_relative_eq!(annual[2].yoy_growth.unwrap(), -0.25, epsilon = 1e-9);

    let scored = report.scored_for("X.KL").unwrap();
    assert_eq!(scored.metrics.cuts, Some(1));
    assert_relative_eq!(scored.metrics.cagr.unwrap(), -0.0513, epsilon = 1e-4);
    assert_eq!(scored.metrics.coverage, Some(1.0));
}

#[test]
fn test_company_with_no_dividends_ever() {
    let provider = InMemoryProvider::new();
    let window = DateWindow::new(d(2020, 1, 1), d(2023, 12, 31)).unwrap();
    let report = pipeline()
        .run(&provider, &[Company::new("Y", "Y.KL")], window)
        .unwrap();

    let y = report.scored_for("Y.KL").unwrap();
    assert_eq!(y.metrics.coverage, None);
    assert_eq!(y.metrics.cagr, None);
    assert_eq!(y.metrics.ttm_yield.value(), None);
    assert_eq!(y.persona, Persona::Speculative);
    assert!(report
        .notices
        .contains(&CompanyNotice::NoDividends { company: Company::new("Y", "Y.KL") }));
}

#[test]
fn test_rule_priority_between_two_companies() {
    let mut provider = InMemoryProvider::new();
    // D: paid in 9 of 10 years, flat amounts
    for year in 2014..=2023 {
        if year != 2017 {
            provider.add_dividend(DividendEvent::new("D.KL", d(year, 6, 1), 0.05));
        }
    }
    // G: two out of four years, growing 8% a year
    provider.add_dividend(DividendEvent::new("G.KL", d(2020, 6, 1), 0.100));
    provider.add_dividend(DividendEvent::new("G.KL", d(2023, 6, 1), 0.100 * 1.08f64.powi(3)));

    let window = DateWindow::new(d(2014, 1, 1), d(2023, 12, 31)).unwrap();
    let companies = [Company::new("D", "D.KL"), Company::new("G", "G.KL")];
    let report = pipeline().run(&provider, &companies, window).unwrap();

    let defensive = report.scored_for("D.KL").unwrap();
    assert_relative_eq!(defensive.metrics.coverage.unwrap(), 0.9);
    assert_eq!(defensive.persona, Persona::Defensive);

    let growth = report.scored_for("G.KL").unwrap();
    assert_relative_eq!(growth.metrics.coverage.unwrap(), 0.5);
    assert_relative_eq!(growth.metrics.cagr.unwrap(), 0.08, epsilon = 1e-9);
    assert_eq!(growth.persona, Persona::Growth);
}

#[test]
fn test_yield_seeking_from_prices() {
    let mut provider = InMemoryProvider::new();
    provider.add_dividend(DividendEvent::new("Y.KL", d(2021, 5, 1), 0.06));
    provider.add_dividend(DividendEvent::new("Y.KL", d(2023, 5, 1), 0.03));
    provider.add_dividend(DividendEvent::new("Y.KL", d(2023, 11, 1), 0.03));
    for month in 1..=12 {
        provider.add_price("Y.KL", PricePoint::new(d(2023, month, 10), 1.0, None));
    }

    let window = DateWindow::new(d(2021, 1, 1), d(2023, 12, 31)).unwrap();
    let report = pipeline()
        .run(&provider, &[Company::new("Y", "Y.KL")], window)
        .unwrap();
    let scored = report.scored_for("Y.KL").unwrap();

    assert_relative_eq!(scored.metrics.ttm_yield.value().unwrap(), 0.06, epsilon = 1e-9);
    // coverage 2/3 fails Defensive, flat CAGR fails Growth
    assert_eq!(scored.persona, Persona::YieldSeeking);
    assert!(report.notices.is_empty());
}

#[test]
fn test_missing_prices_leave_yield_undefined() {
    let mut provider = InMemoryProvider::new();
    provider.add_dividend(DividendEvent::new("P.KL", d(2023, 5, 1), 0.03));
    let window = DateWindow::new(d(2023, 1, 1), d(2023, 12, 31)).unwrap();
    let report = pipeline()
        .run(&provider, &[Company::new("P", "P.KL")], window)
        .unwrap();

    let scored = report.scored_for("P.KL").unwrap();
    assert_eq!(scored.metrics.ttm_yield, YieldObservation::NoPriceData);
    assert_eq!(scored.scores.yield_, None);
    assert!(report
        .notices
        .iter()
        .any(|n| matches!(n, CompanyNotice::NoPrices { .. })));
}

#[test]
fn test_partial_failure_keeps_other_companies() {
    let mut provider = InMemoryProvider::new();
    provider.add_dividend(DividendEvent::new("5789.KL", d(2023, 5, 1), 0.03));
    provider.fail_ticker("8664.KL", "connection reset");

    let universe = Universe::default();
    let (companies, _) = universe.resolve(&["LBS Bina", "S P Setia"]);
    let window = DateWindow::new(d(2020, 1, 1), d(2023, 12, 31)).unwrap();
    let report = pipeline().run(&provider, &companies, window).unwrap();

    assert_eq!(report.companies.len(), 1);
    assert_eq!(report.scored.len(), 1);
    assert_eq!(report.warnings[0].company.name, "S P Setia");
    assert_eq!(period_totals(&report)[0].company, "LBS Bina");
}

#[test]
fn test_csv_source_through_cache() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("dividends.csv"),
        "Ticker,Date,Dividend\n\
         5789.KL,2021-06-01,0.02\n\
         5789.KL,2022-06-01,0.025\n\
         5789.KL,2023-06-01,0.03\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("prices.csv"),
        "Ticker,Date,Close,Adj Close\n\
         5789.KL,2023-03-01,0.60,\n\
         5789.KL,2023-09-01,0.60,\n",
    )
    .unwrap();

    let provider = CachingProvider::new(CsvProvider::open(dir.path()).unwrap());
    let window = DateWindow::new(d(2020, 1, 1), d(2023, 12, 31)).unwrap();
    let companies = [Company::new("LBS Bina", "5789.KL")];

    let first = pipeline().run(&provider, &companies, window).unwrap();
    let second = pipeline().run(&provider, &companies, window).unwrap();
    assert_eq!(first.scored, second.scored);

    let rows = annual_rows(&first);
    assert_eq!(rows.len(), 3);
    assert_relative_eq!(rows[2].yoy_growth.unwrap(), 0.2, epsilon = 1e-9);
    assert_relative_eq!(
        first.scored[0].metrics.ttm_yield.value().unwrap(),
        0.05,
        epsilon = 1e-9
    );
}

#[test]
fn test_custom_weights_change_composite() {
    let mut provider = InMemoryProvider::new();
    for year in 2019..=2023 {
        provider.add_dividend(DividendEvent::new("A.KL", d(year, 6, 1), 0.05));
    }
    let window = DateWindow::new(d(2019, 1, 1), d(2023, 12, 31)).unwrap();
    let companies = [Company::new("A", "A.KL")];

    let mut config = PipelineConfig::default();
    config.weights.consistency = 1.0;
    config.weights.growth = 0.0;
    config.weights.yield_ = 0.0;
    config.weights.stability = 0.0;
    let report = DividendPipeline::new(config)
        .unwrap()
        .run(&provider, &companies, window)
        .unwrap();

    assert_relative_eq!(report.scored[0].composite, 100.0, epsilon = 1e-9);
}

#[test]
fn test_csv_bad_row_excludes_only_that_company() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("dividends.csv"),
        "Ticker,Date,Dividend\n\
         5789.KL,2022-06-01,0.02\n\
         5789.KL,2023-06-01,0.03\n\
         8583.KL,06/01/2022,0.05\n",
    )
    .unwrap();

    let provider = CsvProvider::open(dir.path()).unwrap();
    let universe = Universe::default();
    let (companies, _) = universe.resolve(&["LBS Bina", "Mah Sing"]);
    let window = DateWindow::new(d(2020, 1, 1), d(2023, 12, 31)).unwrap();
    let report = pipeline().run(&provider, &companies, window).unwrap();

    assert_eq!(report.scored.len(), 1);
    assert_eq!(report.scored[0].metrics.ticker, "5789.KL");
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].company.name, "Mah Sing");
    assert!(report.warnings[0].reason.contains("Malformed data"));
}
