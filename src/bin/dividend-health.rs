//! dividend-health CLI - score dividend behaviour across a peer group
//!
//! ## Example Usage
//!
//! ```bash
//! # List the configured companies
//! dividend-health companies
//!
//! # Score LBS Bina against two peers from Yahoo Finance
//! dividend-health score -C "LBS Bina" -C "Mah Sing" -C "Sunway" --start 2018-01-01
//!
//! # Same, from CSV exports, writing the score table
//! dividend-health score --source csv --data-dir ./data --all -o scores.csv
//!
//! # Annual totals with year-over-year growth
//! dividend-health annual -C "LBS Bina" --source csv --data-dir ./data
//! ```

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use dividend_health::config::PipelineConfig;
use dividend_health::data::{CachingProvider, CsvProvider, MarketDataProvider};
use dividend_health::error::DividendError;
use dividend_health::pipeline::{DividendPipeline, PipelineReport};
use dividend_health::report::{self, annual_rows, event_rows, period_totals, score_rows};
use dividend_health::types::DateWindow;
use dividend_health::universe::{Company, Universe};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

/// dividend-health: dividend consistency, growth and yield scoring
#[derive(Parser)]
#[command(name = "dividend-health")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dividend health scoring for listed property developers", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured companies and tickers
    Companies,

    /// Score and classify the selected companies
    Score {
        #[command(flatten)]
        query: QueryArgs,

        /// Output file for results (.csv scores or .json full report)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Annual dividend totals with year-over-year growth
    Annual {
        #[command(flatten)]
        query: QueryArgs,

        /// Write the annual table as CSV
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Dividend events and per-company totals in the period
    Events {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show configuration and build information
    Info,
}

#[derive(Args, Clone)]
struct QueryArgs {
    /// Company display name (repeatable); defaults to the base company
    #[arg(short = 'C', long = "company")]
    companies: Vec<String>,

    /// Use every configured company
    #[arg(long, conflicts_with = "companies")]
    all: bool,

    /// Start date (YYYY-MM-DD)
    #[arg(short = 's', long, default_value = "2020-01-01")]
    start: String,

    /// End date (YYYY-MM-DD), defaults to today
    #[arg(short = 'e', long)]
    end: Option<String>,

    /// Market data source
    #[arg(long, value_enum, default_value_t = Source::Yahoo)]
    source: Source,

    /// Directory with dividends.csv / prices.csv for the csv source
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    Yahoo,
    Csv,
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Config {
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    #[serde(default = "default_cache_ttl")]
    cache_ttl_secs: u64,
    #[serde(default)]
    pipeline: PipelineConfig,
    #[serde(default)]
    universe: Option<Universe>,
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dividend-health")
        .join("data")
}

fn default_cache_ttl() -> u64 {
    60 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            cache_ttl_secs: default_cache_ttl(),
            pipeline: PipelineConfig::default(),
            universe: None,
        }
    }
}

impl Config {
    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".dividend-health").join("config.toml"))
    }

    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    bail!("config file not found: {}", p.display());
                }
                p.to_path_buf()
            }
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Ok(Config::default()),
            },
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.pipeline.validate()?;
        Ok(config)
    }

    fn universe(&self) -> Universe {
        self.universe.clone().unwrap_or_default()
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = Config::load(cli.config.as_deref()).and_then(|config| {
        if cli.verbose {
            println!(
                "{} v{}",
                "dividend-health".cyan().bold(),
                env!("CARGO_PKG_VERSION")
            );
            println!("Data dir: {}", config.data_dir.display().to_string().dimmed());
        }

        match cli.command {
            Commands::Companies => list_companies(&config),
            Commands::Score { query, output } => run_score(&config, &query, output.as_deref()),
            Commands::Annual { query, output } => run_annual(&config, &query, output.as_deref()),
            Commands::Events { query } => run_events(&config, &query),
            Commands::Info => show_info(&config),
        }
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date {:?}, expected YYYY-MM-DD", raw))
}

fn query_window(query: &QueryArgs) -> anyhow::Result<DateWindow> {
    let start = parse_date(&query.start)?;
    let end = match &query.end {
        Some(raw) => parse_date(raw)?,
        None => Utc::now().date_naive(),
    };
    Ok(DateWindow::new(start, end)?)
}

fn selected_companies(config: &Config, query: &QueryArgs) -> anyhow::Result<Vec<Company>> {
    let universe = config.universe();
    if query.all {
        return Ok(universe.companies().cloned().collect());
    }
    if query.companies.is_empty() {
        return Ok(vec![universe.base.clone()]);
    }

    let (known, unknown) = universe.resolve(&query.companies);
    for name in &unknown {
        eprintln!("{} unknown company {:?}, skipping", "Warning:".yellow(), name);
    }
    if known.is_empty() {
        return Err(DividendError::UnknownCompany(unknown.join(", ")))
            .context("select at least one known company (see `dividend-health companies`)");
    }
    Ok(known)
}

fn build_provider(config: &Config, query: &QueryArgs) -> anyhow::Result<Box<dyn MarketDataProvider>> {
    match query.source {
        Source::Csv => {
            let dir = query.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
            Ok(Box::new(CsvProvider::open(&dir)?))
        }
        #[cfg(feature = "yahoo")]
        Source::Yahoo => {
            let tz = config.pipeline.timezone()?;
            Ok(Box::new(dividend_health::data::YahooFinanceSource::new(tz)?))
        }
        #[cfg(not(feature = "yahoo"))]
        Source::Yahoo => bail!("this build has no Yahoo support, rebuild with --features yahoo or use --source csv"),
    }
}

fn run_pipeline<P: MarketDataProvider + ?Sized>(
    pipeline: &DividendPipeline,
    provider: &P,
    companies: &[Company],
    window: DateWindow,
) -> anyhow::Result<PipelineReport> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!(
        "Fetching dividend data from {} for {} companies...",
        provider.name(),
        companies.len()
    ));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let report = pipeline.run(provider, companies, window);
    spinner.finish_and_clear();

    let report = report?;
    for warning in &report.warnings {
        eprintln!("{} {}", "Warning:".yellow(), warning);
    }
    for notice in &report.notices {
        println!("{} {}", "Note:".blue(), notice);
    }
    Ok(report)
}

fn fmt_opt(value: Option<f64>, scale: f64, suffix: &str) -> String {
    match value {
        Some(v) => format!("{:.2}{}", v * scale, suffix),
        None => "n/a".dimmed().to_string(),
    }
}

fn run_score(config: &Config, query: &QueryArgs, output: Option<&Path>) -> anyhow::Result<()> {
    let window = query_window(query)?;
    let companies = selected_companies(config, query)?;
    let pipeline = DividendPipeline::new(config.pipeline.clone())?;
    let provider = CachingProvider::with_ttl(
        build_provider(config, query)?,
        Duration::from_secs(config.cache_ttl_secs),
    );

    let report = run_pipeline(&pipeline, &provider, &companies, window)?;
    print_scores(&report);

    if let Some(path) = output {
        report::export(&report, path)?;
        println!("Results saved to: {}", path.display().to_string().green());
    }
    Ok(())
}

fn print_scores(report: &PipelineReport) {
    println!(
        "{} ({} → {}, TTM from {})",
        "Dividend Health".green().bold(),
        report.window.start,
        report.window.end,
        report.ttm.start
    );
    println!("{}", "===============".green());
    println!(
        "  {:<22} {:>7}  {:<14} {:>9} {:>8} {:>8} {:>5} {:>7}",
        "Company", "Score", "Persona", "Coverage", "CAGR", "TTM yld", "Cuts", "Streak"
    );
    for row in score_rows(report) {
        let persona = match row.persona.as_str() {
            "Defensive" => row.persona.green(),
            "Growth" => row.persona.cyan(),
            "Yield-seeking" => row.persona.yellow(),
            _ => row.persona.red(),
        };
        println!(
            "  {:<22} {:>7.1}  {:<14} {:>9} {:>8} {:>8} {:>5} {:>7}",
            row.company,
            row.composite,
            persona,
            fmt_opt(row.coverage, 100.0, "%"),
            fmt_opt(row.cagr, 100.0, "%"),
            fmt_opt(row.ttm_yield, 100.0, "%"),
            row.cuts.map_or_else(|| "n/a".to_string(), |n| n.to_string()),
            row.longest_streak,
        );
    }
    println!();
    println!(
        "{}",
        "Undefined sub-scores count as 0 in the composite.".dimmed()
    );
}

fn run_annual(config: &Config, query: &QueryArgs, output: Option<&Path>) -> anyhow::Result<()> {
    let window = query_window(query)?;
    let companies = selected_companies(config, query)?;
    let pipeline = DividendPipeline::new(config.pipeline.clone())?;
    let provider = build_provider(config, query)?;
    let report = run_pipeline(&pipeline, provider.as_ref(), &companies, window)?;

    if report.has_no_events() {
        println!("{}", "No dividend events found for this period.".yellow());
        return Ok(());
    }

    println!("{}", "Annual Dividend per Share".green().bold());
    println!("{}", "=========================".green());
    let rows = annual_rows(&report);
    for row in &rows {
        println!(
            "  {:<22} {:>6} {:>10.4} {:>9}",
            row.company,
            row.year,
            row.annual_dividend,
            row.yoy_growth
                .map_or_else(|| "-".to_string(), |g| format!("{:+.1}%", g * 100.0)),
        );
    }
    println!();
    println!(
        "{}",
        "First year per company has no YoY growth since there is no prior year.".dimmed()
    );

    if let Some(path) = output {
        report::write_csv(fs::File::create(path)?, &rows)?;
        println!("Results saved to: {}", path.display().to_string().green());
    }
    Ok(())
}

fn run_events(config: &Config, query: &QueryArgs) -> anyhow::Result<()> {
    let window = query_window(query)?;
    let companies = selected_companies(config, query)?;
    let pipeline = DividendPipeline::new(config.pipeline.clone())?;
    let provider = build_provider(config, query)?;
    let report = run_pipeline(&pipeline, provider.as_ref(), &companies, window)?;

    if report.has_no_events() {
        println!("{}", "No dividend events found for this period.".yellow());
        return Ok(());
    }

    println!("{}", "Total Dividends in Period".green().bold());
    println!("{}", "=========================".green());
    for total in period_totals(&report) {
        println!(
            "  {:<22} {:>10.4}  ({} events)",
            total.company, total.total, total.events
        );
    }
    println!();

    println!("{}", "Dividend Events".green().bold());
    println!("{}", "===============".green());
    for row in event_rows(&report) {
        println!(
            "  {}  {:<22} {:<9} {:>10.4}",
            row.date, row.company, row.ticker, row.dividend
        );
    }
    Ok(())
}

fn list_companies(config: &Config) -> anyhow::Result<()> {
    let universe = config.universe();
    println!("{}", "Companies".bold());
    println!("{}", "=========".dimmed());
    println!("  {:<22} {} {}", universe.base.name, universe.base.ticker, "(base)".dimmed());
    for company in &universe.competitors {
        println!("  {:<22} {}", company.name, company.ticker);
    }
    Ok(())
}

fn feature_status(enabled: bool) -> colored::ColoredString {
    if enabled {
        "enabled".green()
    } else {
        "disabled".dimmed()
    }
}

fn show_info(config: &Config) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "dividend-health".cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();

    let p = &config.pipeline;
    println!("{}", "Configuration".bold());
    println!("{}", "=============".dimmed());
    println!("  {} {}", "Data directory:".bold(), config.data_dir.display());
    println!("  {} {}s", "Cache TTL:".bold(), config.cache_ttl_secs);
    println!("  {} {}", "Exchange time zone:".bold(), p.exchange_timezone);
    println!("  {} {} months", "Trailing yield window:".bold(), p.ttm_months);
    println!(
        "  {} consistency {:.2}, growth {:.2}, yield {:.2}, stability {:.2}",
        "Weights:".bold(),
        p.weights.consistency,
        p.weights.growth,
        p.weights.yield_,
        p.weights.stability
    );
    println!();

    println!("{}", "Features".bold());
    println!("{}", "========".dimmed());
    println!("  {} {}", "Yahoo Finance:".bold(), feature_status(cfg!(feature = "yahoo")));
    println!("  {} {}", "CLI tools:".bold(), feature_status(cfg!(feature = "cli")));
    Ok(())
}
