//! Dividend analytics
//!
//! Stages run strictly downward: events are aggregated to annual totals,
//! reduced to per-company metrics, normalized onto [0, 1], scored and
//! classified. Every stage is a pure function of its inputs.
//!
//! Undefined values are `Option::None` all the way to the scorer, which is the
//! only place they are read as 0.

pub mod aggregate;
pub mod classify;
pub mod consistency;
pub mod growth;
pub mod metrics;
pub mod normalize;
pub mod payout_yield;
pub mod score;
pub mod volatility;

pub use aggregate::{aggregate_annual, filter_window, AnnualDividend};
pub use classify::{classify, Persona};
pub use consistency::{consistency, ConsistencyMetrics};
pub use growth::cagr;
pub use metrics::{extract_metrics, CompanyMetricBundle, MetricInputs};
pub use normalize::{normalize, peer_max_streak, SubScores};
pub use payout_yield::{window_yield, WindowYield, YieldObservation};
pub use score::{composite_score, score_companies, ScoredCompany};
pub use volatility::{volatility, VolatilityMetrics};
