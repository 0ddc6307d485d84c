//! Persona classification
//!
//! Rules are checked in a fixed order and the first match wins, so a company
//! that is both Defensive and Growth is labelled Defensive.

use super::metrics::CompanyMetricBundle;
use crate::config::ClassifierThresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Persona {
    Defensive,
    Growth,
    #[serde(rename = "Yield-seeking")]
    YieldSeeking,
    Speculative,
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::Defensive,
        Persona::Growth,
        Persona::YieldSeeking,
        Persona::Speculative,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Persona::Defensive => "Defensive",
            Persona::Growth => "Growth",
            Persona::YieldSeeking => "Yield-seeking",
            Persona::Speculative => "Speculative",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn is_defensive(bundle: &CompanyMetricBundle, t: &ClassifierThresholds) -> bool {
    let covered = matches!(bundle.coverage, Some(c) if c >= t.defensive_min_coverage);
    let steady = bundle
        .coefficient_of_variation
        .map_or(true, |cv| cv <= t.defensive_max_cv);
    let rarely_cut = bundle.cuts.map_or(true, |n| n <= t.defensive_max_cuts);
    covered && steady && rarely_cut
}

/// Label a company from its raw (un-defaulted) metrics
pub fn classify(bundle: &CompanyMetricBundle, thresholds: &ClassifierThresholds) -> Persona {
    if is_defensive(bundle, thresholds) {
        Persona::Defensive
    } else if matches!(bundle.cagr, Some(g) if g >= thresholds.growth_min_cagr) {
        Persona::Growth
    } else if matches!(bundle.ttm_yield.value(), Some(y) if y >= thresholds.yield_min_ttm) {
        Persona::YieldSeeking
    } else {
        Persona::Speculative
    }
}
