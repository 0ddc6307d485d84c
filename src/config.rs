//! Immutable pipeline configuration
//!
//! Weights, clamp ranges and persona thresholds are plain data passed into
//! the pipeline. Nothing in the analytics layer reads globals.

use crate::error::{DividendError, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Composite score weights, must sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub consistency: f64,
    pub growth: f64,
    #[serde(rename = "yield")]
    pub yield_: f64,
    pub stability: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            consistency: 0.40,
            growth: 0.25,
            yield_: 0.20,
            stability: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn total(&self) -> f64 {
        self.consistency + self.growth + self.yield_ + self.stability
    }
}

/// Closed interval used by the clamp-then-linear-map rule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampRange {
    pub min: f64,
    pub max: f64,
}

impl ClampRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value` into the range and map it linearly onto [0, 1]
    pub fn unit(&self, value: f64) -> f64 {
        (value.clamp(self.min, self.max) - self.min) / (self.max - self.min)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min >= self.max {
            return Err(DividendError::ConfigError(format!(
                "{} range [{}, {}] is empty or not finite",
                name, self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Clamp ranges for the Normalizer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationBounds {
    pub cagr: ClampRange,
    pub ttm_yield: ClampRange,
    pub coefficient_of_variation: ClampRange,
    pub cuts: ClampRange,
}

impl Default for NormalizationBounds {
    fn default() -> Self {
        Self {
            cagr: ClampRange::new(-0.5, 0.5),
            ttm_yield: ClampRange::new(0.0, 0.10),
            coefficient_of_variation: ClampRange::new(0.0, 2.0),
            cuts: ClampRange::new(0.0, 4.0),
        }
    }
}

/// Thresholds for persona rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    pub defensive_min_coverage: f64,
    pub defensive_max_cv: f64,
    pub defensive_max_cuts: usize,
    pub growth_min_cagr: f64,
    pub yield_min_ttm: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            defensive_min_coverage: 0.70,
            defensive_max_cv: 0.60,
            defensive_max_cuts: 1,
            growth_min_cagr: 0.05,
            yield_min_ttm: 0.05,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub weights: ScoreWeights,
    pub bounds: NormalizationBounds,
    pub thresholds: ClassifierThresholds,
    /// Length of the trailing yield window
    pub ttm_months: u32,
    /// IANA zone used to turn provider timestamps into calendar dates
    pub exchange_timezone: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            bounds: NormalizationBounds::default(),
            thresholds: ClassifierThresholds::default(),
            ttm_months: 12,
            exchange_timezone: "Asia/Kuala_Lumpur".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Check weights, ranges and time zone
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("consistency", w.consistency),
            ("growth", w.growth),
            ("yield", w.yield_),
            ("stability", w.stability),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DividendError::ConfigError(format!(
                    "weight {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if (w.total() - 1.0).abs() > 1e-6 {
            return Err(DividendError::ConfigError(format!(
                "weights must sum to 1, got {}",
                w.total()
            )));
        }

        self.bounds.cagr.validate("cagr")?;
        self.bounds.ttm_yield.validate("ttm_yield")?;
        self.bounds
            .coefficient_of_variation
            .validate("coefficient_of_variation")?;
        self.bounds.cuts.validate("cuts")?;

        if self.ttm_months == 0 {
            return Err(DividendError::ConfigError(
                "ttm_months must be at least 1".to_string(),
            ));
        }
        self.timezone()?;
        Ok(())
    }

    /// Parsed exchange time zone
    pub fn timezone(&self) -> Result<Tz> {
        self.exchange_timezone.parse::<Tz>().map_err(|e| {
            DividendError::ConfigError(format!(
                "unknown time zone {}: {}",
                self.exchange_timezone, e
            ))
        })
    }
}
