//! Market shocks
//!
//! A shock is a temporary perturbation layered over the trend. Only one can
//! be active; when it expires the overlay is simply no longer applied.

use crate::core::TICKS_PER_YEAR;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockKind {
    /// Input costs jump, technical segments slow
    SupplyDisruption,
    /// Upper-market segments accelerate
    LuxuryBoom,
    /// Sustainability importance jumps
    SustainabilityRegulation,
    /// Confidence and growth fall everywhere
    EconomicDownturn,
}

/// Configured shock: annual probability and magnitude range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockSpec {
    pub kind: ShockKind,
    pub annual_probability: f64,
    pub magnitude_min: f64,
    pub magnitude_max: f64,
}

impl ShockSpec {
    /// Equivalent per-tick probability: `1 − (1 − p_annual)^(1/12)`
    ///
    /// # Example
    /// ```
    /// use partnership_simulator_core_rs::market::{ShockKind, ShockSpec};
    ///
    /// let spec = ShockSpec {
    ///     kind: ShockKind::SupplyDisruption,
    ///     annual_probability: 0.10,
    ///     magnitude_min: 0.1,
    ///     magnitude_max: 0.3,
    /// };
    /// let p = spec.per_tick_probability();
    /// let annual = 1.0 - (1.0 - p).powi(12);
    /// assert!((annual - 0.10).abs() < 1e-12);
    /// ```
    pub fn per_tick_probability(&self) -> f64 {
        1.0 - (1.0 - self.annual_probability).powf(1.0 / TICKS_PER_YEAR as f64)
    }

    pub fn defaults() -> Vec<ShockSpec> {
        vec![
            ShockSpec {
                kind: ShockKind::SupplyDisruption,
                annual_probability: 0.10,
                magnitude_min: 0.10,
                magnitude_max: 0.30,
            },
            ShockSpec {
                kind: ShockKind::LuxuryBoom,
                annual_probability: 0.15,
                magnitude_min: 0.20,
                magnitude_max: 0.50,
            },
            ShockSpec {
                kind: ShockKind::SustainabilityRegulation,
                annual_probability: 0.20,
                magnitude_min: 0.10,
                magnitude_max: 0.30,
            },
            ShockSpec {
                kind: ShockKind::EconomicDownturn,
                annual_probability: 0.08,
                magnitude_min: 0.20,
                magnitude_max: 0.50,
            },
        ]
    }
}

/// The shock currently perturbing the market
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveShock {
    pub kind: ShockKind,
    pub magnitude: f64,
    pub onset_tick: usize,
    pub duration_ticks: usize,
    pub remaining_ticks: usize,
}

/// Historical record of a shock that fired during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShockRecord {
    pub kind: ShockKind,
    pub onset_tick: usize,
    pub magnitude: f64,
    pub duration_ticks: usize,
}

/// Shock lifecycle change produced by one `advance` call
#[derive(Debug, Clone, PartialEq)]
pub enum ShockTransition {
    Started(ShockRecord),
    Ended { kind: ShockKind, tick: usize },
}
