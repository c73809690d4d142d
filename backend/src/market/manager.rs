//! Market state manager
//!
//! Each tick the manager recomputes the deterministic trend from closed-form
//! curves, advances shock timers, draws new shocks and overlays the active
//! shock on the trend:
//!
//! ```text
//! sustainability(t) = min(1, s0 · (1 + g)^t)
//! technology(t)     = 1 − (1 − a0) · e^(−k·t)
//! confidence(t)     = c0 + A · sin(2π t / cycle)
//! growth_i(t)       = base_i (+ 0.05 · technology for high-performance luxury)
//! saturation_i(t)   = min(0.95, sat0_i + growth_i · t / 120)
//! ```
//!
//! Because the trend is recomputed from `t` and the shock is only an overlay,
//! indicators return exactly to trend when a shock expires.

use crate::market::shock::{ActiveShock, ShockKind, ShockRecord, ShockSpec, ShockTransition};
use crate::models::Segment;
use crate::orchestrator::config::ConfigError;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Documented range for annual segment growth rates
pub const GROWTH_RANGE: (f64, f64) = (-0.5, 1.0);
/// Documented range for the cost-pressure multiplier
pub const COST_PRESSURE_RANGE: (f64, f64) = (1.0, 2.0);

const MAX_SATURATION: f64 = 0.95;

/// Trend parameters and the shock table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub shocks: Vec<ShockSpec>,
    pub initial_sustainability: f64,
    /// Relative rise per tick (0.005 = +0.5%)
    pub sustainability_growth_per_tick: f64,
    pub initial_technology_adoption: f64,
    /// Saturating-exponential rate per tick
    pub technology_adoption_rate: f64,
    pub confidence_baseline: f64,
    pub confidence_amplitude: f64,
    pub confidence_cycle_ticks: usize,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            shocks: ShockSpec::defaults(),
            initial_sustainability: 0.3,
            sustainability_growth_per_tick: 0.005,
            initial_technology_adoption: 0.1,
            technology_adoption_rate: 0.03,
            confidence_baseline: 0.7,
            confidence_amplitude: 0.1,
            confidence_cycle_ticks: 48,
        }
    }
}

impl MarketConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidParameter {
            field: format!("market.{}", field),
            reason: reason.to_string(),
        };
        for spec in &self.shocks {
            if !(0.0..=1.0).contains(&spec.annual_probability) {
                return Err(invalid("shocks.annual_probability", "must be within [0, 1]"));
            }
            if !(spec.magnitude_min >= 0.0 && spec.magnitude_min <= spec.magnitude_max) {
                return Err(invalid("shocks.magnitude", "need 0 <= min <= max"));
            }
            if spec.magnitude_max > 1.0 {
                return Err(invalid("shocks.magnitude_max", "must be <= 1"));
            }
        }
        if !(0.0..=1.0).contains(&self.initial_sustainability)
            || !(0.0..=1.0).contains(&self.initial_technology_adoption)
            || !(0.0..=1.0).contains(&self.confidence_baseline)
        {
            return Err(invalid("initial_*", "must be within [0, 1]"));
        }
        if !(self.sustainability_growth_per_tick >= 0.0 && self.technology_adoption_rate >= 0.0) {
            return Err(invalid("trend rates", "must be >= 0"));
        }
        if self.confidence_cycle_ticks == 0 {
            return Err(ConfigError::NonPositive {
                field: "market.confidence_cycle_ticks".to_string(),
            });
        }
        Ok(())
    }
}

/// Macro indicators at one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketState {
    pub tick: usize,
    /// [0, 1]
    pub sustainability_importance: f64,
    /// [0, 1]
    pub technology_adoption: f64,
    /// [0, 1]
    pub economic_confidence: f64,
    /// Multiplier on realized unit cost, within `COST_PRESSURE_RANGE`
    pub cost_pressure: f64,
    /// Annual growth per segment, within `GROWTH_RANGE`
    pub segment_growth: [f64; 7],
    /// [0, 0.95]
    pub segment_saturation: [f64; 7],
    pub active_shock: Option<ActiveShock>,
}

impl MarketState {
    pub fn growth(&self, segment: Segment) -> f64 {
        self.segment_growth[segment.index()]
    }

    pub fn saturation(&self, segment: Segment) -> f64 {
        self.segment_saturation[segment.index()]
    }

    pub fn is_within_bounds(&self) -> bool {
        let unit = |v: f64| (0.0..=1.0).contains(&v);
        unit(self.sustainability_importance)
            && unit(self.technology_adoption)
            && unit(self.economic_confidence)
            && (COST_PRESSURE_RANGE.0..=COST_PRESSURE_RANGE.1).contains(&self.cost_pressure)
            && self
                .segment_growth
                .iter()
                .all(|g| (GROWTH_RANGE.0..=GROWTH_RANGE.1).contains(g))
            && self
                .segment_saturation
                .iter()
                .all(|s| (0.0..=MAX_SATURATION).contains(s))
    }
}

/// Owns the market state for one run
pub struct MarketStateManager {
    config: MarketConfig,
    state: MarketState,
    active: Option<ActiveShock>,
    history: Vec<ShockRecord>,
    transitions: Vec<ShockTransition>,
}

impl MarketStateManager {
    pub fn new(config: MarketConfig) -> Self {
        let state = trend(&config, 0);
        Self {
            config,
            state,
            active: None,
            history: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Advance to `tick` and return the new state
    ///
    /// Every configured shock is drawn every tick, so the RNG stream consumed
    /// does not depend on whether a shock is already active.
    pub fn advance(&mut self, tick: usize, rng: &mut RngManager) -> MarketState {
        self.transitions.clear();

        if let Some(mut shock) = self.active.take() {
            shock.remaining_ticks = shock.remaining_ticks.saturating_sub(1);
            if shock.remaining_ticks == 0 {
                tracing::debug!(target: "sim.market", tick, kind = ?shock.kind, "Shock expired");
                self.transitions.push(ShockTransition::Ended {
                    kind: shock.kind,
                    tick,
                });
            } else {
                self.active = Some(shock);
            }
        }

        for spec in &self.config.shocks {
            let fired = rng.bernoulli(spec.per_tick_probability());
            if !fired || self.active.is_some() {
                continue;
            }

            let magnitude = if spec.magnitude_max > spec.magnitude_min {
                rng.uniform(spec.magnitude_min, spec.magnitude_max)
            } else {
                spec.magnitude_min
            };
            let duration_ticks = 3 * rng.range(1, 4) as usize;
            let record = ShockRecord {
                kind: spec.kind,
                onset_tick: tick,
                magnitude,
                duration_ticks,
            };
            tracing::debug!(
                target: "sim.market",
                tick,
                kind = ?spec.kind,
                magnitude,
                duration_ticks,
                "Shock started"
            );

            self.active = Some(ActiveShock {
                kind: spec.kind,
                magnitude,
                onset_tick: tick,
                duration_ticks,
                remaining_ticks: duration_ticks,
            });
            self.history.push(record.clone());
            self.transitions.push(ShockTransition::Started(record));
        }

        let mut state = trend(&self.config, tick);
        if let Some(shock) = &self.active {
            apply_shock(&mut state, shock);
        }
        clamp(&mut state);
        state.active_shock = self.active.clone();

        self.state = state.clone();
        self.state.clone()
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    /// All shocks fired so far, in onset order
    pub fn shock_history(&self) -> &[ShockRecord] {
        &self.history
    }

    /// Shock starts and expiries from the latest `advance`
    pub fn last_transitions(&self) -> &[ShockTransition] {
        &self.transitions
    }
}

/// Deterministic trend with no shock applied
pub fn trend(config: &MarketConfig, tick: usize) -> MarketState {
    let t = tick as f64;

    let sustainability = (config.initial_sustainability
        * (1.0 + config.sustainability_growth_per_tick).powf(t))
    .min(1.0);
    let technology =
        1.0 - (1.0 - config.initial_technology_adoption) * (-config.technology_adoption_rate * t).exp();
    let confidence = config.confidence_baseline
        + config.confidence_amplitude * (2.0 * PI * t / config.confidence_cycle_ticks as f64).sin();

    let mut segment_growth = [0.0; 7];
    let mut segment_saturation = [0.0; 7];
    for segment in Segment::ALL {
        let i = segment.index();
        let mut growth = segment.base_growth();
        if segment == Segment::HighPerformanceLuxury {
            growth += 0.05 * technology;
        }
        segment_growth[i] = growth;
        segment_saturation[i] = (segment.base_saturation() + growth * t / 120.0).min(MAX_SATURATION);
    }

    MarketState {
        tick,
        sustainability_importance: sustainability,
        technology_adoption: technology,
        economic_confidence: confidence,
        cost_pressure: 1.0,
        segment_growth,
        segment_saturation,
        active_shock: None,
    }
}

fn apply_shock(state: &mut MarketState, shock: &ActiveShock) {
    let m = shock.magnitude;
    match shock.kind {
        ShockKind::SupplyDisruption => {
            state.cost_pressure = 1.0 + m;
            state.economic_confidence -= m / 2.0;
            for segment in [
                Segment::CoreTechnicalSportswear,
                Segment::OutdoorTechnical,
                Segment::Athleisure,
            ] {
                state.segment_growth[segment.index()] -= 0.4 * m;
            }
        }
        ShockKind::LuxuryBoom => {
            for segment in Segment::ALL.iter().filter(|s| s.is_upper_market()) {
                state.segment_growth[segment.index()] += 0.2 * m;
            }
            state.economic_confidence += 0.1 * m;
        }
        ShockKind::SustainabilityRegulation => {
            state.sustainability_importance += m;
        }
        ShockKind::EconomicDownturn => {
            state.economic_confidence *= 1.0 - m;
            for growth in state.segment_growth.iter_mut() {
                *growth -= 0.1 * m;
            }
        }
    }
}

fn clamp(state: &mut MarketState) {
    state.sustainability_importance = state.sustainability_importance.clamp(0.0, 1.0);
    state.technology_adoption = state.technology_adoption.clamp(0.0, 1.0);
    state.economic_confidence = state.economic_confidence.clamp(0.0, 1.0);
    state.cost_pressure = state
        .cost_pressure
        .clamp(COST_PRESSURE_RANGE.0, COST_PRESSURE_RANGE.1);
    for growth in state.segment_growth.iter_mut() {
        *growth = growth.clamp(GROWTH_RANGE.0, GROWTH_RANGE.1);
    }
    for saturation in state.segment_saturation.iter_mut() {
        *saturation = saturation.clamp(0.0, MAX_SATURATION);
    }
}
