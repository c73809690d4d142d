//! Per-run brand traits
//!
//! Drawn fresh at the start of every Monte Carlo run from that run's RNG
//! stream. Nothing here outlives the run.

use crate::models::{BrandProfile, Segment};
use crate::rng::RngManager;
use serde::Serialize;

/// Lowest and highest possible acceptance threshold
pub const THRESHOLD_RANGE: (f64, f64) = (30.0, 70.0);

/// Dynamic, run-scoped brand traits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandAgentState {
    risk_appetite: f64,
    decision_speed: f64,
    luxury_move_pressure: f64,
}

impl BrandAgentState {
    /// Build from explicit traits, each clamped to [0, 1]
    ///
    /// # Example
    /// ```
    /// use partnership_simulator_core_rs::agents::BrandAgentState;
    ///
    /// let state = BrandAgentState::new(0.9, 0.5, 0.0);
    /// assert!((state.acceptance_threshold() - 66.0).abs() < 1e-9);
    /// ```
    pub fn new(risk_appetite: f64, decision_speed: f64, luxury_move_pressure: f64) -> Self {
        Self {
            risk_appetite: risk_appetite.clamp(0.0, 1.0),
            decision_speed: decision_speed.clamp(0.0, 1.0),
            luxury_move_pressure: luxury_move_pressure.clamp(0.0, 1.0),
        }
    }

    /// Draw a fresh state for `profile`
    pub fn draw(profile: &BrandProfile, rng: &mut RngManager) -> Self {
        let risk_appetite = rng.next_f64();
        let decision_speed = rng.next_f64();
        let jitter = rng.uniform(-0.1, 0.1);
        let luxury_move_pressure = luxury_move_pressure(profile, jitter);
        Self::new(risk_appetite, decision_speed, luxury_move_pressure)
    }

    pub fn risk_appetite(&self) -> f64 {
        self.risk_appetite
    }

    pub fn decision_speed(&self) -> f64 {
        self.decision_speed
    }

    pub fn luxury_move_pressure(&self) -> f64 {
        self.luxury_move_pressure
    }

    /// `50 + (risk_appetite − 0.5) × 40`, always within [30, 70]
    pub fn acceptance_threshold(&self) -> f64 {
        50.0 + (self.risk_appetite - 0.5) * 40.0
    }

    /// Months between accepting and submitting a request
    pub fn delay_ticks(&self) -> usize {
        ((1.0 - self.decision_speed) * 12.0).round() as usize
    }
}

/// Appetite to move up-market.
///
/// Zero for brands already in high-performance luxury. Otherwise driven by
/// how fashion-led the brand is, its innovation affinity, its functional gap,
/// and whether it sits in a segment adjacent to high-performance luxury.
fn luxury_move_pressure(profile: &BrandProfile, jitter: f64) -> f64 {
    if profile.in_segment(Segment::HighPerformanceLuxury) {
        return 0.0;
    }
    let (function, fashion) = profile.coordinates();
    let base = (fashion - function + 0.8) / 1.6;
    let adjacent = profile.in_segment(Segment::Athluxury) || profile.in_segment(Segment::LuxuryFashion);

    let pressure = 0.5 * base
        + 0.2 * profile.innovation_affinity
        + 0.2 * (1.0 - function)
        + if adjacent { 0.2 } else { 0.0 }
        + jitter;
    pressure.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrganizationType, PricingTier};

    fn profile(segments: Vec<Segment>) -> BrandProfile {
        BrandProfile {
            id: "B".to_string(),
            segments,
            organization: OrganizationType::Public,
            pricing_tier: PricingTier::Luxury,
            annual_revenue_k_eur: 500_000.0,
            average_unit_price: 400.0,
            innovation_affinity: 0.8,
            sustainability_priority: 0.4,
        }
    }

    #[test]
    fn test_high_performance_luxury_has_no_pressure() {
        let mut rng = RngManager::new(11);
        for _ in 0..20 {
            let state = BrandAgentState::draw(&profile(vec![Segment::HighPerformanceLuxury]), &mut rng);
            assert_eq!(state.luxury_move_pressure(), 0.0);
        }
    }

    #[test]
    fn test_fashion_brands_feel_more_pressure() {
        let fashion = luxury_move_pressure(&profile(vec![Segment::LuxuryFashion]), 0.0);
        let technical = luxury_move_pressure(&profile(vec![Segment::CoreTechnicalSportswear]), 0.0);
        assert!(fashion > technical);
    }

    #[test]
    fn test_delay_from_decision_speed() {
        assert_eq!(BrandAgentState::new(0.5, 1.0, 0.0).delay_ticks(), 0);
        assert_eq!(BrandAgentState::new(0.5, 0.0, 0.0).delay_ticks(), 12);
        assert_eq!(BrandAgentState::new(0.5, 0.5, 0.0).delay_ticks(), 6);
    }
}
