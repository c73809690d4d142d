//! Annual renewal
//!
//! ```text
//! p = clamp(base_rate × performance × relationship × market_factor, 0, 1)
//! ```
//!
//! - performance: realized margin against the model's target, capped at 1.2
//! - relationship: weighted delivery, quality and collaboration sub-scores
//! - market_factor: growth of the brand's primary segment, within [0.8, 1.2]

use crate::market::MarketState;
use crate::models::{ComplexityTier, ModelParams, Partnership, Segment};
use crate::rng::RngManager;
use rand_distr::{Distribution, StandardNormal};
use serde::Serialize;

/// Standard deviation of each relationship sub-score
const RELATIONSHIP_NOISE_SD: f64 = 0.05;

/// Weights for (delivery, quality, collaboration)
pub const RELATIONSHIP_WEIGHTS: [f64; 3] = [0.40, 0.35, 0.25];

/// Inputs and result of one renewal probability
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenewalAssessment {
    pub performance: f64,
    pub relationship: f64,
    pub market_factor: f64,
    pub probability: f64,
}

/// Combine the factors into a probability in [0, 1]
///
/// # Example
/// ```
/// use partnership_simulator_core_rs::orchestrator::renewal::continuation_probability;
///
/// assert_eq!(continuation_probability(0.85, 1.2, 1.0, 1.2), 1.0);
/// assert_eq!(continuation_probability(0.85, 0.0, 0.9, 1.0), 0.0);
/// ```
pub fn continuation_probability(base_rate: f64, performance: f64, relationship: f64, market_factor: f64) -> f64 {
    let p = base_rate * performance * relationship * market_factor;
    if p.is_nan() {
        return 0.0;
    }
    p.clamp(0.0, 1.0)
}

/// `min(1.2, max(0, actual_margin) / target_margin)`
pub fn performance_factor(actual_margin: f64, target_margin: f64) -> f64 {
    if target_margin <= 0.0 {
        return 0.0;
    }
    (actual_margin.max(0.0) / target_margin).min(1.2)
}

pub fn relationship_score(delivery: f64, quality: f64, collaboration: f64) -> f64 {
    RELATIONSHIP_WEIGHTS[0] * delivery + RELATIONSHIP_WEIGHTS[1] * quality + RELATIONSHIP_WEIGHTS[2] * collaboration
}

/// `clamp(1 + 2 × growth, 0.8, 1.2)`
pub fn market_factor(segment_growth: f64) -> f64 {
    (1.0 + 2.0 * segment_growth).clamp(0.8, 1.2)
}

/// Assess one partnership at a year boundary
///
/// Draws three normal sub-scores from `rng`, in delivery, quality,
/// collaboration order.
pub fn assess(
    partnership: &Partnership,
    complexity: ComplexityTier,
    primary_segment: Segment,
    params: &ModelParams,
    market: &MarketState,
    rng: &mut RngManager,
) -> RenewalAssessment {
    let performance = performance_factor(partnership.margin_under(market.cost_pressure), params.target_margin);

    let mut noisy = |base: f64| {
        let z: f64 = StandardNormal.sample(rng);
        (base + RELATIONSHIP_NOISE_SD * z).clamp(0.0, 1.0)
    };
    let delivery = noisy(0.9 - (market.cost_pressure - 1.0));
    let quality = noisy(complexity.quality_base());
    let collaboration = noisy(params.collaboration_base);
    let relationship = relationship_score(delivery, quality, collaboration);

    let market_factor = market_factor(market.growth(primary_segment));

    RenewalAssessment {
        performance,
        relationship,
        market_factor,
        probability: continuation_probability(params.base_renewal_rate, performance, relationship, market_factor),
    }
}
