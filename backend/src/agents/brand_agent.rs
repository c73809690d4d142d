//! Brand agent scoring and decisions
//!
//! A `BrandAgent` pairs an immutable `BrandProfile` with the run's
//! `BrandAgentState`. It scores a product offer on five sub-scores, adds
//! bounded-rationality noise, and compares against its risk-dependent
//! threshold. Agents never mutate shared state; the only side effect is
//! consuming draws from the RNG passed in.

use crate::agents::state::BrandAgentState;
use crate::market::MarketState;
use crate::models::{BrandProfile, ModelParams, Product, ProductCategory};
use crate::rng::RngManager;
use rand_distr::{Distribution, StandardNormal};
use serde::Serialize;

/// Weights for (segment fit, innovation, price-value, synergy, exclusivity)
pub const SCORE_WEIGHTS: [f64; 5] = [0.25, 0.20, 0.20, 0.20, 0.15];

/// Standard deviation of the decision noise, in score points
pub const NOISE_SD: f64 = 10.0;

/// Normalized sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubScores {
    pub segment_fit: f64,
    pub innovation_match: f64,
    pub price_value_fit: f64,
    pub brand_synergy: f64,
    pub exclusivity: f64,
}

impl SubScores {
    /// Weighted sum on a 0-100 scale
    pub fn base_score(&self) -> f64 {
        let values = [
            self.segment_fit,
            self.innovation_match,
            self.price_value_fit,
            self.brand_synergy,
            self.exclusivity,
        ];
        100.0
            * values
                .iter()
                .zip(SCORE_WEIGHTS.iter())
                .map(|(v, w)| v * w)
                .sum::<f64>()
    }
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub accept: bool,
    pub base_score: f64,
    pub noise: f64,
    pub noisy_score: f64,
    pub threshold: f64,
    /// Months before the request reaches the capacity allocator
    pub delay_ticks: usize,
    /// `|noisy_score − threshold| / 100`
    pub confidence: f64,
    pub sub_scores: Option<SubScores>,
}

/// A product as offered to a brand under the current model
#[derive(Debug, Clone, Copy)]
pub struct Offer<'p> {
    pub product: &'p Product,
    /// Supplier gross margin at the quoted price
    pub margin: f64,
}

pub struct BrandAgent<'a> {
    profile: &'a BrandProfile,
    state: BrandAgentState,
}

impl<'a> BrandAgent<'a> {
    pub fn new(profile: &'a BrandProfile, state: BrandAgentState) -> Self {
        Self { profile, state }
    }

    pub fn profile(&self) -> &'a BrandProfile {
        self.profile
    }

    pub fn state(&self) -> &BrandAgentState {
        &self.state
    }

    /// Score an offer and decide
    pub fn evaluate(
        &self,
        offer: &Offer<'_>,
        params: &ModelParams,
        market: &MarketState,
        rng: &mut RngManager,
    ) -> Decision {
        let sub_scores = self.sub_scores(offer, params, market);
        let z: f64 = StandardNormal.sample(rng);
        let mut decision = self.decide(sub_scores.base_score(), NOISE_SD * z);
        decision.sub_scores = Some(sub_scores);
        decision
    }

    /// Acceptance rule: accept iff `base_score + noise > threshold`
    ///
    /// # Example
    /// ```
    /// use partnership_simulator_core_rs::agents::{BrandAgent, BrandAgentState};
    /// use partnership_simulator_core_rs::models::{BrandProfile, OrganizationType, PricingTier, Segment};
    ///
    /// let profile = BrandProfile {
    ///     id: "BRAND_A".to_string(),
    ///     segments: vec![Segment::Athleisure],
    ///     organization: OrganizationType::FamilyOwned,
    ///     pricing_tier: PricingTier::Premium,
    ///     annual_revenue_k_eur: 100_000.0,
    ///     average_unit_price: 120.0,
    ///     innovation_affinity: 0.5,
    ///     sustainability_priority: 0.5,
    /// };
    /// let agent = BrandAgent::new(&profile, BrandAgentState::new(0.9, 0.5, 0.0));
    /// let decision = agent.decide(70.0, 0.0);
    /// assert!(decision.accept);
    /// assert!((decision.threshold - 66.0).abs() < 1e-9);
    /// ```
    pub fn decide(&self, base_score: f64, noise: f64) -> Decision {
        let threshold = self.state.acceptance_threshold();
        let noisy_score = base_score + noise;
        Decision {
            accept: noisy_score > threshold,
            base_score,
            noise,
            noisy_score,
            threshold,
            delay_ticks: self.state.delay_ticks(),
            confidence: (noisy_score - threshold).abs() / 100.0,
            sub_scores: None,
        }
    }

    pub fn sub_scores(
        &self,
        offer: &Offer<'_>,
        params: &ModelParams,
        market: &MarketState,
    ) -> SubScores {
        let profile = self.profile;
        let product = offer.product;

        let (bf, bs) = profile.coordinates();
        let (cf, cs) = product.category.coordinates();
        let distance = ((bf - cf).powi(2) + (bs - cs).powi(2)).sqrt();
        let mut segment_fit = (1.0 - distance / std::f64::consts::SQRT_2).clamp(0.0, 1.0);
        if product.category == ProductCategory::SustainablePerformance {
            segment_fit = 0.7 * segment_fit
                + 0.3 * profile.sustainability_priority * market.sustainability_importance;
        }

        let innovation_match = (product.innovation_score * profile.innovation_affinity).clamp(0.0, 1.0);

        let tolerance = profile.pricing_tier.margin_tolerance();
        let price_fit = if offer.margin <= tolerance {
            1.0
        } else {
            ((1.0 - offer.margin) / (1.0 - tolerance)).clamp(0.0, 1.0)
        };
        let price_value_fit = price_fit * (0.8 + 0.2 * market.economic_confidence);

        let (brand_synergy, exclusivity) = if params.visible_attribution {
            let pressure = self.state.luxury_move_pressure();
            let synergy = if profile.is_upper_market() {
                0.7 + 0.3 * pressure
            } else {
                0.3 + 0.3 * pressure
            };
            let saturation = profile
                .segments
                .iter()
                .map(|s| market.saturation(*s))
                .sum::<f64>()
                / profile.segments.len().max(1) as f64;
            (synergy, 1.0 - saturation)
        } else {
            (params.unattributed_synergy, params.unattributed_exclusivity)
        };

        SubScores {
            segment_fit,
            innovation_match,
            price_value_fit,
            brand_synergy,
            exclusivity: exclusivity.clamp(0.0, 1.0),
        }
    }

    /// Annual units requested for a product
    ///
    /// `production × base_demand_fraction × category_multiplier × innovation_factor × U(0.8, 1.2)`
    pub fn demand_units(&self, product: &Product, params: &ModelParams, rng: &mut RngManager) -> u64 {
        let innovation_factor = 0.75 + 0.5 * product.innovation_score * self.profile.innovation_affinity;
        let units = self.profile.estimated_production()
            * params.base_demand_fraction
            * product.category.demand_multiplier()
            * innovation_factor
            * rng.uniform(0.8, 1.2);
        units.max(0.0).round() as u64
    }
}
