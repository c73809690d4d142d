//! Tests for brand agent scoring and decisions
//!
//! Tests cover:
//! - Threshold scenario (risk 0.9 → 66, risk 0.1 → 34)
//! - Acceptance rule `accept ⇔ noisy > threshold` for every decision
//! - Threshold range [30, 70] for every risk appetite
//! - Determinism of evaluate under a fixed seed

use partnership_simulator_core_rs::agents::{BrandAgent, BrandAgentState, Offer, THRESHOLD_RANGE};
use partnership_simulator_core_rs::market::{trend, MarketConfig};
use partnership_simulator_core_rs::models::{
    BrandProfile, ModelParams, OrganizationType, PricingTier, Product, Segment,
};
use partnership_simulator_core_rs::RngManager;
use proptest::prelude::*;

fn profile(segments: Vec<Segment>, tier: PricingTier) -> BrandProfile {
    BrandProfile {
        id: "BRAND_A".to_string(),
        segments,
        organization: OrganizationType::FamilyOwned,
        pricing_tier: tier,
        annual_revenue_k_eur: 150_000.0,
        average_unit_price: 250.0,
        innovation_affinity: 0.6,
        sustainability_priority: 0.5,
    }
}

// ============================================================================
// Threshold scenario
// ============================================================================

#[test]
fn test_threshold_scenario() {
    let brand = profile(vec![Segment::LuxuryActivewear], PricingTier::Premium);

    let bold = BrandAgent::new(&brand, BrandAgentState::new(0.9, 0.5, 0.0));
    let cautious = BrandAgent::new(&brand, BrandAgentState::new(0.1, 0.5, 0.0));

    let bold_decision = bold.decide(70.0, 0.0);
    let cautious_decision = cautious.decide(70.0, 0.0);

    assert!((bold_decision.threshold - 66.0).abs() < 1e-9);
    assert!((cautious_decision.threshold - 34.0).abs() < 1e-9);
    assert!(bold_decision.accept, "70 > 66 should accept");
    assert!(cautious_decision.accept, "70 > 34 should accept");
}

#[test]
fn test_score_equal_to_threshold_rejects() {
    let brand = profile(vec![Segment::Athleisure], PricingTier::Mid);
    let agent = BrandAgent::new(&brand, BrandAgentState::new(0.5, 0.5, 0.0));
    let decision = agent.decide(50.0, 0.0);
    assert!(!decision.accept, "strict inequality: 50 is not above 50");
    assert_eq!(decision.confidence, 0.0);
}

#[test]
fn test_confidence_is_distance_over_hundred() {
    let brand = profile(vec![Segment::Athleisure], PricingTier::Mid);
    let agent = BrandAgent::new(&brand, BrandAgentState::new(0.5, 0.5, 0.0));
    let decision = agent.decide(40.0, -5.0);
    assert!(!decision.accept);
    assert!((decision.confidence - 0.15).abs() < 1e-12);
}

// ============================================================================
// Evaluate
// ============================================================================

#[test]
fn test_evaluate_deterministic() {
    let brand = profile(vec![Segment::Athluxury], PricingTier::Luxury);
    let products = Product::default_portfolio();
    let market = trend(&MarketConfig::default(), 10);
    let params = ModelParams::co_branded();

    let run = |seed: u64| {
        let mut rng = RngManager::new(seed);
        let state = BrandAgentState::draw(&brand, &mut rng);
        let agent = BrandAgent::new(&brand, state);
        products
            .iter()
            .map(|product| {
                let offer = Offer { product, margin: 0.3 };
                agent.evaluate(&offer, &params, &market, &mut rng)
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(2024), run(2024));
    assert_ne!(run(2024), run(2025));
}

#[test]
fn test_evaluate_fills_sub_scores() {
    let brand = profile(vec![Segment::HighPerformanceLuxury], PricingTier::Luxury);
    let products = Product::default_portfolio();
    let market = trend(&MarketConfig::default(), 0);
    let agent = BrandAgent::new(&brand, BrandAgentState::new(0.5, 0.5, 0.0));
    let mut rng = RngManager::new(1);

    let decision = agent.evaluate(
        &Offer {
            product: &products[0],
            margin: 0.2,
        },
        &ModelParams::co_branded(),
        &market,
        &mut rng,
    );
    let sub = decision.sub_scores.expect("evaluate records sub-scores");
    assert!((sub.base_score() - decision.base_score).abs() < 1e-12);
    assert!((decision.noisy_score - (decision.base_score + decision.noise)).abs() < 1e-12);
}

#[test]
fn test_high_margin_hurts_value_tier_more_than_luxury() {
    let products = Product::default_portfolio();
    let market = trend(&MarketConfig::default(), 0);
    let params = ModelParams::co_branded();
    let offer = Offer {
        product: &products[0],
        margin: 0.45,
    };

    let value_brand = profile(vec![Segment::Athleisure], PricingTier::Value);
    let luxury_brand = profile(vec![Segment::Athleisure], PricingTier::Luxury);
    let state = BrandAgentState::new(0.5, 0.5, 0.5);

    let value_fit = BrandAgent::new(&value_brand, state.clone())
        .sub_scores(&offer, &params, &market)
        .price_value_fit;
    let luxury_fit = BrandAgent::new(&luxury_brand, state)
        .sub_scores(&offer, &params, &market)
        .price_value_fit;
    assert!(value_fit < luxury_fit);
}

#[test]
fn test_demand_is_deterministic_and_positive() {
    let brand = profile(vec![Segment::OutdoorTechnical], PricingTier::Premium);
    let products = Product::default_portfolio();
    let agent = BrandAgent::new(&brand, BrandAgentState::new(0.5, 0.5, 0.0));
    let params = ModelParams::white_label();

    let mut a = RngManager::new(3);
    let mut b = RngManager::new(3);
    for product in &products {
        let x = agent.demand_units(product, &params, &mut a);
        let y = agent.demand_units(product, &params, &mut b);
        assert_eq!(x, y);
        assert!(x > 0);
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_threshold_within_range(risk in 0.0_f64..=1.0) {
        let threshold = BrandAgentState::new(risk, 0.5, 0.0).acceptance_threshold();
        prop_assert!(threshold >= THRESHOLD_RANGE.0 - 1e-9);
        prop_assert!(threshold <= THRESHOLD_RANGE.1 + 1e-9);
    }

    #[test]
    fn prop_threshold_clamps_out_of_range_traits(risk in -5.0_f64..5.0) {
        let threshold = BrandAgentState::new(risk, 0.5, 0.0).acceptance_threshold();
        prop_assert!((30.0..=70.0).contains(&threshold));
    }

    #[test]
    fn prop_accept_iff_noisy_above_threshold(
        risk in 0.0_f64..=1.0,
        base in 0.0_f64..=100.0,
        noise in -40.0_f64..40.0,
    ) {
        let brand = profile(vec![Segment::Athluxury], PricingTier::Luxury);
        let agent = BrandAgent::new(&brand, BrandAgentState::new(risk, 0.5, 0.0));
        let decision = agent.decide(base, noise);
        prop_assert_eq!(decision.accept, decision.noisy_score > decision.threshold);
        prop_assert!(decision.confidence >= 0.0);
    }

    #[test]
    fn prop_evaluated_decisions_follow_rule(seed in 1_u64..10_000, tick in 0_usize..120) {
        let brand = profile(vec![Segment::LuxuryFashion, Segment::Athluxury], PricingTier::Luxury);
        let products = Product::default_portfolio();
        let market = trend(&MarketConfig::default(), tick);
        let mut rng = RngManager::new(seed);
        let agent = BrandAgent::new(&brand, BrandAgentState::draw(&brand, &mut rng));

        for params in [ModelParams::co_branded(), ModelParams::white_label()] {
            for product in &products {
                let decision = agent.evaluate(&Offer { product, margin: 0.25 }, &params, &market, &mut rng);
                prop_assert_eq!(decision.accept, decision.noisy_score > decision.threshold);
                prop_assert!((30.0..=70.0).contains(&decision.threshold));
                prop_assert!(decision.delay_ticks <= 12);
                prop_assert!((0.0..=100.0).contains(&decision.base_score));
            }
        }
    }
}
