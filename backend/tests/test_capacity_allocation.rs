//! Tests for greedy capacity allocation
//!
//! Tests cover:
//! - Ranked partial-acceptance scenario (50k / 60k / 1.1M → 210k)
//! - Minimum batch and cap rejections
//! - Capacity and partner-cap invariants under random request sets
//! - Release and efficiency growth

use partnership_simulator_core_rs::capacity::{
    allocate, CapacityConfig, CapacityError, CapacityPool, DemandRequest, GrantKind, RejectionReason,
};
use partnership_simulator_core_rs::models::PartnershipModel;
use proptest::prelude::*;

fn request(brand: &str, product: &str, volume: u64, margin: f64) -> DemandRequest {
    DemandRequest {
        brand_id: brand.to_string(),
        product_id: product.to_string(),
        model: PartnershipModel::CoBranded,
        volume,
        margin,
        strategic_value: 1.0,
        max_product_share: 0.5,
        unit_price: 20.0,
        unit_cost: 15.0,
    }
}

fn unrestricted(brand: &str, product: &str, volume: u64) -> DemandRequest {
    DemandRequest {
        max_product_share: 1.0,
        ..request(brand, product, volume, 0.3)
    }
}

fn million_pool() -> CapacityPool {
    CapacityPool::new(CapacityConfig {
        total_capacity: 1_000_000,
        min_batch_size: 1_000,
        max_partner_allocation: 0.10,
        annual_efficiency_gain: 0.0,
    })
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_ranked_partial_acceptance_scenario() {
    let mut pool = million_pool();
    // Submitted out of order; scores rank them 50k, 60k, 1.1M
    let requests = vec![
        request("BRAND_C", "pcm_inserts", 1_100_000, 0.01),
        request("BRAND_A", "hydrotex_liners", 50_000, 0.5),
        request("BRAND_B", "ecomesh_panels", 60_000, 0.3),
    ];

    let outcome = allocate(&requests, &mut pool);

    assert_eq!(outcome.accepted.len(), 3);
    assert_eq!(outcome.accepted[0].brand_id, "BRAND_A");
    assert_eq!(outcome.accepted[0].kind, GrantKind::Full);
    assert_eq!(outcome.accepted[1].brand_id, "BRAND_B");
    assert_eq!(outcome.accepted[1].kind, GrantKind::Full);

    let third = &outcome.accepted[2];
    assert_eq!(third.brand_id, "BRAND_C");
    assert_eq!(third.kind, GrantKind::Partial);
    assert_eq!(third.granted, 100_000);
    assert!(outcome.halted);

    assert_eq!(outcome.total_granted(), 210_000);
    assert_eq!(pool.committed_units(), 210_000);

    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].brand_id, "BRAND_C");
    assert_eq!(outcome.rejected[0].units, 1_000_000);
    assert_eq!(outcome.rejected[0].reason, RejectionReason::Unfulfilled);
    assert!(pool.check_invariants().is_ok());
}

#[test]
fn test_requests_after_halt_are_rejected() {
    let mut pool = million_pool();
    let requests = vec![
        request("BRAND_A", "hydrotex_liners", 50_000, 0.5),
        request("BRAND_C", "pcm_inserts", 1_100_000, 0.01),
        request("BRAND_D", "ecomesh_panels", 2_000, 0.001),
    ];
    let outcome = allocate(&requests, &mut pool);
    assert!(outcome.halted);
    let late = outcome
        .rejected
        .iter()
        .find(|r| r.brand_id == "BRAND_D")
        .expect("late request rejected");
    assert_eq!(late.reason, RejectionReason::CapacityExhausted);
    assert_eq!(late.units, 2_000);
}

#[test]
fn test_fitting_request_trimmed_by_partner_cap() {
    let mut pool = million_pool();
    let outcome = allocate(&[request("BRAND_A", "hydrotex_liners", 300_000, 0.2)], &mut pool);
    assert_eq!(outcome.accepted[0].granted, 100_000);
    assert_eq!(outcome.accepted[0].kind, GrantKind::Capped);
    assert!(!outcome.halted);
    assert_eq!(outcome.rejected[0].reason, RejectionReason::CappedAtLimit);
    assert_eq!(outcome.rejected[0].units, 200_000);
}

#[test]
fn test_brand_at_cap_rejected() {
    let mut pool = million_pool();
    let requests = vec![
        request("BRAND_A", "hydrotex_liners", 100_000, 0.5),
        request("BRAND_A", "ecomesh_panels", 20_000, 0.1),
    ];
    let outcome = allocate(&requests, &mut pool);
    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.rejected[0].reason, RejectionReason::PartnerCapReached);
    assert_eq!(pool.brand_committed("BRAND_A"), 100_000);
}

#[test]
fn test_product_share_enforced() {
    let mut pool = million_pool();
    let mut a = request("BRAND_A", "pcm_inserts", 90_000, 0.5);
    let mut b = request("BRAND_B", "pcm_inserts", 90_000, 0.4);
    a.max_product_share = 0.1;
    b.max_product_share = 0.1;
    let outcome = allocate(&[a, b], &mut pool);
    assert_eq!(outcome.accepted[0].granted, 90_000);
    // 10k headroom left on the product
    assert_eq!(outcome.accepted[1].granted, 10_000);
    assert_eq!(outcome.accepted[1].kind, GrantKind::Capped);
    assert_eq!(pool.product_committed("pcm_inserts"), 100_000);
}

#[test]
fn test_minimum_batch_boundary() {
    let mut pool = million_pool();
    let outcome = allocate(
        &[
            request("BRAND_A", "hydrotex_liners", 999, 0.9),
            request("BRAND_B", "hydrotex_liners", 1_000, 0.9),
        ],
        &mut pool,
    );
    assert_eq!(outcome.accepted.len(), 1);
    assert_eq!(outcome.accepted[0].brand_id, "BRAND_B");
    assert_eq!(outcome.rejected[0].reason, RejectionReason::BelowMinimumBatch);
}

#[test]
fn test_empty_request_list() {
    let mut pool = million_pool();
    let outcome = allocate(&[], &mut pool);
    assert!(outcome.accepted.is_empty());
    assert!(outcome.rejected.is_empty());
    assert!(!outcome.halted);
}

// ============================================================================
// Pool lifecycle
// ============================================================================

#[test]
fn test_release_frees_room_for_next_pass() {
    let mut pool = CapacityPool::new(CapacityConfig {
        total_capacity: 100_000,
        min_batch_size: 1_000,
        max_partner_allocation: 1.0,
        annual_efficiency_gain: 0.0,
    })
    .with_setup_overhead(PartnershipModel::CoBranded, 5_000);

    let first = allocate(&[unrestricted("BRAND_A", "hydrotex_liners", 95_000)], &mut pool);
    assert_eq!(first.accepted[0].granted, 95_000);
    assert_eq!(pool.remaining(), 0.0);

    let blocked = allocate(&[request("BRAND_B", "ecomesh_panels", 10_000, 0.3)], &mut pool);
    assert!(blocked.accepted.is_empty());
    assert_eq!(blocked.capacity_rejections(), 1);

    pool.release("BRAND_A", "hydrotex_liners", PartnershipModel::CoBranded, 95_000)
        .unwrap();
    let retry = allocate(&[request("BRAND_B", "ecomesh_panels", 10_000, 0.3)], &mut pool);
    assert_eq!(retry.accepted[0].granted, 10_000);
    assert!(pool.check_invariants().is_ok());
}

#[test]
fn test_efficiency_gain_adds_room() {
    let mut pool = CapacityPool::new(CapacityConfig {
        total_capacity: 100_000,
        min_batch_size: 1_000,
        max_partner_allocation: 1.0,
        annual_efficiency_gain: 0.03,
    });
    allocate(&[unrestricted("BRAND_A", "hydrotex_liners", 100_000)], &mut pool);
    assert_eq!(pool.remaining(), 0.0);

    pool.begin_year();
    let outcome = allocate(&[request("BRAND_B", "ecomesh_panels", 2_500, 0.3)], &mut pool);
    assert_eq!(outcome.total_granted(), 2_500);
    assert!(pool.check_invariants().is_ok());
}

#[test]
fn test_release_unknown_commitment_errors() {
    let mut pool = million_pool();
    let err = pool
        .release("BRAND_X", "hydrotex_liners", PartnershipModel::WhiteLabel, 10)
        .unwrap_err();
    assert!(matches!(err, CapacityError::ReleaseExceedsCommitment { units: 10, .. }));
}

// ============================================================================
// Properties
// ============================================================================

fn arb_request() -> impl Strategy<Value = DemandRequest> {
    (
        0_usize..6,
        0_usize..4,
        any::<bool>(),
        0_u64..400_000,
        0.0_f64..0.6,
        0.1_f64..1.0,
        prop_oneof![Just(0.2), Just(0.3), Just(0.4), Just(0.5)],
    )
        .prop_map(|(brand, product, co_branded, volume, margin, strategic, share)| DemandRequest {
            brand_id: format!("BRAND_{}", brand),
            product_id: format!("product_{}", product),
            model: if co_branded {
                PartnershipModel::CoBranded
            } else {
                PartnershipModel::WhiteLabel
            },
            volume,
            margin,
            strategic_value: strategic,
            max_product_share: share,
            unit_price: 20.0,
            unit_cost: 15.0,
        })
}

proptest! {
    #[test]
    fn prop_invariants_hold_after_allocation(
        requests in prop::collection::vec(arb_request(), 0..25),
        total in 50_000_u64..2_000_000,
        overhead in 0_u64..20_000,
    ) {
        let mut pool = CapacityPool::new(CapacityConfig {
            total_capacity: total,
            min_batch_size: 1_000,
            max_partner_allocation: 0.10,
            annual_efficiency_gain: 0.0,
        })
        .with_setup_overhead(PartnershipModel::CoBranded, overhead)
        .with_setup_overhead(PartnershipModel::WhiteLabel, overhead / 2);

        let outcome = allocate(&requests, &mut pool);

        prop_assert!(pool.check_invariants().is_ok());
        prop_assert!(pool.committed_units() as f64 <= pool.net_capacity() + 1e-6);
        for r in &requests {
            prop_assert!(pool.brand_committed(&r.brand_id) <= pool.partner_cap());
        }
        for a in &outcome.accepted {
            prop_assert!(a.granted >= 1_000);
            prop_assert!(a.granted <= a.requested);
        }
        prop_assert_eq!(outcome.total_granted(), pool.committed_units());
    }

    #[test]
    fn prop_every_request_is_accounted_for(
        requests in prop::collection::vec(arb_request(), 0..25),
    ) {
        let mut pool = CapacityPool::new(CapacityConfig::default());
        let outcome = allocate(&requests, &mut pool);

        for (index, request) in requests.iter().enumerate() {
            let granted: u64 = outcome
                .accepted
                .iter()
                .filter(|a| a.request_index == index)
                .map(|a| a.granted)
                .sum();
            let rejected: u64 = outcome
                .rejected
                .iter()
                .filter(|r| r.request_index == index)
                .map(|r| r.units)
                .sum();
            prop_assert_eq!(granted + rejected, request.volume);
        }
    }

    #[test]
    fn prop_allocation_is_deterministic(
        requests in prop::collection::vec(arb_request(), 0..25),
    ) {
        let mut a = CapacityPool::new(CapacityConfig::default());
        let mut b = CapacityPool::new(CapacityConfig::default());
        prop_assert_eq!(allocate(&requests, &mut a), allocate(&requests, &mut b));
    }
}
