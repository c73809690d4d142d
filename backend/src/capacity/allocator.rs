//! Greedy capacity allocation
//!
//! Requests are ranked by `margin × volume × strategic_value` and granted in
//! order until capacity runs out. The sort is stable, so ties keep their
//! submission order.

use crate::capacity::pool::CapacityPool;
use crate::models::PartnershipModel;
use serde::Serialize;

/// A brand's request for annual units of one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandRequest {
    pub brand_id: String,
    pub product_id: String,
    pub model: PartnershipModel,
    /// Annual units requested
    pub volume: u64,
    /// Supplier gross margin at the quoted price
    pub margin: f64,
    pub strategic_value: f64,
    /// Tier limit on the product's share of total capacity
    pub max_product_share: f64,
    pub unit_price: f64,
    pub unit_cost: f64,
}

impl DemandRequest {
    /// Ranking score
    pub fn score(&self) -> f64 {
        self.margin * self.volume as f64 * self.strategic_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    BelowMinimumBatch,
    PartnerCapReached,
    ProductCapReached,
    CapacityExhausted,
    /// Remainder of a partial acceptance
    Unfulfilled,
    /// Remainder cut by the partner or product cap
    CappedAtLimit,
}

impl RejectionReason {
    /// True when the request failed for lack of room in the pool
    pub fn is_capacity(&self) -> bool {
        matches!(self, RejectionReason::CapacityExhausted | RejectionReason::Unfulfilled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    Full,
    /// Fitted the pool but trimmed by a cap
    Capped,
    /// Took what was left of the pool
    Partial,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    /// Position of the request in the input slice
    pub request_index: usize,
    pub brand_id: String,
    pub product_id: String,
    pub requested: u64,
    pub granted: u64,
    pub kind: GrantKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    pub request_index: usize,
    pub brand_id: String,
    pub product_id: String,
    pub units: u64,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationOutcome {
    pub accepted: Vec<Allocation>,
    pub rejected: Vec<Rejection>,
    /// A partial grant ended the pass
    pub halted: bool,
}

impl AllocationOutcome {
    pub fn total_granted(&self) -> u64 {
        self.accepted.iter().map(|a| a.granted).sum()
    }

    /// Rejections caused by the pool running out
    pub fn capacity_rejections(&self) -> usize {
        self.rejected.iter().filter(|r| r.reason.is_capacity()).count()
    }
}

/// Allocate capacity to `requests`, committing grants to `pool`
///
/// # Example
/// ```
/// use partnership_simulator_core_rs::capacity::{allocate, CapacityConfig, CapacityPool, DemandRequest};
/// use partnership_simulator_core_rs::models::PartnershipModel;
///
/// let mut pool = CapacityPool::new(CapacityConfig::default());
/// let request = DemandRequest {
///     brand_id: "BRAND_A".to_string(),
///     product_id: "hydrotex_liners".to_string(),
///     model: PartnershipModel::WhiteLabel,
///     volume: 500,
///     margin: 0.12,
///     strategic_value: 1.0,
///     max_product_share: 0.5,
///     unit_price: 12.0,
///     unit_cost: 10.5,
/// };
/// let outcome = allocate(&[request], &mut pool);
/// assert!(outcome.accepted.is_empty());
/// assert_eq!(outcome.rejected.len(), 1);
/// ```
pub fn allocate(requests: &[DemandRequest], pool: &mut CapacityPool) -> AllocationOutcome {
    let mut order: Vec<usize> = (0..requests.len()).collect();
    order.sort_by(|&a, &b| requests[b].score().total_cmp(&requests[a].score()));

    let min_batch = pool.min_batch_size();
    let mut outcome = AllocationOutcome::default();

    for index in order {
        let request = &requests[index];
        let reject = |units: u64, reason: RejectionReason| Rejection {
            request_index: index,
            brand_id: request.brand_id.clone(),
            product_id: request.product_id.clone(),
            units,
            reason,
        };

        if outcome.halted {
            outcome.rejected.push(reject(request.volume, RejectionReason::CapacityExhausted));
            continue;
        }
        if request.volume < min_batch {
            outcome.rejected.push(reject(request.volume, RejectionReason::BelowMinimumBatch));
            continue;
        }

        let brand_headroom = pool.brand_headroom(&request.brand_id);
        if brand_headroom < min_batch {
            outcome.rejected.push(reject(request.volume, RejectionReason::PartnerCapReached));
            continue;
        }
        let product_headroom = pool.product_headroom(&request.product_id, request.max_product_share);
        if product_headroom < min_batch {
            outcome.rejected.push(reject(request.volume, RejectionReason::ProductCapReached));
            continue;
        }

        let room = (pool.remaining() - pool.setup_overhead(request.model) as f64).max(0.0).floor() as u64;
        let cap = brand_headroom.min(product_headroom);

        let (granted, kind) = if request.volume <= room {
            let granted = request.volume.min(cap);
            let kind = if granted < request.volume {
                GrantKind::Capped
            } else {
                GrantKind::Full
            };
            (granted, kind)
        } else if room > min_batch {
            outcome.halted = true;
            (room.min(cap), GrantKind::Partial)
        } else {
            outcome.rejected.push(reject(request.volume, RejectionReason::CapacityExhausted));
            continue;
        };

        pool.commit(&request.brand_id, &request.product_id, request.model, granted);

        let remainder = request.volume - granted;
        if remainder > 0 {
            let reason = match kind {
                GrantKind::Partial => RejectionReason::Unfulfilled,
                _ => RejectionReason::CappedAtLimit,
            };
            outcome.rejected.push(reject(remainder, reason));
        }
        outcome.accepted.push(Allocation {
            request_index: index,
            brand_id: request.brand_id.clone(),
            product_id: request.product_id.clone(),
            requested: request.volume,
            granted,
            kind,
        });
    }

    tracing::debug!(
        target: "sim.capacity",
        requests = requests.len(),
        accepted = outcome.accepted.len(),
        rejected = outcome.rejected.len(),
        granted = outcome.total_granted(),
        committed = pool.committed_units(),
        halted = outcome.halted,
        "Allocation pass complete"
    );

    outcome
}
