//! Manufacturing capacity
//!
//! `CapacityPool` owns the capacity numbers; `allocate` is the greedy pass
//! that commits grants to it.

pub mod allocator;
pub mod pool;

pub use allocator::{
    allocate, Allocation, AllocationOutcome, DemandRequest, GrantKind, Rejection, RejectionReason,
};
pub use pool::{CapacityConfig, CapacityError, CapacityPool};
