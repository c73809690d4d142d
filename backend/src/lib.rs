//! Partnership Simulator Core - Rust Engine
//!
//! Monte Carlo comparison of co-branded and white-label B2B partnership
//! models for a technical textile supplier, with deterministic execution.
//!
//! # Architecture
//!
//! - **core**: Time management (monthly ticks, year boundaries)
//! - **rng**: Deterministic random number generation
//! - **models**: Domain types (Product, BrandProfile, Partnership, Event)
//! - **catalog**: Validated products and brands, missing-data fallback
//! - **costs**: Monte Carlo unit-cost sampler and geography scenarios
//! - **pricing**: Unit price and margin per partnership model
//! - **agents**: Brand scoring, decisions and demand
//! - **market**: Trend indicators and shock injection
//! - **capacity**: Capacity pool and greedy allocation
//! - **orchestrator**: Trial loop, renewal, batch aggregation
//!
//! # Critical Invariants
//!
//! 1. All randomness flows from one seeded `RngManager` per trial
//! 2. Committed capacity never exceeds effective capacity net of overhead
//! 3. No brand holds more than its partner cap
//! 4. FFI boundary is minimal and safe

// Module declarations
pub mod agents;
pub mod capacity;
pub mod catalog;
pub mod core;
pub mod costs;
pub mod market;
pub mod models;
pub mod orchestrator;
pub mod pricing;
pub mod rng;

// Re-exports for convenience
pub use agents::{BrandAgent, BrandAgentState, Decision};
pub use capacity::{allocate, AllocationOutcome, CapacityConfig, CapacityError, CapacityPool, DemandRequest};
pub use catalog::Catalog;
pub use core::time::TimeManager;
pub use costs::{CostError, CostEstimate, CostSampler, GeographyScenario};
pub use market::{MarketState, MarketStateManager};
pub use models::{
    BrandProfile, BrandRecord, Event, EventLog, ModelParams, Partnership, PartnershipModel, Product,
};
pub use orchestrator::{
    BatchResult, BatchSummary, ConfigError, ModelComparison, MonteCarloRunner, RunError, RunResult,
    SimulationConfig, SimulationError, SimulationRun,
};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn partnership_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(ffi::run_comparison, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::estimate_unit_cost, m)?)?;
    Ok(())
}
