//! Cost estimation
//!
//! Samples unit-cost distributions per product and geography scenario.
//! Unit costs are drawn once per Monte Carlo run and fed to pricing.

pub mod sampler;
pub mod scenario;

pub use sampler::{CostError, CostEstimate, CostSampler};
pub use scenario::GeographyScenario;
