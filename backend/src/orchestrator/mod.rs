//! Orchestrator - trial loop and Monte Carlo batches
//!
//! `SimulationRun` executes one trial tick by tick; `MonteCarloRunner`
//! fans trials out over rayon and aggregates them into a `BatchSummary`.

pub mod batch;
pub mod config;
pub mod engine;
pub mod renewal;
pub mod summary;

pub use batch::{BatchResult, ModelComparison, MonteCarloRunner, RunFailure};
pub use config::{ConfigError, SimulationConfig};
pub use engine::{monthly_discount_rate, RunError, RunResult, SimulationError, SimulationRun, TickResult};
pub use renewal::RenewalAssessment;
pub use summary::{BatchSummary, MetricSummary};
