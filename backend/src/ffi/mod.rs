//! PyO3 bindings for downstream Python reporting
//!
//! Inputs and outputs cross the boundary as JSON strings, so the Python
//! side needs no knowledge of the Rust types.
//!
//! ```python
//! from partnership_simulator_core_rs import run_comparison, estimate_unit_cost
//!
//! summary = json.loads(run_comparison(brands_json, '{"n_simulations": 2000}'))
//! print(summary["recommended"])
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::costs::{CostSampler, GeographyScenario};
use crate::models::{BrandRecord, PartnershipModel, Product};
use crate::orchestrator::{BatchSummary, MonteCarloRunner, SimulationConfig};

#[derive(Serialize)]
struct ComparisonSummary {
    co_branded: BatchSummary,
    white_label: BatchSummary,
    npv_profit_difference: f64,
    recommended: PartnershipModel,
}

fn value_error(context: &str, err: impl std::fmt::Display) -> PyErr {
    PyErr::new::<PyValueError, _>(format!("{}: {}", context, err))
}

/// Run both models over the default portfolio and return the summaries as JSON
#[pyfunction]
pub fn run_comparison(brands_json: &str, config_json: &str) -> PyResult<String> {
    let records: Vec<BrandRecord> =
        serde_json::from_str(brands_json).map_err(|e| value_error("Invalid brands JSON", e))?;
    let config: SimulationConfig =
        serde_json::from_str(config_json).map_err(|e| value_error("Invalid config JSON", e))?;

    let catalog =
        Catalog::new(Product::default_portfolio(), records).map_err(|e| value_error("Invalid catalog", e))?;
    let runner = MonteCarloRunner::new(&catalog, config).map_err(|e| value_error("Invalid config", e))?;
    let comparison = runner.compare();

    let summary = ComparisonSummary {
        co_branded: comparison.co_branded.summary,
        white_label: comparison.white_label.summary,
        npv_profit_difference: comparison.npv_profit_difference,
        recommended: comparison.recommended,
    };
    serde_json::to_string(&summary)
        .map_err(|e| PyErr::new::<PyRuntimeError, _>(format!("Failed to serialize summary: {}", e)))
}

/// Unit-cost distribution of one default-portfolio product
///
/// Returns `(mean, p5, p50, p95)` in EUR per unit.
#[pyfunction]
pub fn estimate_unit_cost(product_id: &str, scenario: &str, draws: usize, seed: u64) -> PyResult<(f64, f64, f64, f64)> {
    let products = Product::default_portfolio();
    let scenarios = GeographyScenario::builtin();
    let estimate = CostSampler::new(&products, &scenarios)
        .estimate_seeded(product_id, scenario, draws, seed)
        .map_err(|e| value_error("Cost estimation failed", e))?;
    Ok((
        estimate.mean_unit_cost,
        estimate.p5_unit_cost,
        estimate.p50_unit_cost,
        estimate.p95_unit_cost,
    ))
}
