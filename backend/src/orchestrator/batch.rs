//! Monte Carlo batch runner
//!
//! Runs `n_simulations` independent trials in parallel. Trial `i` seeds its
//! own RNG from `random_seed + i`, so results do not depend on thread
//! scheduling, and both models see the same random streams.

use crate::catalog::Catalog;
use crate::costs::{CostError, CostSampler};
use crate::models::PartnershipModel;
use crate::orchestrator::config::{ConfigError, SimulationConfig};
use crate::orchestrator::engine::{RunResult, SimulationError, SimulationRun};
use crate::orchestrator::summary::{config_fingerprint, BatchSummary};
use rayon::prelude::*;
use serde::Serialize;

/// A trial that ended in error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunFailure {
    pub run_index: usize,
    pub reason: String,
}

/// All trials of one model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub model: PartnershipModel,
    /// Successful trials in run-index order
    pub results: Vec<RunResult>,
    pub failures: Vec<RunFailure>,
    pub summary: BatchSummary,
}

/// Side-by-side outcome of both models on common random numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelComparison {
    pub co_branded: BatchResult,
    pub white_label: BatchResult,
    /// Mean NPV profit difference, co-branded minus white-label
    pub npv_profit_difference: f64,
    /// Model with the higher mean NPV profit
    pub recommended: PartnershipModel,
}

impl ModelComparison {
    pub fn result_for(&self, model: PartnershipModel) -> &BatchResult {
        match model {
            PartnershipModel::CoBranded => &self.co_branded,
            PartnershipModel::WhiteLabel => &self.white_label,
        }
    }
}

pub struct MonteCarloRunner<'a> {
    catalog: &'a Catalog,
    config: SimulationConfig,
    fingerprint: String,
}

impl<'a> MonteCarloRunner<'a> {
    /// Validate the config against the catalog
    pub fn new(catalog: &'a Catalog, config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let sampler = CostSampler::new(catalog.products(), &config.scenarios);
        for product in catalog.products() {
            sampler
                .validate(&product.id, &config.geography_scenario)
                .map_err(|err| match err {
                    CostError::UnknownProduct(id) => ConfigError::UnknownProduct(id),
                    CostError::UnknownScenario(key) => ConfigError::UnknownScenario(key),
                    other => ConfigError::InvalidParameter {
                        field: product.id.clone(),
                        reason: other.to_string(),
                    },
                })?;
        }
        let fingerprint = config_fingerprint(&config)?;
        Ok(Self {
            catalog,
            config,
            fingerprint,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// SHA-256 of the canonical config
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Run the configured model
    pub fn run_configured(&self) -> BatchResult {
        self.run(self.config.model_type)
    }

    /// Run `n_simulations` trials of `model`
    pub fn run(&self, model: PartnershipModel) -> BatchResult {
        let n = self.config.n_simulations;
        tracing::info!(
            target: "sim.batch",
            model = %model,
            n_simulations = n,
            seed = self.config.random_seed,
            fingerprint = %self.fingerprint,
            "Starting batch"
        );

        let outcomes: Vec<_> = (0..n)
            .into_par_iter()
            .map(|run_index| {
                SimulationRun::new(self.catalog, &self.config, model, run_index).and_then(|run| run.run())
            })
            .collect();

        let mut results = Vec::with_capacity(n);
        let mut failures = Vec::new();
        for (run_index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(result) => results.push(result),
                Err(err) => {
                    tracing::warn!(target: "sim.run", run_index, model = %model, error = %err, "Run failed");
                    failures.push(RunFailure {
                        run_index,
                        reason: err.to_string(),
                    });
                }
            }
        }

        let summary = BatchSummary::from_results(model, &results, failures.len(), self.fingerprint.clone());
        tracing::info!(
            target: "sim.batch",
            model = %model,
            successful = summary.successful_runs,
            failed = summary.failed_runs,
            npv_profit_mean = summary.npv_profit_mean,
            "Batch complete"
        );

        BatchResult {
            model,
            results,
            failures,
            summary,
        }
    }

    /// Run both models on the same seeds
    pub fn compare(&self) -> ModelComparison {
        let co_branded = self.run(PartnershipModel::CoBranded);
        let white_label = self.run(PartnershipModel::WhiteLabel);
        let npv_profit_difference = co_branded.summary.npv_profit_mean - white_label.summary.npv_profit_mean;
        let recommended = if npv_profit_difference >= 0.0 {
            PartnershipModel::CoBranded
        } else {
            PartnershipModel::WhiteLabel
        };
        ModelComparison {
            co_branded,
            white_label,
            npv_profit_difference,
            recommended,
        }
    }
}
