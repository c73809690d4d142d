//! Monte Carlo unit-cost sampler
//!
//! Each draw samples four independent components:
//!
//! ```text
//! R&D (fixed)   LogNormal(ln base, skew)          upside overrun risk
//! Material      Normal(base, spread × base)       established supply chain
//! Labor         Triangular(0.7b, b, 1.5b)         efficiency variability
//! Quality       Exp(1 / mean)                     defect-driven rework
//! ```
//!
//! and combines them under a geography scenario:
//!
//! ```text
//! variable = (material·mm + (labor + quality)·lm) × (1 + logistics) × (1 − quality_discount)
//! fixed    = rd × (1 + regulatory_premium) / amortization_volume
//! unit     = variable + fixed
//! ```

use crate::costs::scenario::GeographyScenario;
use crate::models::Product;
use crate::orchestrator::summary::{mean, quantile};
use crate::rng::RngManager;
use rand_distr::{Distribution, Exp, LogNormal, Normal, Triangular};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by the cost sampler
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CostError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Unknown geography scenario: {0}")]
    UnknownScenario(String),

    #[error("Draw count must be positive")]
    NoDraws,

    #[error("Invalid cost distribution for {product_id}: {reason}")]
    InvalidDistribution { product_id: String, reason: String },

    #[error("Sampled unit cost for {product_id} is not finite")]
    NonFiniteCost { product_id: String },
}

/// Summary of a sampled unit-cost distribution (EUR per unit)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub product_id: String,
    pub scenario: String,
    pub draws: usize,
    pub mean_unit_cost: f64,
    pub mean_variable_cost: f64,
    pub mean_fixed_per_unit: f64,
    pub p5_unit_cost: f64,
    pub p50_unit_cost: f64,
    pub p95_unit_cost: f64,
    /// Full sampled unit-cost distribution, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub samples: Option<Vec<f64>>,
}

/// Component distributions for one (product, scenario) pair
struct ComponentDistributions {
    rd: LogNormal<f64>,
    material: Normal<f64>,
    labor: Triangular<f64>,
    quality: Exp<f64>,
}

impl ComponentDistributions {
    fn build(product: &Product) -> Result<Self, CostError> {
        let c = &product.cost;
        let invalid = |reason: String| CostError::InvalidDistribution {
            product_id: product.id.clone(),
            reason,
        };

        Ok(Self {
            rd: LogNormal::new(c.rd_base.ln(), c.rd_skew)
                .map_err(|e| invalid(format!("rd: {}", e)))?,
            material: Normal::new(c.material_base, c.material_spread * c.material_base)
                .map_err(|e| invalid(format!("material: {}", e)))?,
            labor: Triangular::new(0.7 * c.labor_base, 1.5 * c.labor_base, c.labor_base)
                .map_err(|e| invalid(format!("labor: {:?}", e)))?,
            quality: Exp::new(1.0 / c.quality_mean)
                .map_err(|e| invalid(format!("quality: {}", e)))?,
        })
    }
}

/// Samples per-product, per-scenario unit costs
///
/// The sampler borrows the catalog and scenario table; it holds no RNG of its
/// own. Every estimate takes an explicit `&mut RngManager`.
pub struct CostSampler<'a> {
    products: &'a [Product],
    scenarios: &'a BTreeMap<String, GeographyScenario>,
}

impl<'a> CostSampler<'a> {
    pub fn new(
        products: &'a [Product],
        scenarios: &'a BTreeMap<String, GeographyScenario>,
    ) -> Self {
        Self { products, scenarios }
    }

    /// Check that both keys resolve, without sampling
    pub fn validate(&self, product_id: &str, scenario_key: &str) -> Result<(), CostError> {
        self.lookup(product_id, scenario_key).map(|_| ())
    }

    /// Estimate the unit cost from `draws` samples
    pub fn estimate(
        &self,
        product_id: &str,
        scenario_key: &str,
        draws: usize,
        rng: &mut RngManager,
    ) -> Result<CostEstimate, CostError> {
        self.sample(product_id, scenario_key, draws, false, rng)
    }

    /// Like `estimate`, but keeps every sampled unit cost
    pub fn distribution(
        &self,
        product_id: &str,
        scenario_key: &str,
        draws: usize,
        rng: &mut RngManager,
    ) -> Result<CostEstimate, CostError> {
        self.sample(product_id, scenario_key, draws, true, rng)
    }

    /// Estimate from a fresh stream seeded with `seed`
    ///
    /// Identical `(product, scenario, seed, draws)` always yield an identical
    /// estimate.
    pub fn estimate_seeded(
        &self,
        product_id: &str,
        scenario_key: &str,
        draws: usize,
        seed: u64,
    ) -> Result<CostEstimate, CostError> {
        let mut rng = RngManager::new(seed);
        self.estimate(product_id, scenario_key, draws, &mut rng)
    }

    fn lookup(
        &self,
        product_id: &str,
        scenario_key: &str,
    ) -> Result<(&'a Product, &'a GeographyScenario), CostError> {
        let product = self
            .products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| CostError::UnknownProduct(product_id.to_string()))?;
        let scenario = self
            .scenarios
            .get(scenario_key)
            .ok_or_else(|| CostError::UnknownScenario(scenario_key.to_string()))?;
        Ok((product, scenario))
    }

    fn sample(
        &self,
        product_id: &str,
        scenario_key: &str,
        draws: usize,
        keep_samples: bool,
        rng: &mut RngManager,
    ) -> Result<CostEstimate, CostError> {
        let (product, scenario) = self.lookup(product_id, scenario_key)?;
        if draws == 0 {
            return Err(CostError::NoDraws);
        }
        let dists = ComponentDistributions::build(product)?;

        let variable_scale = (1.0 + scenario.logistics_factor) * (1.0 - scenario.quality_discount);
        let fixed_scale = (1.0 + scenario.regulatory_premium) / product.cost.amortization_volume;

        let mut unit_costs = Vec::with_capacity(draws);
        let mut variable_sum = 0.0;
        let mut fixed_sum = 0.0;

        for _ in 0..draws {
            let rd = dists.rd.sample(rng);
            let material = dists.material.sample(rng).max(0.0);
            let labor = dists.labor.sample(rng);
            let quality = dists.quality.sample(rng);

            let variable = (material * scenario.material_multiplier
                + (labor + quality) * scenario.labor_multiplier)
                * variable_scale;
            let fixed = rd * fixed_scale;
            let unit = variable + fixed;
            if !unit.is_finite() {
                return Err(CostError::NonFiniteCost {
                    product_id: product.id.clone(),
                });
            }

            variable_sum += variable;
            fixed_sum += fixed;
            unit_costs.push(unit);
        }

        let n = draws as f64;
        let mut sorted = unit_costs.clone();
        sorted.sort_by(f64::total_cmp);

        Ok(CostEstimate {
            product_id: product.id.clone(),
            scenario: scenario_key.to_string(),
            draws,
            mean_unit_cost: mean(&unit_costs),
            mean_variable_cost: variable_sum / n,
            mean_fixed_per_unit: fixed_sum / n,
            p5_unit_cost: quantile(&sorted, 0.05),
            p50_unit_cost: quantile(&sorted, 0.50),
            p95_unit_cost: quantile(&sorted, 0.95),
            samples: keep_samples.then_some(unit_costs),
        })
    }
}
