//! Capacity pool
//!
//! Tracks committed annual units against effective capacity:
//!
//! ```text
//! effective = total_capacity × efficiency_multiplier
//! net       = effective − Σ setup_overhead(open partnerships)
//! remaining = net − committed
//! ```
//!
//! # Critical Invariants
//!
//! 1. `committed ≤ net` at every tick
//! 2. No brand holds more than `max_partner_allocation × total_capacity`

use crate::models::PartnershipModel;
use crate::orchestrator::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Float slack when comparing integer commitments with scaled capacity
const EPSILON: f64 = 1e-6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CapacityError {
    #[error("Committed units {committed} exceed net capacity {limit:.1}")]
    CapacityExceeded { committed: u64, limit: f64 },

    #[error("Brand {brand_id} holds {committed} units, above its cap of {cap}")]
    PartnerCapExceeded {
        brand_id: String,
        committed: u64,
        cap: u64,
    },

    #[error("Cannot release {units} units for {brand_id}/{product_id}: only {committed} committed")]
    ReleaseExceedsCommitment {
        brand_id: String,
        product_id: String,
        units: u64,
        committed: u64,
    },
}

/// Capacity settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityConfig {
    /// Annual producible units at efficiency 1.0
    pub total_capacity: u64,
    /// Smallest request worth producing
    pub min_batch_size: u64,
    /// Max share of total capacity any single brand may hold
    pub max_partner_allocation: f64,
    /// Yearly compounding learning-curve gain (0.03 = +3%/year)
    pub annual_efficiency_gain: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            total_capacity: 2_000_000,
            min_batch_size: 1_000,
            max_partner_allocation: 0.10,
            annual_efficiency_gain: 0.03,
        }
    }
}

impl CapacityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_capacity == 0 {
            return Err(ConfigError::NonPositive {
                field: "capacity.total_capacity".to_string(),
            });
        }
        if !(self.max_partner_allocation > 0.0 && self.max_partner_allocation <= 1.0) {
            return Err(ConfigError::InvalidParameter {
                field: "capacity.max_partner_allocation".to_string(),
                reason: "must be within (0, 1]".to_string(),
            });
        }
        if !(self.annual_efficiency_gain >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                field: "capacity.annual_efficiency_gain".to_string(),
                reason: "must be >= 0".to_string(),
            });
        }
        if self.min_batch_size > self.total_capacity {
            return Err(ConfigError::InvalidParameter {
                field: "capacity.min_batch_size".to_string(),
                reason: "must not exceed total_capacity".to_string(),
            });
        }
        Ok(())
    }
}

/// Manufacturing capacity for one run
#[derive(Debug, Clone)]
pub struct CapacityPool {
    config: CapacityConfig,
    efficiency_multiplier: f64,
    setup_overhead: HashMap<PartnershipModel, u64>,
    committed_units: u64,
    reserved_overhead: u64,
    open_partnerships: usize,
    brand_committed: HashMap<String, u64>,
    product_committed: HashMap<String, u64>,
}

impl CapacityPool {
    /// Create an empty pool with no setup overhead
    ///
    /// # Example
    /// ```
    /// use partnership_simulator_core_rs::capacity::{CapacityConfig, CapacityPool};
    ///
    /// let pool = CapacityPool::new(CapacityConfig::default());
    /// assert_eq!(pool.remaining(), 2_000_000.0);
    /// assert_eq!(pool.partner_cap(), 200_000);
    /// ```
    pub fn new(config: CapacityConfig) -> Self {
        Self {
            config,
            efficiency_multiplier: 1.0,
            setup_overhead: HashMap::new(),
            committed_units: 0,
            reserved_overhead: 0,
            open_partnerships: 0,
            brand_committed: HashMap::new(),
            product_committed: HashMap::new(),
        }
    }

    /// Reserve `units` of overhead for every open partnership of `model`
    pub fn with_setup_overhead(mut self, model: PartnershipModel, units: u64) -> Self {
        self.setup_overhead.insert(model, units);
        self
    }

    pub fn config(&self) -> &CapacityConfig {
        &self.config
    }

    pub fn total_capacity(&self) -> u64 {
        self.config.total_capacity
    }

    pub fn min_batch_size(&self) -> u64 {
        self.config.min_batch_size
    }

    pub fn efficiency_multiplier(&self) -> f64 {
        self.efficiency_multiplier
    }

    pub fn setup_overhead(&self, model: PartnershipModel) -> u64 {
        self.setup_overhead.get(&model).copied().unwrap_or(0)
    }

    pub fn committed_units(&self) -> u64 {
        self.committed_units
    }

    pub fn reserved_overhead(&self) -> u64 {
        self.reserved_overhead
    }

    pub fn open_partnerships(&self) -> usize {
        self.open_partnerships
    }

    pub fn effective_capacity(&self) -> f64 {
        self.config.total_capacity as f64 * self.efficiency_multiplier
    }

    /// Effective capacity minus reserved setup overhead
    pub fn net_capacity(&self) -> f64 {
        self.effective_capacity() - self.reserved_overhead as f64
    }

    pub fn remaining(&self) -> f64 {
        self.net_capacity() - self.committed_units as f64
    }

    /// Largest allocation any single brand may hold
    pub fn partner_cap(&self) -> u64 {
        (self.config.max_partner_allocation * self.config.total_capacity as f64 + EPSILON).floor() as u64
    }

    pub fn brand_committed(&self, brand_id: &str) -> u64 {
        self.brand_committed.get(brand_id).copied().unwrap_or(0)
    }

    pub fn product_committed(&self, product_id: &str) -> u64 {
        self.product_committed.get(product_id).copied().unwrap_or(0)
    }

    pub fn brand_headroom(&self, brand_id: &str) -> u64 {
        self.partner_cap().saturating_sub(self.brand_committed(brand_id))
    }

    /// Units still available to a product whose tier allows `max_share`
    pub fn product_headroom(&self, product_id: &str, max_share: f64) -> u64 {
        let cap = (max_share * self.config.total_capacity as f64 + EPSILON).floor() as u64;
        cap.saturating_sub(self.product_committed(product_id))
    }

    /// Committed share of effective capacity
    pub fn utilization(&self) -> f64 {
        let effective = self.effective_capacity();
        if effective <= 0.0 {
            return 0.0;
        }
        self.committed_units as f64 / effective
    }

    /// Apply the yearly learning-curve gain
    pub fn begin_year(&mut self) {
        self.efficiency_multiplier *= 1.0 + self.config.annual_efficiency_gain;
    }

    /// Record a grant; only the allocator commits capacity
    pub(crate) fn commit(&mut self, brand_id: &str, product_id: &str, model: PartnershipModel, units: u64) {
        self.committed_units += units;
        self.reserved_overhead += self.setup_overhead(model);
        self.open_partnerships += 1;
        *self.brand_committed.entry(brand_id.to_string()).or_insert(0) += units;
        *self.product_committed.entry(product_id.to_string()).or_insert(0) += units;
    }

    /// Return a lapsed partnership's units and overhead to the pool
    pub fn release(
        &mut self,
        brand_id: &str,
        product_id: &str,
        model: PartnershipModel,
        units: u64,
    ) -> Result<(), CapacityError> {
        let brand_units = self.brand_committed(brand_id);
        let product_units = self.product_committed(product_id);
        if units > brand_units || units > product_units || units > self.committed_units {
            return Err(CapacityError::ReleaseExceedsCommitment {
                brand_id: brand_id.to_string(),
                product_id: product_id.to_string(),
                units,
                committed: brand_units.min(product_units),
            });
        }

        self.committed_units -= units;
        self.reserved_overhead = self.reserved_overhead.saturating_sub(self.setup_overhead(model));
        self.open_partnerships = self.open_partnerships.saturating_sub(1);
        self.brand_committed.insert(brand_id.to_string(), brand_units - units);
        self.product_committed.insert(product_id.to_string(), product_units - units);
        Ok(())
    }

    /// Verify both capacity invariants
    pub fn check_invariants(&self) -> Result<(), CapacityError> {
        let limit = self.net_capacity();
        if self.committed_units as f64 > limit + EPSILON {
            return Err(CapacityError::CapacityExceeded {
                committed: self.committed_units,
                limit,
            });
        }

        let cap = self.partner_cap();
        let mut brands: Vec<_> = self.brand_committed.iter().collect();
        brands.sort();
        for (brand_id, committed) in brands {
            if *committed > cap {
                return Err(CapacityError::PartnerCapExceeded {
                    brand_id: brand_id.clone(),
                    committed: *committed,
                    cap,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> CapacityPool {
        CapacityPool::new(CapacityConfig {
            total_capacity: 100_000,
            min_batch_size: 1_000,
            max_partner_allocation: 0.2,
            annual_efficiency_gain: 0.05,
        })
        .with_setup_overhead(PartnershipModel::CoBranded, 2_000)
    }

    #[test]
    fn test_commit_reserves_overhead() {
        let mut pool = pool();
        pool.commit("A", "P", PartnershipModel::CoBranded, 10_000);
        assert_eq!(pool.committed_units(), 10_000);
        assert_eq!(pool.reserved_overhead(), 2_000);
        assert_eq!(pool.remaining(), 88_000.0);
        assert_eq!(pool.brand_headroom("A"), 10_000);
    }

    #[test]
    fn test_release_restores_capacity() {
        let mut pool = pool();
        pool.commit("A", "P", PartnershipModel::CoBranded, 10_000);
        pool.release("A", "P", PartnershipModel::CoBranded, 10_000).unwrap();
        assert_eq!(pool.remaining(), 100_000.0);
        assert_eq!(pool.open_partnerships(), 0);
    }

    #[test]
    fn test_release_more_than_committed_fails() {
        let mut pool = pool();
        pool.commit("A", "P", PartnershipModel::WhiteLabel, 1_000);
        assert!(matches!(
            pool.release("A", "P", PartnershipModel::WhiteLabel, 5_000),
            Err(CapacityError::ReleaseExceedsCommitment { .. })
        ));
    }

    #[test]
    fn test_efficiency_compounds() {
        let mut pool = pool();
        pool.begin_year();
        pool.begin_year();
        assert!((pool.effective_capacity() - 100_000.0 * 1.05 * 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_invariant_detects_overcommit() {
        let mut pool = pool();
        pool.commit("A", "P", PartnershipModel::WhiteLabel, 20_000);
        pool.commit("B", "P", PartnershipModel::WhiteLabel, 20_000);
        assert!(pool.check_invariants().is_ok());
        pool.commit("C", "P", PartnershipModel::WhiteLabel, 70_000);
        assert!(matches!(
            pool.check_invariants(),
            Err(CapacityError::CapacityExceeded { .. })
        ));
    }
}
