//! Simulation configuration
//!
//! Every field has a documented default, so an empty JSON object is a valid
//! configuration. `validate()` runs before any trial starts.

use crate::capacity::CapacityConfig;
use crate::costs::GeographyScenario;
use crate::market::MarketConfig;
use crate::models::{ModelParams, PartnershipModel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration and input errors, raised before any run starts
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive")]
    NonPositive { field: String },

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Unknown geography scenario: {0}")]
    UnknownScenario(String),

    #[error("Invalid model type: {0} (expected co_branded or white_label)")]
    InvalidModelType(String),

    #[error("Invalid parameter {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Catalog has no products or no brands")]
    EmptyCatalog,

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Brand {0} has no segments")]
    NoSegments(String),
}

/// Batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of Monte Carlo trials per model
    pub n_simulations: usize,
    /// Months per trial
    pub time_horizon_ticks: usize,
    /// Model used by `MonteCarloRunner::run_configured`
    pub model_type: PartnershipModel,
    /// Base seed; trial `i` runs on a stream derived from `seed + i`
    pub random_seed: u64,
    /// Key into `scenarios`
    pub geography_scenario: String,
    /// Cost draws per product at the start of each trial
    pub cost_draws_per_run: usize,
    /// Annual discount rate for NPV
    pub discount_rate: f64,
    pub co_branded: ModelParams,
    pub white_label: ModelParams,
    pub scenarios: BTreeMap<String, GeographyScenario>,
    pub market: MarketConfig,
    pub capacity: CapacityConfig,
    /// Keep a per-run `EventLog` in each `RunResult`
    pub record_events: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_simulations: 10_000,
            time_horizon_ticks: 60,
            model_type: PartnershipModel::CoBranded,
            random_seed: 42,
            geography_scenario: GeographyScenario::HYBRID_MODEL.to_string(),
            cost_draws_per_run: 500,
            discount_rate: 0.08,
            co_branded: ModelParams::co_branded(),
            white_label: ModelParams::white_label(),
            scenarios: GeographyScenario::builtin(),
            market: MarketConfig::default(),
            capacity: CapacityConfig::default(),
            record_events: false,
        }
    }
}

impl SimulationConfig {
    /// Parameters for one model type
    pub fn params_for(&self, model: PartnershipModel) -> &ModelParams {
        match model {
            PartnershipModel::CoBranded => &self.co_branded,
            PartnershipModel::WhiteLabel => &self.white_label,
        }
    }

    /// The configured geography scenario
    pub fn scenario(&self) -> Result<&GeographyScenario, ConfigError> {
        self.scenarios
            .get(&self.geography_scenario)
            .ok_or_else(|| ConfigError::UnknownScenario(self.geography_scenario.clone()))
    }

    /// Validate every section
    ///
    /// # Example
    /// ```
    /// use partnership_simulator_core_rs::orchestrator::{ConfigError, SimulationConfig};
    ///
    /// let mut config = SimulationConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.geography_scenario = "lunar_production".to_string();
    /// assert_eq!(
    ///     config.validate(),
    ///     Err(ConfigError::UnknownScenario("lunar_production".to_string()))
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |value: usize, field: &str| {
            if value == 0 {
                Err(ConfigError::NonPositive {
                    field: field.to_string(),
                })
            } else {
                Ok(())
            }
        };
        positive(self.n_simulations, "n_simulations")?;
        positive(self.time_horizon_ticks, "time_horizon_ticks")?;
        positive(self.cost_draws_per_run, "cost_draws_per_run")?;

        if !(self.discount_rate.is_finite() && self.discount_rate > -1.0) {
            return Err(ConfigError::InvalidParameter {
                field: "discount_rate".to_string(),
                reason: "must be finite and greater than -1".to_string(),
            });
        }

        for (key, scenario) in &self.scenarios {
            scenario.validate(key)?;
        }
        self.scenario()?;

        for model in PartnershipModel::ALL {
            self.params_for(model).validate(model)?;
        }
        self.market.validate()?;
        self.capacity.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: SimulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.n_simulations, 10_000);
        assert_eq!(config.time_horizon_ticks, 60);
        assert_eq!(config.capacity.total_capacity, 2_000_000);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: SimulationConfig = serde_json::from_str(
            r#"{"n_simulations": 50, "model_type": "white_label", "capacity": {"min_batch_size": 500}}"#,
        )
        .unwrap();
        assert_eq!(config.n_simulations, 50);
        assert_eq!(config.model_type, PartnershipModel::WhiteLabel);
        assert_eq!(config.capacity.min_batch_size, 500);
        assert_eq!(config.capacity.max_partner_allocation, 0.10);
    }

    #[test]
    fn test_unknown_model_type_rejected() {
        let result: Result<SimulationConfig, _> = serde_json::from_str(r#"{"model_type": "licensing"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_simulations_rejected() {
        let config = SimulationConfig {
            n_simulations: 0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "n_simulations".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_model_params_rejected() {
        let mut config = SimulationConfig::default();
        config.white_label.base_renewal_rate = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }
}
