//! Geography scenarios
//!
//! A scenario scales each cost component for a production footprint.

use crate::orchestrator::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Scenario-specific cost multipliers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographyScenario {
    /// Multiplier on labor and quality costs
    pub labor_multiplier: f64,
    /// Multiplier on material cost
    pub material_multiplier: f64,
    /// Compliance premium on fixed R&D cost (0.15 = +15%)
    pub regulatory_premium: f64,
    /// Freight and duty on variable cost (0.12 = +12%)
    pub logistics_factor: f64,
    /// Discount on variable cost from scale/quality programs
    pub quality_discount: f64,
    /// Informational; not used in cost arithmetic
    pub lead_time_weeks: u32,
}

impl GeographyScenario {
    pub const EU_PRODUCTION: &'static str = "eu_production";
    pub const ASIAN_PRODUCTION: &'static str = "asian_production";
    pub const HYBRID_MODEL: &'static str = "hybrid_model";

    /// The three built-in scenarios keyed by name
    pub fn builtin() -> BTreeMap<String, GeographyScenario> {
        let mut table = BTreeMap::new();
        table.insert(
            Self::EU_PRODUCTION.to_string(),
            GeographyScenario {
                labor_multiplier: 1.0,
                material_multiplier: 1.0,
                regulatory_premium: 0.15,
                logistics_factor: 0.02,
                quality_discount: 0.0,
                lead_time_weeks: 8,
            },
        );
        table.insert(
            Self::ASIAN_PRODUCTION.to_string(),
            GeographyScenario {
                labor_multiplier: 0.25,
                material_multiplier: 0.8,
                regulatory_premium: 0.05,
                logistics_factor: 0.12,
                quality_discount: 0.05,
                lead_time_weeks: 16,
            },
        );
        table.insert(
            Self::HYBRID_MODEL.to_string(),
            GeographyScenario {
                labor_multiplier: 0.6,
                material_multiplier: 0.9,
                regulatory_premium: 0.10,
                logistics_factor: 0.07,
                quality_discount: 0.02,
                lead_time_weeks: 12,
            },
        );
        table
    }

    pub fn validate(&self, key: &str) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidParameter {
            field: format!("scenarios.{}.{}", key, field),
            reason: reason.to_string(),
        };
        if !(self.labor_multiplier > 0.0) {
            return Err(invalid("labor_multiplier", "must be > 0"));
        }
        if !(self.material_multiplier > 0.0) {
            return Err(invalid("material_multiplier", "must be > 0"));
        }
        if !(self.regulatory_premium >= 0.0) {
            return Err(invalid("regulatory_premium", "must be >= 0"));
        }
        if !(self.logistics_factor >= 0.0) {
            return Err(invalid("logistics_factor", "must be >= 0"));
        }
        if !(0.0..1.0).contains(&self.quality_discount) {
            return Err(invalid("quality_discount", "must be within [0, 1)"));
        }
        Ok(())
    }
}
