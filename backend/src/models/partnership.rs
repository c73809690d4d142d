//! Partnership model
//!
//! A partnership is an accepted supply relationship between one brand and
//! one product under a given model type. It is created when the capacity
//! allocator grants units, becomes active on the following tick, and is
//! marked lapsed when an annual renewal check fails.

use crate::orchestrator::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Partnership structure under evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipModel {
    /// Publicly co-branded (visible attribution)
    CoBranded,
    /// Anonymous private-label supply
    WhiteLabel,
}

impl PartnershipModel {
    pub const ALL: [PartnershipModel; 2] = [PartnershipModel::CoBranded, PartnershipModel::WhiteLabel];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartnershipModel::CoBranded => "co_branded",
            PartnershipModel::WhiteLabel => "white_label",
        }
    }
}

impl fmt::Display for PartnershipModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartnershipModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "co_branded" => Ok(PartnershipModel::CoBranded),
            "white_label" => Ok(PartnershipModel::WhiteLabel),
            other => Err(ConfigError::InvalidModelType(other.to_string())),
        }
    }
}

/// Volume tier for white-label style pricing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    /// Discount applies at or above this many annual units
    pub min_units: u64,
    /// Subtracted from the markup
    pub discount: f64,
}

/// Model-specific constants
///
/// Every place where co-branded and white-label behave differently reads
/// its number from here instead of branching on the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Share of a brand's annual output requested per product
    pub base_demand_fraction: f64,
    /// Renewal probability before performance/relationship/market factors
    pub base_renewal_rate: f64,
    /// Capacity units reserved per active partnership
    pub setup_overhead_units: u64,
    /// Markup over unit cost
    pub markup: f64,
    /// Weight on the brand's segment premium (co-branded pricing power)
    pub segment_premium_weight: f64,
    /// Markup reductions by volume, highest matching tier wins
    pub volume_discounts: Vec<VolumeDiscount>,
    /// Margin at which the performance factor reaches 1.0
    pub target_margin: f64,
    /// Baseline collaboration sub-score at renewal
    pub collaboration_base: f64,
    /// Whether the manufacturer is visibly attributed on the product
    pub visible_attribution: bool,
    /// Brand-synergy sub-score when there is no attribution
    pub unattributed_synergy: f64,
    /// Exclusivity sub-score when there is no attribution
    pub unattributed_exclusivity: f64,
}

impl ModelParams {
    pub fn co_branded() -> Self {
        Self {
            base_demand_fraction: 0.010,
            base_renewal_rate: 0.85,
            setup_overhead_units: 2_000,
            markup: 0.35,
            segment_premium_weight: 1.0,
            volume_discounts: Vec::new(),
            target_margin: 0.25,
            collaboration_base: 0.85,
            visible_attribution: true,
            unattributed_synergy: 0.2,
            unattributed_exclusivity: 0.2,
        }
    }

    pub fn white_label() -> Self {
        Self {
            base_demand_fraction: 0.015,
            base_renewal_rate: 0.75,
            setup_overhead_units: 500,
            markup: 0.14,
            segment_premium_weight: 0.0,
            volume_discounts: vec![
                VolumeDiscount { min_units: 5_000, discount: 0.02 },
                VolumeDiscount { min_units: 10_000, discount: 0.05 },
                VolumeDiscount { min_units: 25_000, discount: 0.08 },
            ],
            target_margin: 0.10,
            collaboration_base: 0.75,
            visible_attribution: false,
            unattributed_synergy: 0.2,
            unattributed_exclusivity: 0.2,
        }
    }

    pub fn defaults_for(model: PartnershipModel) -> Self {
        match model {
            PartnershipModel::CoBranded => Self::co_branded(),
            PartnershipModel::WhiteLabel => Self::white_label(),
        }
    }

    /// Discount for an order of `units`; the largest qualifying tier applies
    pub fn volume_discount(&self, units: u64) -> f64 {
        self.volume_discounts
            .iter()
            .filter(|tier| units >= tier.min_units)
            .map(|tier| tier.discount)
            .fold(0.0, f64::max)
    }

    pub fn validate(&self, model: PartnershipModel) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidParameter {
            field: format!("{}.{}", model, field),
            reason: reason.to_string(),
        };
        if !(self.base_demand_fraction > 0.0 && self.base_demand_fraction <= 1.0) {
            return Err(invalid("base_demand_fraction", "must be within (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.base_renewal_rate) {
            return Err(invalid("base_renewal_rate", "must be within [0, 1]"));
        }
        if !(self.markup >= 0.0) {
            return Err(invalid("markup", "must be >= 0"));
        }
        if !(self.segment_premium_weight >= 0.0) {
            return Err(invalid("segment_premium_weight", "must be >= 0"));
        }
        if self.volume_discounts.iter().any(|t| !(0.0..1.0).contains(&t.discount)) {
            return Err(invalid("volume_discounts", "discounts must be within [0, 1)"));
        }
        if !(self.target_margin > 0.0) {
            return Err(invalid("target_margin", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.collaboration_base) {
            return Err(invalid("collaboration_base", "must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.unattributed_synergy)
            || !(0.0..=1.0).contains(&self.unattributed_exclusivity)
        {
            return Err(invalid("unattributed_*", "must be within [0, 1]"));
        }
        Ok(())
    }
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::co_branded()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    /// Capacity committed, production starts next tick
    Pending,
    Active,
    Lapsed,
}

/// Outcome of one annual renewal check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalRecord {
    pub tick: usize,
    pub probability: f64,
    pub draw: f64,
    pub renewed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    pub id: String,
    pub brand_id: String,
    pub product_id: String,
    pub model: PartnershipModel,
    /// Annual units committed in the capacity pool
    pub allocated_units: u64,
    pub unit_price: f64,
    pub unit_cost: f64,
    pub start_tick: usize,
    pub status: PartnershipStatus,
    pub renewal_history: Vec<RenewalRecord>,
}

impl Partnership {
    /// Margin at contract prices, adjusted by current cost pressure
    pub fn margin_under(&self, cost_pressure: f64) -> f64 {
        if self.unit_price <= 0.0 {
            return 0.0;
        }
        (self.unit_price - self.unit_cost * cost_pressure) / self.unit_price
    }

    pub fn is_open(&self) -> bool {
        self.status != PartnershipStatus::Lapsed
    }

    pub fn activate(&mut self) {
        if self.status == PartnershipStatus::Pending {
            self.status = PartnershipStatus::Active;
        }
    }

    pub fn record_renewal(&mut self, record: RenewalRecord) {
        if !record.renewed {
            self.status = PartnershipStatus::Lapsed;
        }
        self.renewal_history.push(record);
    }
}
