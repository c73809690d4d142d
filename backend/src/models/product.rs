//! Product model
//!
//! A product is one technical textile component offered to brands. Products
//! are immutable after load; the cost parameters here are scenario-neutral
//! and the `CostSampler` scales them per geography scenario.

use crate::orchestrator::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Product family, positioned on the function/fashion plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    /// Technical inner layers and insulation systems
    TechnicalInnerLayers,
    /// Structural enhancement solutions (reinforcements, closures)
    StructuralEnhancement,
    /// Sustainable performance materials
    SustainablePerformance,
}

impl ProductCategory {
    /// (function, fashion) coordinates used for segment fit
    pub fn coordinates(&self) -> (f64, f64) {
        match self {
            ProductCategory::TechnicalInnerLayers => (0.9, 0.3),
            ProductCategory::StructuralEnhancement => (0.7, 0.5),
            ProductCategory::SustainablePerformance => (0.6, 0.6),
        }
    }

    /// Demand multiplier applied on top of the brand's base demand fraction
    pub fn demand_multiplier(&self) -> f64 {
        match self {
            ProductCategory::TechnicalInnerLayers => 1.0,
            ProductCategory::StructuralEnhancement => 1.2,
            ProductCategory::SustainablePerformance => 0.9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::TechnicalInnerLayers => "Technical Inner Layers & Insulation Systems",
            ProductCategory::StructuralEnhancement => "Structural Enhancement Solutions",
            ProductCategory::SustainablePerformance => "Sustainable Performance Materials",
        }
    }
}

/// Manufacturing complexity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ComplexityTier {
    /// Largest share of total capacity one product may occupy
    pub fn max_capacity_share(&self) -> f64 {
        match self {
            ComplexityTier::Low => 0.5,
            ComplexityTier::Medium => 0.4,
            ComplexityTier::High => 0.3,
            ComplexityTier::VeryHigh => 0.2,
        }
    }

    /// Baseline quality score used in renewal relationship scoring
    pub fn quality_base(&self) -> f64 {
        match self {
            ComplexityTier::Low => 0.9,
            ComplexityTier::Medium => 0.85,
            ComplexityTier::High => 0.8,
            ComplexityTier::VeryHigh => 0.75,
        }
    }
}

/// Scenario-neutral cost distribution parameters (EUR)
///
/// # Fields
///
/// * `rd_base` - Median total R&D / tooling cost (lognormal median)
/// * `rd_skew` - Lognormal sigma; larger values widen the overrun tail
/// * `material_base` - Mean material cost per unit
/// * `material_spread` - Material standard deviation as a fraction of base (0.10–0.15)
/// * `labor_base` - Modal labor cost per unit
/// * `quality_mean` - Mean defect-driven quality cost per unit
/// * `amortization_volume` - Units the fixed cost is spread over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParams {
    pub rd_base: f64,
    pub rd_skew: f64,
    pub material_base: f64,
    pub material_spread: f64,
    pub labor_base: f64,
    pub quality_mean: f64,
    pub amortization_volume: f64,
}

impl CostParams {
    /// Check parameter ranges
    pub fn validate(&self, product_id: &str) -> Result<(), ConfigError> {
        let invalid = |field: &str, reason: &str| ConfigError::InvalidParameter {
            field: format!("products.{}.cost.{}", product_id, field),
            reason: reason.to_string(),
        };

        if !(self.rd_base > 0.0) {
            return Err(invalid("rd_base", "must be > 0"));
        }
        if !(self.rd_skew > 0.0) {
            return Err(invalid("rd_skew", "must be > 0"));
        }
        if !(self.material_base >= 0.0) {
            return Err(invalid("material_base", "must be >= 0"));
        }
        if !(0.10..=0.15).contains(&self.material_spread) {
            return Err(invalid("material_spread", "must be within [0.10, 0.15]"));
        }
        if !(self.labor_base > 0.0) {
            return Err(invalid("labor_base", "must be > 0"));
        }
        if !(self.quality_mean > 0.0) {
            return Err(invalid("quality_mean", "must be > 0"));
        }
        if !(self.amortization_volume >= 1.0) {
            return Err(invalid("amortization_volume", "must be >= 1"));
        }
        Ok(())
    }
}

/// A catalog product
///
/// # Example
/// ```
/// use partnership_simulator_core_rs::models::{ComplexityTier, Product};
///
/// let portfolio = Product::default_portfolio();
/// assert_eq!(portfolio.len(), 10);
/// assert!(portfolio.iter().any(|p| p.complexity == ComplexityTier::Medium));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,
    /// Display name
    pub name: String,
    pub category: ProductCategory,
    pub complexity: ComplexityTier,
    /// Innovation score in [0, 1]
    pub innovation_score: f64,
    pub cost: CostParams,
}

impl Product {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.id.is_empty() {
            return Err(ConfigError::InvalidParameter {
                field: "products.id".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.innovation_score) {
            return Err(ConfigError::InvalidParameter {
                field: format!("products.{}.innovation_score", self.id),
                reason: "must be within [0, 1]".to_string(),
            });
        }
        self.cost.validate(&self.id)
    }

    /// The ten-component portfolio the simulator ships with
    pub fn default_portfolio() -> Vec<Product> {
        use ComplexityTier::*;
        use ProductCategory::*;

        let spec: [(&str, &str, ProductCategory, ComplexityTier, f64, [f64; 5]); 10] = [
            // id, name, category, tier, innovation, [rd_base, material, labor, quality, rd_skew]
            ("hydrotex_liners", "Hydrotex Moisture-Control Liners", TechnicalInnerLayers, VeryHigh, 0.90, [575_000.0, 12.0, 8.0, 8.0, 0.30]),
            ("ecomesh_panels", "EcoMesh Ventilation Panels", TechnicalInnerLayers, High, 0.70, [275_000.0, 23.0, 10.0, 4.0, 0.25]),
            ("hd_insulation_pads", "HD Bonded Insulation Pads", TechnicalInnerLayers, High, 0.75, [230_000.0, 9.0, 7.0, 3.0, 0.25]),
            ("pcm_inserts", "Phase Change Material (PCM) Inserts", TechnicalInnerLayers, VeryHigh, 0.95, [450_000.0, 14.0, 9.0, 6.0, 0.35]),
            ("jacquard_reinforcement", "Performance Jacquard Reinforcement", StructuralEnhancement, High, 0.60, [180_000.0, 11.0, 6.0, 3.0, 0.20]),
            ("abrasion_bonding", "Abrasion-Resistant Bonding", StructuralEnhancement, High, 0.55, [160_000.0, 8.0, 6.0, 2.5, 0.20]),
            ("magnetic_closures", "Magnetic Lock Closures", StructuralEnhancement, Medium, 0.50, [120_000.0, 5.0, 3.0, 1.5, 0.15]),
            ("auto_tension_drawstrings", "Auto-Tension Drawstrings", StructuralEnhancement, Medium, 0.45, [90_000.0, 3.0, 2.5, 1.0, 0.15]),
            ("recycled_jacquard", "100% Recycled Performance Jacquard", SustainablePerformance, VeryHigh, 0.80, [300_000.0, 13.0, 6.0, 3.0, 0.30]),
            ("biobased_repellents", "Bio-Based Water Repellents", SustainablePerformance, VeryHigh, 0.85, [350_000.0, 7.0, 4.0, 2.0, 0.30]),
        ];

        spec.iter()
            .map(|(id, name, category, complexity, innovation, c)| Product {
                id: id.to_string(),
                name: name.to_string(),
                category: *category,
                complexity: *complexity,
                innovation_score: *innovation,
                cost: CostParams {
                    rd_base: c[0],
                    rd_skew: c[4],
                    material_base: c[1],
                    material_spread: 0.12,
                    labor_base: c[2],
                    quality_mean: c[3],
                    // 100k units a year over a five-year life
                    amortization_volume: 500_000.0,
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_portfolio_is_valid() {
        for product in Product::default_portfolio() {
            assert!(product.validate().is_ok(), "{} failed validation", product.id);
        }
    }

    #[test]
    fn test_material_spread_outside_band_rejected() {
        let mut product = Product::default_portfolio().remove(0);
        product.cost.material_spread = 0.3;
        assert!(matches!(
            product.validate(),
            Err(ConfigError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_tier_shares_decrease_with_complexity() {
        assert!(ComplexityTier::Low.max_capacity_share() > ComplexityTier::Medium.max_capacity_share());
        assert!(ComplexityTier::High.max_capacity_share() > ComplexityTier::VeryHigh.max_capacity_share());
    }
}
