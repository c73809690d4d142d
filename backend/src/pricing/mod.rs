//! Unit pricing per partnership model
//!
//! ```text
//! markup = params.markup
//!        + segment_premium_weight × max(segment premium of brand)
//!        − volume_discount(units)
//! price  = unit_cost × (1 + markup)
//! margin = (price − unit_cost) / price
//! ```

use crate::models::{BrandProfile, ModelParams};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub unit_price: f64,
    pub unit_cost: f64,
    /// Gross margin as a fraction of price
    pub margin: f64,
}

/// Quote a price for `units` of a product to a brand
pub fn quote(unit_cost: f64, brand: &BrandProfile, params: &ModelParams, units: u64) -> PriceQuote {
    let premium = brand
        .segments
        .iter()
        .map(|s| s.co_branded_premium())
        .fold(0.0, f64::max);
    let markup = (params.markup + params.segment_premium_weight * premium
        - params.volume_discount(units))
    .max(0.0);

    let unit_price = unit_cost * (1.0 + markup);
    let margin = if unit_price > 0.0 {
        (unit_price - unit_cost) / unit_price
    } else {
        0.0
    };

    PriceQuote {
        unit_price,
        unit_cost,
        margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrganizationType, PricingTier, Segment};

    fn brand(segment: Segment) -> BrandProfile {
        BrandProfile {
            id: "B".to_string(),
            segments: vec![segment],
            organization: OrganizationType::Public,
            pricing_tier: PricingTier::Luxury,
            annual_revenue_k_eur: 1_000_000.0,
            average_unit_price: 600.0,
            innovation_affinity: 0.7,
            sustainability_priority: 0.6,
        }
    }

    #[test]
    fn test_co_branded_luxury_premium() {
        let q = quote(10.0, &brand(Segment::LuxuryFashion), &ModelParams::co_branded(), 1_000);
        assert!((q.unit_price - 14.7).abs() < 1e-9);
        assert!((q.margin - 4.7 / 14.7).abs() < 1e-12);
    }

    #[test]
    fn test_white_label_volume_discount() {
        let params = ModelParams::white_label();
        let small = quote(10.0, &brand(Segment::Athleisure), &params, 1_000);
        let large = quote(10.0, &brand(Segment::Athleisure), &params, 30_000);
        assert!((small.unit_price - 11.4).abs() < 1e-9);
        assert!((large.unit_price - 10.6).abs() < 1e-9);
        assert!(large.margin < small.margin);
    }
}
