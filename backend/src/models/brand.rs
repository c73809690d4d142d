//! Brand models
//!
//! Brands are static, read-only inputs. `BrandRecord` is the raw form as it
//! arrives from market intelligence, with some metrics possibly missing;
//! `BrandProfile` is the validated form the simulation consumes. Per-run
//! behavioural traits live separately in `agents::BrandAgentState`.

use crate::models::partnership::PartnershipModel;
use serde::{Deserialize, Serialize};

/// One of the seven market clusters on the function/fashion plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    CoreTechnicalSportswear,
    OutdoorTechnical,
    Athleisure,
    LuxuryActivewear,
    Athluxury,
    HighPerformanceLuxury,
    LuxuryFashion,
}

impl Segment {
    pub const ALL: [Segment; 7] = [
        Segment::CoreTechnicalSportswear,
        Segment::OutdoorTechnical,
        Segment::Athleisure,
        Segment::LuxuryActivewear,
        Segment::Athluxury,
        Segment::HighPerformanceLuxury,
        Segment::LuxuryFashion,
    ];

    /// Zero-based index, for per-segment arrays
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// (function, fashion) coordinates
    pub fn coordinates(&self) -> (f64, f64) {
        match self {
            Segment::CoreTechnicalSportswear => (1.0, 0.2),
            Segment::OutdoorTechnical => (0.8, 0.4),
            Segment::Athleisure => (0.4, 0.6),
            Segment::LuxuryActivewear => (0.8, 0.4),
            Segment::Athluxury => (0.4, 0.8),
            Segment::HighPerformanceLuxury => (0.8, 0.8),
            Segment::LuxuryFashion => (0.2, 1.0),
        }
    }

    /// Segments 4-7
    pub fn is_upper_market(&self) -> bool {
        self.index() >= 3
    }

    /// Baseline annual growth rate
    pub fn base_growth(&self) -> f64 {
        [0.02, 0.05, 0.04, 0.08, 0.06, 0.10, 0.01][self.index()]
    }

    /// Market saturation at tick 0
    pub fn base_saturation(&self) -> f64 {
        [0.8, 0.6, 0.7, 0.4, 0.3, 0.2, 0.9][self.index()]
    }

    /// Allocation priority of a brand in this segment under a model
    pub fn strategic_priority(&self, model: PartnershipModel) -> f64 {
        match model {
            PartnershipModel::CoBranded => [0.8, 0.9, 1.0, 1.2, 1.5, 1.8, 2.0][self.index()],
            PartnershipModel::WhiteLabel => [1.5, 1.4, 1.3, 1.0, 0.8, 0.6, 0.4][self.index()],
        }
    }

    /// Extra co-branded markup a brand in this segment pays
    pub fn co_branded_premium(&self) -> f64 {
        [0.0, 0.02, 0.03, 0.05, 0.07, 0.10, 0.12][self.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationType {
    Public,
    FamilyOwned,
}

/// Price positioning of the brand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingTier {
    Value,
    Mid,
    Premium,
    Luxury,
}

impl PricingTier {
    /// Supplier margin the brand accepts without friction
    pub fn margin_tolerance(&self) -> f64 {
        match self {
            PricingTier::Value => 0.15,
            PricingTier::Mid => 0.25,
            PricingTier::Premium => 0.35,
            PricingTier::Luxury => 0.50,
        }
    }
}

/// Raw brand record as delivered by the market-intelligence collaborator
///
/// Numeric metrics may be absent; `Catalog::new` fills them from the
/// brand's segment peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandRecord {
    pub id: String,
    pub segments: Vec<Segment>,
    pub organization: OrganizationType,
    pub pricing_tier: PricingTier,
    #[serde(default)]
    pub annual_revenue_k_eur: Option<f64>,
    #[serde(default)]
    pub average_unit_price: Option<f64>,
    #[serde(default)]
    pub innovation_affinity: Option<f64>,
    #[serde(default)]
    pub sustainability_priority: Option<f64>,
}

/// Validated, immutable brand profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub id: String,
    /// Non-empty; the first entry is the primary segment
    pub segments: Vec<Segment>,
    pub organization: OrganizationType,
    pub pricing_tier: PricingTier,
    /// Annual revenue in thousands of EUR
    pub annual_revenue_k_eur: f64,
    /// Average retail price of one garment (EUR)
    pub average_unit_price: f64,
    /// Innovation affinity in [0, 1]
    pub innovation_affinity: f64,
    /// Sustainability priority in [0, 1]
    pub sustainability_priority: f64,
}

impl BrandProfile {
    pub fn primary_segment(&self) -> Segment {
        self.segments
            .first()
            .copied()
            .unwrap_or(Segment::CoreTechnicalSportswear)
    }

    /// Mean (function, fashion) over the brand's segments
    pub fn coordinates(&self) -> (f64, f64) {
        if self.segments.is_empty() {
            return Segment::CoreTechnicalSportswear.coordinates();
        }
        let n = self.segments.len() as f64;
        let (f, s) = self
            .segments
            .iter()
            .map(Segment::coordinates)
            .fold((0.0, 0.0), |acc, c| (acc.0 + c.0, acc.1 + c.1));
        (f / n, s / n)
    }

    pub fn is_upper_market(&self) -> bool {
        self.segments.iter().any(Segment::is_upper_market)
    }

    pub fn in_segment(&self, segment: Segment) -> bool {
        self.segments.contains(&segment)
    }

    /// Annual garment output: revenue × 1000 / average unit price
    pub fn estimated_production(&self) -> f64 {
        self.annual_revenue_k_eur * 1000.0 / self.average_unit_price
    }

    /// Highest segment priority the brand holds under a model
    pub fn strategic_value(&self, model: PartnershipModel) -> f64 {
        self.segments
            .iter()
            .map(|s| s.strategic_priority(model))
            .fold(0.0, f64::max)
    }
}
