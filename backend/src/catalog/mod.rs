//! Validated simulation inputs
//!
//! A `Catalog` is the read-only product list and brand population shared
//! by every run of a batch. Building one validates ids and parameters and
//! fills missing brand metrics:
//!
//! 1. mean of the brand's primary-segment peers that report the metric
//! 2. otherwise a built-in default for the segment
//!
//! Every fill is logged at warn level and recorded as a `Substitution`.

use crate::models::{BrandProfile, BrandRecord, Product, Segment};
use crate::orchestrator::config::ConfigError;
use serde::Serialize;
use std::collections::HashSet;

/// Brand metric that can be missing from a `BrandRecord`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandMetric {
    AnnualRevenue,
    AverageUnitPrice,
    InnovationAffinity,
    SustainabilityPriority,
}

impl BrandMetric {
    const ALL: [BrandMetric; 4] = [
        BrandMetric::AnnualRevenue,
        BrandMetric::AverageUnitPrice,
        BrandMetric::InnovationAffinity,
        BrandMetric::SustainabilityPriority,
    ];

    fn read(&self, record: &BrandRecord) -> Option<f64> {
        let value = match self {
            BrandMetric::AnnualRevenue => record.annual_revenue_k_eur,
            BrandMetric::AverageUnitPrice => record.average_unit_price,
            BrandMetric::InnovationAffinity => record.innovation_affinity,
            BrandMetric::SustainabilityPriority => record.sustainability_priority,
        };
        value.filter(|v| v.is_finite())
    }

    /// Built-in value for a segment with no reporting peers
    fn segment_default(&self, segment: Segment) -> f64 {
        // (revenue k EUR, unit price EUR, innovation, sustainability)
        let row: (f64, f64, f64, f64) = match segment {
            Segment::CoreTechnicalSportswear => (500_000.0, 60.0, 0.7, 0.5),
            Segment::OutdoorTechnical => (300_000.0, 150.0, 0.7, 0.7),
            Segment::Athleisure => (200_000.0, 80.0, 0.5, 0.5),
            Segment::LuxuryActivewear => (150_000.0, 250.0, 0.6, 0.5),
            Segment::Athluxury => (100_000.0, 350.0, 0.6, 0.5),
            Segment::HighPerformanceLuxury => (250_000.0, 600.0, 0.8, 0.6),
            Segment::LuxuryFashion => (1_000_000.0, 1_200.0, 0.4, 0.4),
        };
        match self {
            BrandMetric::AnnualRevenue => row.0,
            BrandMetric::AverageUnitPrice => row.1,
            BrandMetric::InnovationAffinity => row.2,
            BrandMetric::SustainabilityPriority => row.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackSource {
    SegmentPeers,
    SegmentDefault,
}

/// One filled-in brand metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Substitution {
    pub brand_id: String,
    pub metric: BrandMetric,
    pub value: f64,
    pub source: FallbackSource,
}

/// Products and brands for a batch
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    brands: Vec<BrandProfile>,
    substitutions: Vec<Substitution>,
}

impl Catalog {
    /// Validate inputs and fill missing brand metrics
    pub fn new(products: Vec<Product>, records: Vec<BrandRecord>) -> Result<Self, ConfigError> {
        if products.is_empty() || records.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        validate_products(&products)?;

        let mut seen = HashSet::new();
        for record in &records {
            if record.segments.is_empty() {
                return Err(ConfigError::NoSegments(record.id.clone()));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(ConfigError::DuplicateId(record.id.clone()));
            }
        }

        let mut substitutions = Vec::new();
        let mut brands = Vec::with_capacity(records.len());
        for record in &records {
            let mut fill = |metric: BrandMetric| -> f64 {
                if let Some(value) = metric.read(record) {
                    return value;
                }
                let (value, source) = fallback(metric, record, &records);
                tracing::warn!(
                    target: "sim.catalog",
                    brand_id = %record.id,
                    metric = ?metric,
                    value,
                    source = ?source,
                    "Missing brand metric filled"
                );
                substitutions.push(Substitution {
                    brand_id: record.id.clone(),
                    metric,
                    value,
                    source,
                });
                value
            };
            let values: Vec<f64> = BrandMetric::ALL.iter().map(|m| fill(*m)).collect();

            let profile = BrandProfile {
                id: record.id.clone(),
                segments: record.segments.clone(),
                organization: record.organization,
                pricing_tier: record.pricing_tier,
                annual_revenue_k_eur: values[0],
                average_unit_price: values[1],
                innovation_affinity: values[2].clamp(0.0, 1.0),
                sustainability_priority: values[3].clamp(0.0, 1.0),
            };
            validate_profile(&profile)?;
            brands.push(profile);
        }

        Ok(Self {
            products,
            brands,
            substitutions,
        })
    }

    /// Build from already-complete profiles
    pub fn from_profiles(products: Vec<Product>, brands: Vec<BrandProfile>) -> Result<Self, ConfigError> {
        if products.is_empty() || brands.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        validate_products(&products)?;
        let mut seen = HashSet::new();
        for brand in &brands {
            if brand.segments.is_empty() {
                return Err(ConfigError::NoSegments(brand.id.clone()));
            }
            if !seen.insert(brand.id.as_str()) {
                return Err(ConfigError::DuplicateId(brand.id.clone()));
            }
            validate_profile(brand)?;
        }
        Ok(Self {
            products,
            brands,
            substitutions: Vec::new(),
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn brands(&self) -> &[BrandProfile] {
        &self.brands
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    pub fn brand(&self, brand_id: &str) -> Option<&BrandProfile> {
        self.brands.iter().find(|b| b.id == brand_id)
    }

    /// Metrics filled in while building the catalog
    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }
}

fn validate_products(products: &[Product]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for product in products {
        if !seen.insert(product.id.as_str()) {
            return Err(ConfigError::DuplicateId(product.id.clone()));
        }
        product.validate()?;
    }
    Ok(())
}

fn validate_profile(profile: &BrandProfile) -> Result<(), ConfigError> {
    if !(profile.annual_revenue_k_eur > 0.0) {
        return Err(ConfigError::NonPositive {
            field: format!("{}.annual_revenue_k_eur", profile.id),
        });
    }
    if !(profile.average_unit_price > 0.0) {
        return Err(ConfigError::NonPositive {
            field: format!("{}.average_unit_price", profile.id),
        });
    }
    let unit_interval = [
        ("innovation_affinity", profile.innovation_affinity),
        ("sustainability_priority", profile.sustainability_priority),
    ];
    for (field, value) in unit_interval {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::InvalidParameter {
                field: format!("{}.{}", profile.id, field),
                reason: "must be within [0, 1]".to_string(),
            });
        }
    }
    Ok(())
}

fn fallback(metric: BrandMetric, record: &BrandRecord, all: &[BrandRecord]) -> (f64, FallbackSource) {
    let segment = record.segments[0];
    let peers: Vec<f64> = all
        .iter()
        .filter(|r| r.id != record.id && r.segments.first() == Some(&segment))
        .filter_map(|r| metric.read(r))
        .collect();

    if peers.is_empty() {
        (metric.segment_default(segment), FallbackSource::SegmentDefault)
    } else {
        (
            peers.iter().sum::<f64>() / peers.len() as f64,
            FallbackSource::SegmentPeers,
        )
    }
}
