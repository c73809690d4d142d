//! Domain models for the partnership simulator

pub mod brand;
pub mod event;
pub mod partnership;
pub mod product;

// Re-exports
pub use brand::{BrandProfile, BrandRecord, OrganizationType, PricingTier, Segment};
pub use event::{Event, EventLog};
pub use partnership::{
    ModelParams, Partnership, PartnershipModel, PartnershipStatus, RenewalRecord, VolumeDiscount,
};
pub use product::{ComplexityTier, CostParams, Product, ProductCategory};
