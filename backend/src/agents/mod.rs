//! Brand agents
//!
//! Immutable brand profiles paired with per-run traits. Agents score
//! offers, decide with noise, and size their demand.

pub mod brand_agent;
pub mod state;

pub use brand_agent::{BrandAgent, Decision, Offer, SubScores, NOISE_SD, SCORE_WEIGHTS};
pub use state::{BrandAgentState, THRESHOLD_RANGE};
