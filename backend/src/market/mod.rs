//! Market evolution
//!
//! Macro indicators follow deterministic trends; stochastic shocks overlay
//! them for one to three quarters at a time.

pub mod manager;
pub mod shock;

pub use manager::{trend, MarketConfig, MarketState, MarketStateManager};
pub use shock::{ActiveShock, ShockKind, ShockRecord, ShockSpec, ShockTransition};
