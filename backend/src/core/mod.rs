//! Core simulation primitives

pub mod time;

pub use time::{TimeManager, TICKS_PER_YEAR};
