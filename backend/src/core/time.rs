//! Time management for the simulation
//!
//! The simulation operates in discrete monthly ticks. Twelve ticks form a
//! year; renewals and efficiency gains happen on year boundaries.

use serde::{Deserialize, Serialize};

/// Ticks in one simulated year (one tick per month)
pub const TICKS_PER_YEAR: usize = 12;

/// Manages simulation time in discrete ticks and years
///
/// # Example
/// ```
/// use partnership_simulator_core_rs::TimeManager;
///
/// let mut time = TimeManager::new(60);
/// assert_eq!(time.current_tick(), 0);
/// assert_eq!(time.current_year(), 0);
///
/// time.advance_tick();
/// assert_eq!(time.current_tick(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeManager {
    /// Total ticks elapsed since simulation start
    current_tick: usize,
    /// Number of ticks before the run ends
    horizon: usize,
}

impl TimeManager {
    /// Create a new TimeManager for a run of `horizon` ticks
    ///
    /// # Panics
    /// Panics if `horizon` is zero. Configs are validated before this point.
    pub fn new(horizon: usize) -> Self {
        assert!(horizon > 0, "horizon must be positive");
        Self {
            current_tick: 0,
            horizon,
        }
    }

    /// Advance time by one tick
    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    /// Get the current tick (total ticks since start)
    pub fn current_tick(&self) -> usize {
        self.current_tick
    }

    /// Get the current year (0-indexed)
    ///
    /// # Example
    /// ```
    /// use partnership_simulator_core_rs::TimeManager;
    ///
    /// let mut time = TimeManager::new(60);
    /// for _ in 0..12 {
    ///     time.advance_tick();
    /// }
    /// assert_eq!(time.current_year(), 1);
    /// ```
    pub fn current_year(&self) -> usize {
        self.current_tick / TICKS_PER_YEAR
    }

    /// Month within the current year (0-indexed)
    pub fn month_within_year(&self) -> usize {
        self.current_tick % TICKS_PER_YEAR
    }

    /// True on the first tick of every year after the first
    pub fn is_year_boundary(&self) -> bool {
        self.current_tick > 0 && self.month_within_year() == 0
    }

    /// True once the horizon has been reached
    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.horizon
    }

    /// Total ticks in the run
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Number of (possibly partial) years the horizon covers
    pub fn years(&self) -> usize {
        self.horizon.div_ceil(TICKS_PER_YEAR)
    }
}
