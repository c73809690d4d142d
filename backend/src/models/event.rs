//! Event logging for run replay and auditing.
//!
//! This module defines the Event enum which captures all significant state
//! changes during a single Monte Carlo run. Events enable:
//! - Debugging (understand what happened and when)
//! - Auditing (verify capacity decisions and renewals)
//! - Analysis (shock timing, partnership lifecycles)
//!
//! Recording is off by default in batches and switched on with
//! `SimulationConfig::record_events`.
//!
//! # Example
//!
//! ```rust
//! use partnership_simulator_core_rs::models::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::PartnershipFormed {
//!     tick: 3,
//!     partnership_id: "p_000001".to_string(),
//!     brand_id: "BRAND_A".to_string(),
//!     product_id: "pcm_inserts".to_string(),
//!     units: 12_000,
//!     partial: false,
//! });
//!
//! assert_eq!(log.events_at_tick(3).len(), 1);
//! ```

use crate::capacity::RejectionReason;
use crate::market::ShockKind;
use serde::Serialize;

/// Run event capturing a state change.
///
/// All events include a tick number for temporal ordering.
/// Events are logged in the order they occur within a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A market shock started
    ShockStarted {
        tick: usize,
        kind: ShockKind,
        magnitude: f64,
        duration_ticks: usize,
    },

    /// The active shock expired and indicators returned to trend
    ShockEnded { tick: usize, kind: ShockKind },

    /// A brand accepted a product and queued a request
    DecisionQueued {
        tick: usize,
        brand_id: String,
        product_id: String,
        ready_tick: usize,
        units: u64,
    },

    /// Capacity was granted and a partnership created
    PartnershipFormed {
        tick: usize,
        partnership_id: String,
        brand_id: String,
        product_id: String,
        units: u64,
        partial: bool,
    },

    /// A request (or its unfulfilled remainder) was rejected
    RequestRejected {
        tick: usize,
        brand_id: String,
        product_id: String,
        units: u64,
        reason: RejectionReason,
    },

    /// Annual renewal check
    RenewalEvaluated {
        tick: usize,
        partnership_id: String,
        probability: f64,
        renewed: bool,
    },

    /// Partnership lapsed and released its capacity
    PartnershipLapsed {
        tick: usize,
        partnership_id: String,
        released_units: u64,
    },
}

impl Event {
    /// Get the tick number when this event occurred
    pub fn tick(&self) -> usize {
        match self {
            Event::ShockStarted { tick, .. } => *tick,
            Event::ShockEnded { tick, .. } => *tick,
            Event::DecisionQueued { tick, .. } => *tick,
            Event::PartnershipFormed { tick, .. } => *tick,
            Event::RequestRejected { tick, .. } => *tick,
            Event::RenewalEvaluated { tick, .. } => *tick,
            Event::PartnershipLapsed { tick, .. } => *tick,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::ShockStarted { .. } => "ShockStarted",
            Event::ShockEnded { .. } => "ShockEnded",
            Event::DecisionQueued { .. } => "DecisionQueued",
            Event::PartnershipFormed { .. } => "PartnershipFormed",
            Event::RequestRejected { .. } => "RequestRejected",
            Event::RenewalEvaluated { .. } => "RenewalEvaluated",
            Event::PartnershipLapsed { .. } => "PartnershipLapsed",
        }
    }

    /// Brand involved in this event (if applicable)
    pub fn brand_id(&self) -> Option<&str> {
        match self {
            Event::DecisionQueued { brand_id, .. }
            | Event::PartnershipFormed { brand_id, .. }
            | Event::RequestRejected { brand_id, .. } => Some(brand_id),
            _ => None,
        }
    }
}

/// Append-only event log for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_at_tick(&self, tick: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.tick() == tick).collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn events_for_brand(&self, brand_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.brand_id() == Some(brand_id))
            .collect()
    }
}
