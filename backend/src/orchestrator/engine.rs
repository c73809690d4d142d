//! Single-run simulation engine
//!
//! One `SimulationRun` is one Monte Carlo trial of one partnership model.
//! It owns everything mutable about the trial (RNG, market, capacity pool,
//! agent states, partnerships) and borrows the shared catalog and config.
//!
//! # Tick loop
//!
//! ```text
//! 1. market.advance(t)
//! 2. year boundary: pool.begin_year(), renewal of Active partnerships
//! 3. Pending → Active
//! 4. evaluate open (brand, product) pairs, queue accepted requests
//! 5. release ready requests to the allocator, form Pending partnerships
//! 6. accrue one month of revenue and cost for Active partnerships
//! 7. record utilization
//! 8. check capacity and market invariants
//! ```
//!
//! # Critical Invariants
//!
//! - **Determinism**: same catalog, config, model and run index give the
//!   same `RunResult`
//! - **Capacity**: `committed ≤ effective − overhead` after every tick
//! - **Partner cap**: no brand above `max_partner_allocation × total`

use crate::agents::{BrandAgent, BrandAgentState, Offer};
use crate::capacity::{allocate, CapacityError, CapacityPool, DemandRequest, GrantKind};
use crate::catalog::Catalog;
use crate::core::{TimeManager, TICKS_PER_YEAR};
use crate::costs::{CostError, CostSampler};
use crate::market::{MarketState, MarketStateManager, ShockRecord, ShockTransition};
use crate::models::{
    Event, EventLog, ModelParams, Partnership, PartnershipModel, PartnershipStatus, RenewalRecord,
};
use crate::orchestrator::config::{ConfigError, SimulationConfig};
use crate::orchestrator::renewal;
use crate::pricing;
use crate::rng::RngManager;
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Failure of a single trial; recorded by the batch, never fatal to it
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RunError {
    #[error("Capacity invariant violated: {0}")]
    InvariantViolation(#[from] CapacityError),

    #[error("Cost estimation failed: {0}")]
    Cost(#[from] CostError),

    #[error("Market indicators out of bounds at tick {tick}")]
    MarketOutOfBounds { tick: usize },
}

/// Umbrella error for the batch runner and bindings
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Run failed: {0}")]
    Run(#[from] RunError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickResult {
    pub tick: usize,
    pub decisions_queued: usize,
    pub partnerships_formed: usize,
    pub requests_rejected: usize,
    pub partnerships_lapsed: usize,
    pub revenue: f64,
    pub cost: f64,
    pub utilization: f64,
}

/// Outcome of one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub run_index: usize,
    pub model: PartnershipModel,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub total_profit: f64,
    pub npv_revenue: f64,
    pub npv_profit: f64,
    pub revenue_by_year: Vec<f64>,
    pub profit_by_year: Vec<f64>,
    pub avg_utilization: f64,
    pub peak_utilization: f64,
    pub final_utilization: f64,
    pub partnerships_formed: usize,
    pub partnerships_lapsed: usize,
    pub active_partnerships: usize,
    pub distinct_partners: usize,
    pub requests_rejected: usize,
    pub rejected_for_capacity: usize,
    pub shocks: Vec<ShockRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<EventLog>,
}

impl RunResult {
    /// Scalar metrics summarized across a batch
    pub fn metric_values(&self) -> [(&'static str, f64); 15] {
        [
            ("total_revenue", self.total_revenue),
            ("total_cost", self.total_cost),
            ("total_profit", self.total_profit),
            ("npv_revenue", self.npv_revenue),
            ("npv_profit", self.npv_profit),
            ("avg_utilization", self.avg_utilization),
            ("peak_utilization", self.peak_utilization),
            ("final_utilization", self.final_utilization),
            ("partnerships_formed", self.partnerships_formed as f64),
            ("partnerships_lapsed", self.partnerships_lapsed as f64),
            ("active_partnerships", self.active_partnerships as f64),
            ("distinct_partners", self.distinct_partners as f64),
            ("requests_rejected", self.requests_rejected as f64),
            ("rejected_for_capacity", self.rejected_for_capacity as f64),
            ("shock_count", self.shocks.len() as f64),
        ]
    }
}

/// Monthly rate equivalent to an annual rate: `(1 + r)^(1/12) − 1`
pub fn monthly_discount_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / TICKS_PER_YEAR as f64) - 1.0
}

// ============================================================================
// Run state
// ============================================================================

/// Accepted decision waiting for its delay to elapse
#[derive(Debug, Clone)]
struct QueuedRequest {
    brand_idx: usize,
    product_idx: usize,
    ready_tick: usize,
    request: DemandRequest,
}

#[derive(Debug, Clone, Default)]
struct Accounts {
    total_revenue: f64,
    total_cost: f64,
    npv_revenue: f64,
    npv_profit: f64,
    revenue_by_year: Vec<f64>,
    profit_by_year: Vec<f64>,
    utilization_sum: f64,
    peak_utilization: f64,
    final_utilization: f64,
    partnerships_lapsed: usize,
    requests_rejected: usize,
    rejected_for_capacity: usize,
}

/// One Monte Carlo trial
pub struct SimulationRun<'a> {
    catalog: &'a Catalog,
    model: PartnershipModel,
    params: &'a ModelParams,
    run_index: usize,
    rng: RngManager,
    time: TimeManager,
    market: MarketStateManager,
    pool: CapacityPool,
    agents: Vec<BrandAgent<'a>>,
    /// Mean unit cost per product, indexed like `catalog.products()`
    unit_costs: Vec<f64>,
    partnerships: Vec<Partnership>,
    /// (brand, product) index of each partnership
    partnership_pairs: Vec<(usize, usize)>,
    queue: Vec<QueuedRequest>,
    /// Pairs with a queued request or an unlapsed partnership
    open_pairs: HashSet<(usize, usize)>,
    /// Pairs whose partnership lapsed
    blocked_pairs: HashSet<(usize, usize)>,
    next_partnership_id: usize,
    monthly_rate: f64,
    accounts: Accounts,
    event_log: Option<EventLog>,
}

impl<'a> SimulationRun<'a> {
    /// Prepare a trial: seed the RNG, estimate unit costs, draw brand states
    ///
    /// The config is assumed validated; `MonteCarloRunner::new` does that.
    pub fn new(
        catalog: &'a Catalog,
        config: &'a SimulationConfig,
        model: PartnershipModel,
        run_index: usize,
    ) -> Result<Self, RunError> {
        let mut rng = RngManager::for_run(config.random_seed, run_index as u64);

        let sampler = CostSampler::new(catalog.products(), &config.scenarios);
        let mut unit_costs = Vec::with_capacity(catalog.products().len());
        for product in catalog.products() {
            let estimate = sampler.estimate(
                &product.id,
                &config.geography_scenario,
                config.cost_draws_per_run,
                &mut rng,
            )?;
            unit_costs.push(estimate.mean_unit_cost);
        }

        let agents = catalog
            .brands()
            .iter()
            .map(|profile| BrandAgent::new(profile, BrandAgentState::draw(profile, &mut rng)))
            .collect();

        let params = config.params_for(model);
        let mut pool = CapacityPool::new(config.capacity.clone());
        for m in PartnershipModel::ALL {
            pool = pool.with_setup_overhead(m, config.params_for(m).setup_overhead_units);
        }

        let time = TimeManager::new(config.time_horizon_ticks);
        let years = time.years();

        Ok(Self {
            catalog,
            model,
            params,
            run_index,
            rng,
            time,
            market: MarketStateManager::new(config.market.clone()),
            pool,
            agents,
            unit_costs,
            partnerships: Vec::new(),
            partnership_pairs: Vec::new(),
            queue: Vec::new(),
            open_pairs: HashSet::new(),
            blocked_pairs: HashSet::new(),
            next_partnership_id: 0,
            monthly_rate: monthly_discount_rate(config.discount_rate),
            accounts: Accounts {
                revenue_by_year: vec![0.0; years],
                profit_by_year: vec![0.0; years],
                ..Accounts::default()
            },
            event_log: config.record_events.then(EventLog::new),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn run_index(&self) -> usize {
        self.run_index
    }

    pub fn model(&self) -> PartnershipModel {
        self.model
    }

    pub fn current_tick(&self) -> usize {
        self.time.current_tick()
    }

    pub fn is_finished(&self) -> bool {
        self.time.is_finished()
    }

    pub fn pool(&self) -> &CapacityPool {
        &self.pool
    }

    pub fn market_state(&self) -> &MarketState {
        self.market.state()
    }

    pub fn partnerships(&self) -> &[Partnership] {
        &self.partnerships
    }

    pub fn agents(&self) -> &[BrandAgent<'a>] {
        &self.agents
    }

    /// Mean unit cost per product, in catalog order
    pub fn unit_costs(&self) -> &[f64] {
        &self.unit_costs
    }

    pub fn pending_requests(&self) -> usize {
        self.queue.len()
    }

    pub fn event_log(&self) -> Option<&EventLog> {
        self.event_log.as_ref()
    }

    fn log_event(&mut self, event: Event) {
        if let Some(log) = self.event_log.as_mut() {
            log.log(event);
        }
    }

    // ========================================================================
    // Tick Loop Implementation
    // ========================================================================

    /// Run every remaining tick and produce the result
    pub fn run(mut self) -> Result<RunResult, RunError> {
        while !self.time.is_finished() {
            self.tick()?;
        }
        Ok(self.finish())
    }

    /// Execute one month
    pub fn tick(&mut self) -> Result<TickResult, RunError> {
        let tick = self.time.current_tick();
        let mut result = TickResult {
            tick,
            decisions_queued: 0,
            partnerships_formed: 0,
            requests_rejected: 0,
            partnerships_lapsed: 0,
            revenue: 0.0,
            cost: 0.0,
            utilization: 0.0,
        };

        // 1. Market
        let market = self.market.advance(tick, &mut self.rng);
        let transitions = self.market.last_transitions().to_vec();
        for transition in transitions {
            let event = match transition {
                ShockTransition::Started(record) => Event::ShockStarted {
                    tick,
                    kind: record.kind,
                    magnitude: record.magnitude,
                    duration_ticks: record.duration_ticks,
                },
                ShockTransition::Ended { kind, tick } => Event::ShockEnded { tick, kind },
            };
            self.log_event(event);
        }

        // 2. Year boundary
        if self.time.is_year_boundary() {
            self.pool.begin_year();
            result.partnerships_lapsed = self.run_renewals(tick, &market)?;
        }

        // 3. Promote last tick's grants
        for partnership in &mut self.partnerships {
            partnership.activate();
        }

        // 4. Decisions
        result.decisions_queued = self.evaluate_pairs(tick, &market);

        // 5. Allocation
        let (formed, rejected) = self.allocate_ready(tick);
        result.partnerships_formed = formed;
        result.requests_rejected = rejected;

        // 6. Accrual
        let (revenue, cost) = self.accrue(tick, &market);
        result.revenue = revenue;
        result.cost = cost;

        // 7. Utilization
        let utilization = self.pool.utilization();
        self.accounts.utilization_sum += utilization;
        self.accounts.peak_utilization = self.accounts.peak_utilization.max(utilization);
        self.accounts.final_utilization = utilization;
        result.utilization = utilization;

        // 8. Invariants
        self.pool.check_invariants()?;
        if !market.is_within_bounds() {
            return Err(RunError::MarketOutOfBounds { tick });
        }

        self.time.advance_tick();
        Ok(result)
    }

    /// Annual renewal of every Active partnership; returns the lapse count
    fn run_renewals(&mut self, tick: usize, market: &MarketState) -> Result<usize, RunError> {
        let mut lapsed = 0;
        for idx in 0..self.partnerships.len() {
            if self.partnerships[idx].status != PartnershipStatus::Active {
                continue;
            }
            let (brand_idx, product_idx) = self.partnership_pairs[idx];
            let product = &self.catalog.products()[product_idx];
            let primary_segment = self.catalog.brands()[brand_idx].primary_segment();

            let assessment = renewal::assess(
                &self.partnerships[idx],
                product.complexity,
                primary_segment,
                self.params,
                market,
                &mut self.rng,
            );
            let draw = self.rng.next_f64();
            let renewed = draw <= assessment.probability;

            let partnership = &mut self.partnerships[idx];
            partnership.record_renewal(RenewalRecord {
                tick,
                probability: assessment.probability,
                draw,
                renewed,
            });
            let partnership_id = partnership.id.clone();
            let brand_id = partnership.brand_id.clone();
            let product_id = partnership.product_id.clone();
            let units = partnership.allocated_units;
            let model = partnership.model;

            self.log_event(Event::RenewalEvaluated {
                tick,
                partnership_id: partnership_id.clone(),
                probability: assessment.probability,
                renewed,
            });

            if !renewed {
                self.pool.release(&brand_id, &product_id, model, units)?;
                self.open_pairs.remove(&(brand_idx, product_idx));
                self.blocked_pairs.insert((brand_idx, product_idx));
                self.accounts.partnerships_lapsed += 1;
                lapsed += 1;
                self.log_event(Event::PartnershipLapsed {
                    tick,
                    partnership_id,
                    released_units: units,
                });
            }
        }
        Ok(lapsed)
    }

    /// Evaluate every open pair; returns the number of requests queued
    fn evaluate_pairs(&mut self, tick: usize, market: &MarketState) -> usize {
        let mut queued = 0;
        for brand_idx in 0..self.agents.len() {
            for product_idx in 0..self.catalog.products().len() {
                let pair = (brand_idx, product_idx);
                if self.open_pairs.contains(&pair) || self.blocked_pairs.contains(&pair) {
                    continue;
                }

                let agent = &self.agents[brand_idx];
                let product = &self.catalog.products()[product_idx];
                let volume = agent.demand_units(product, self.params, &mut self.rng);
                let quote = pricing::quote(self.unit_costs[product_idx], agent.profile(), self.params, volume);
                let offer = Offer {
                    product,
                    margin: quote.margin,
                };
                let decision = agent.evaluate(&offer, self.params, market, &mut self.rng);
                if !decision.accept {
                    continue;
                }

                let profile = agent.profile();
                let ready_tick = tick + decision.delay_ticks;
                let request = DemandRequest {
                    brand_id: profile.id.clone(),
                    product_id: product.id.clone(),
                    model: self.model,
                    volume,
                    margin: quote.margin,
                    strategic_value: profile.strategic_value(self.model),
                    max_product_share: product.complexity.max_capacity_share(),
                    unit_price: quote.unit_price,
                    unit_cost: quote.unit_cost,
                };
                self.log_event(Event::DecisionQueued {
                    tick,
                    brand_id: request.brand_id.clone(),
                    product_id: request.product_id.clone(),
                    ready_tick,
                    units: volume,
                });
                self.queue.push(QueuedRequest {
                    brand_idx,
                    product_idx,
                    ready_tick,
                    request,
                });
                self.open_pairs.insert(pair);
                queued += 1;
            }
        }
        queued
    }

    /// Allocate requests whose delay has elapsed; returns (formed, rejected)
    fn allocate_ready(&mut self, tick: usize) -> (usize, usize) {
        let (ready, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.queue).into_iter().partition(|q| q.ready_tick <= tick);
        self.queue = waiting;
        if ready.is_empty() {
            return (0, 0);
        }

        let requests: Vec<DemandRequest> = ready.iter().map(|q| q.request.clone()).collect();
        let outcome = allocate(&requests, &mut self.pool);

        let mut granted = vec![false; ready.len()];
        for allocation in &outcome.accepted {
            let queued = &ready[allocation.request_index];
            granted[allocation.request_index] = true;

            self.next_partnership_id += 1;
            let id = format!("p_{:06}", self.next_partnership_id);
            self.partnerships.push(Partnership {
                id: id.clone(),
                brand_id: queued.request.brand_id.clone(),
                product_id: queued.request.product_id.clone(),
                model: self.model,
                allocated_units: allocation.granted,
                unit_price: queued.request.unit_price,
                unit_cost: queued.request.unit_cost,
                start_tick: tick,
                status: PartnershipStatus::Pending,
                renewal_history: Vec::new(),
            });
            self.partnership_pairs.push((queued.brand_idx, queued.product_idx));
            self.log_event(Event::PartnershipFormed {
                tick,
                partnership_id: id,
                brand_id: allocation.brand_id.clone(),
                product_id: allocation.product_id.clone(),
                units: allocation.granted,
                partial: allocation.kind != GrantKind::Full,
            });
        }

        for rejection in &outcome.rejected {
            self.log_event(Event::RequestRejected {
                tick,
                brand_id: rejection.brand_id.clone(),
                product_id: rejection.product_id.clone(),
                units: rejection.units,
                reason: rejection.reason,
            });
        }

        // Turned-down pairs may apply again
        let mut rejected = 0;
        for (idx, queued) in ready.iter().enumerate() {
            if !granted[idx] {
                self.open_pairs.remove(&(queued.brand_idx, queued.product_idx));
                rejected += 1;
            }
        }

        self.accounts.requests_rejected += outcome.rejected.len();
        self.accounts.rejected_for_capacity += outcome.capacity_rejections();
        (outcome.accepted.len(), rejected)
    }

    /// One month of revenue and cost; returns (revenue, cost)
    fn accrue(&mut self, tick: usize, market: &MarketState) -> (f64, f64) {
        let months = TICKS_PER_YEAR as f64;
        let (revenue, cost) = self
            .partnerships
            .iter()
            .filter(|p| p.status == PartnershipStatus::Active)
            .fold((0.0, 0.0), |(r, c), p| {
                let units = p.allocated_units as f64 / months;
                (r + units * p.unit_price, c + units * p.unit_cost * market.cost_pressure)
            });

        let profit = revenue - cost;
        let discount = (1.0 + self.monthly_rate).powi(tick as i32 + 1);
        let year = self.time.current_year();

        let accounts = &mut self.accounts;
        accounts.total_revenue += revenue;
        accounts.total_cost += cost;
        accounts.npv_revenue += revenue / discount;
        accounts.npv_profit += profit / discount;
        if let Some(slot) = accounts.revenue_by_year.get_mut(year) {
            *slot += revenue;
        }
        if let Some(slot) = accounts.profit_by_year.get_mut(year) {
            *slot += profit;
        }
        (revenue, cost)
    }

    fn finish(self) -> RunResult {
        let ticks = self.time.current_tick().max(1) as f64;
        let distinct_partners = self
            .partnerships
            .iter()
            .map(|p| p.brand_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let active_partnerships = self.partnerships.iter().filter(|p| p.is_open()).count();
        let accounts = self.accounts;

        let result = RunResult {
            run_index: self.run_index,
            model: self.model,
            total_revenue: accounts.total_revenue,
            total_cost: accounts.total_cost,
            total_profit: accounts.total_revenue - accounts.total_cost,
            npv_revenue: accounts.npv_revenue,
            npv_profit: accounts.npv_profit,
            revenue_by_year: accounts.revenue_by_year,
            profit_by_year: accounts.profit_by_year,
            avg_utilization: accounts.utilization_sum / ticks,
            peak_utilization: accounts.peak_utilization,
            final_utilization: accounts.final_utilization,
            partnerships_formed: self.partnerships.len(),
            partnerships_lapsed: accounts.partnerships_lapsed,
            active_partnerships,
            distinct_partners,
            requests_rejected: accounts.requests_rejected,
            rejected_for_capacity: accounts.rejected_for_capacity,
            shocks: self.market.shock_history().to_vec(),
            events: self.event_log,
        };

        tracing::debug!(
            target: "sim.run",
            run_index = result.run_index,
            model = %result.model,
            total_profit = result.total_profit,
            partnerships = result.partnerships_formed,
            lapsed = result.partnerships_lapsed,
            "Run complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rate_compounds_to_annual() {
        let r = monthly_discount_rate(0.08);
        assert!(((1.0 + r).powi(12) - 1.08).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rate_is_zero() {
        assert_eq!(monthly_discount_rate(0.0), 0.0);
    }
}
