//! Batch statistics
//!
//! Descriptive statistics over per-run results, plus the canonical config
//! fingerprint that tags every summary.
//!
//! Percentiles use linear interpolation between order statistics
//! (position `q × (n − 1)` in the sorted sample).

use crate::models::PartnershipModel;
use crate::orchestrator::engine::{RunResult, SimulationError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

// ============================================================================
// Sample statistics
// ============================================================================

/// Arithmetic mean; 0.0 for an empty sample
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator); 0.0 below two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile of an ascending-sorted sample
///
/// # Example
/// ```
/// use partnership_simulator_core_rs::orchestrator::summary::quantile;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(quantile(&sorted, 0.5), 3.0);
/// assert_eq!(quantile(&sorted, 0.25), 2.0);
/// assert!((quantile(&sorted, 0.95) - 4.8).abs() < 1e-12);
/// ```
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Distribution summary of one metric across runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl MetricSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            mean: mean(values),
            std_dev: std_dev(values),
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            p5: quantile(&sorted, 0.05),
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.50),
            p75: quantile(&sorted, 0.75),
            p95: quantile(&sorted, 0.95),
        }
    }
}

// ============================================================================
// Batch summary
// ============================================================================

/// Aggregate view of one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub model: PartnershipModel,
    pub metrics: BTreeMap<String, MetricSummary>,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub failure_rate: f64,
    pub npv_profit_mean: f64,
    /// SHA-256 of the canonical JSON configuration
    pub config_fingerprint: String,
}

impl BatchSummary {
    pub fn from_results(
        model: PartnershipModel,
        results: &[RunResult],
        failed_runs: usize,
        config_fingerprint: String,
    ) -> Self {
        let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for result in results {
            for (name, value) in result.metric_values() {
                columns.entry(name.to_string()).or_default().push(value);
            }
        }
        let metrics: BTreeMap<String, MetricSummary> = columns
            .into_iter()
            .map(|(name, values)| (name, MetricSummary::from_values(&values)))
            .collect();

        let successful_runs = results.len();
        let total = successful_runs + failed_runs;
        let failure_rate = if total == 0 {
            0.0
        } else {
            failed_runs as f64 / total as f64
        };
        let npv_profit_mean = metrics.get("npv_profit").map(|m| m.mean).unwrap_or(0.0);

        Self {
            model,
            metrics,
            successful_runs,
            failed_runs,
            failure_rate,
            npv_profit_mean,
            config_fingerprint,
        }
    }

    pub fn metric(&self, name: &str) -> Option<&MetricSummary> {
        self.metrics.get(name)
    }
}

// ============================================================================
// Config fingerprint
// ============================================================================

/// SHA-256 hex digest of the config serialized as canonical JSON
///
/// Object keys are sorted recursively so the digest does not depend on
/// field or map ordering.
pub fn config_fingerprint<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;

    let value = serde_json::to_value(config)
        .map_err(|e| SimulationError::Serialization(format!("Config serialization failed: {}", e)))?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value))
        .map_err(|e| SimulationError::Serialization(format!("Config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
