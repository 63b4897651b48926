use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// All tunable mining constants, collected on one struct so the CLI can
/// load overrides from a JSON file while keeping sane defaults for anything
/// left unspecified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Uncertainty-discount factor `α` in the EUC variance penalty.
    pub alpha: f64,
    /// Optimism factor `ω` applied to the positive-gain term of `UB`.
    pub omega: f64,
    /// Negative-confidence factor `ε` applied to the negative-loss term of `UB`.
    pub epsilon: f64,
    /// Early-exit threshold on the running probability product in the EUC.
    pub probability_floor: f64,

    /// Level-wise search depth cap.
    pub max_itemset_size: usize,
    /// Flush-to-global-top-K cadence, in candidates processed.
    pub sync_interval: usize,
    /// Local buffer size that forces an early flush.
    pub flush_buffer_size: usize,
    /// `EU >= τ * speculation_factor` gate for speculative extension.
    pub speculation_factor: f64,
    /// Max single-item extensions tried per speculative candidate.
    pub max_speculation: usize,

    /// Re-heapify cadence for the global top-K.
    pub consolidation_threshold: usize,
    /// Max optimistic-update retries before a candidate is dropped.
    pub max_cas_retries: usize,

    /// Coordinator poll period for the convergence monitor.
    pub poll_interval: Duration,
    /// Consecutive identical polls required for stability (`C_s`).
    pub stability_threshold: usize,
    /// Slack in the bound-convergence criterion (`C_b`).
    pub bound_convergence_epsilon: f64,
    /// Work-exhaustion fraction threshold (`C_w`).
    pub work_exhaustion_fraction: f64,
    /// Minimum aggregate processing rate (candidates/sec) before `C_w` fires.
    pub min_processing_rate: f64,
    /// Combined-score threshold for the confidence criterion (`C_c`).
    pub confidence_threshold: f64,

    /// Load-rebalance trigger: deviation from the mean processed count.
    pub imbalance_fraction: f64,

    /// Hard cap on per-partition processed candidates.
    pub max_processed_per_partition: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            omega: 0.9,
            epsilon: 0.8,
            probability_floor: 1e-10,

            max_itemset_size: 20,
            sync_interval: 1000,
            flush_buffer_size: 100,
            speculation_factor: 1.2,
            max_speculation: 10,

            consolidation_threshold: 100,
            max_cas_retries: 10,

            poll_interval: Duration::from_millis(100),
            stability_threshold: 10,
            bound_convergence_epsilon: 0.01,
            work_exhaustion_fraction: 0.99,
            min_processing_rate: 1.0,
            confidence_threshold: 0.95,

            imbalance_fraction: 0.2,

            max_processed_per_partition: 1_000_000,
        }
    }
}

impl MiningConfig {
    /// Strict-mode bound (`ω = 1`) for correctness testing.
    pub fn strict() -> Self {
        Self {
            omega: 1.0,
            ..Self::default()
        }
    }

    /// No uncertainty discount and no synergy bonuses: the configuration
    /// used to pin down deterministic, reproducible expected-utility values
    /// in tests.
    pub fn deterministic() -> Self {
        Self {
            alpha: 0.0,
            ..Self::default()
        }
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
