//! Convergence Monitor: a periodic four-criterion termination test, polled
//! by the coordinator every `poll_interval`.

use crate::config::MiningConfig;
use crate::data::ItemId;
use crate::partition::SearchPartition;
use crate::topk::TopK;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

/// Tracks history across polls: the last `stability_threshold` top-K
/// snapshots, when the top-K last changed, and the processed-count/time pair
/// from the previous poll (for the work-exhaustion processing-rate check).
pub struct ConvergenceMonitor {
    history: Mutex<VecDeque<Vec<BTreeSet<ItemId>>>>,
    last_change_at: Mutex<Instant>,
    last_poll: Mutex<(Instant, u64)>,
}

impl Default for ConvergenceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvergenceMonitor {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            history: Mutex::new(VecDeque::new()),
            last_change_at: Mutex::new(now),
            last_poll: Mutex::new((now, 0)),
        }
    }

    /// Runs one poll. Returns `true` once `(C_s ∧ C_b) ∨ C_w ∨ C_c`.
    pub fn poll(
        &self,
        topk: &TopK,
        partitions: &[Arc<SearchPartition>],
        config: &MiningConfig,
    ) -> bool {
        let items = topk.extract();
        let snapshot: Vec<BTreeSet<ItemId>> = items.iter().map(|i| i.items().clone()).collect();

        let mut history = self.history.lock().unwrap();
        let previous: HashSet<&BTreeSet<ItemId>> =
            history.back().map(|v| v.iter().collect()).unwrap_or_default();
        let current_set: HashSet<&BTreeSet<ItemId>> = snapshot.iter().collect();
        let discovered = current_set.difference(&previous).count();
        let changed = history.back() != Some(&snapshot);

        if changed {
            *self.last_change_at.lock().unwrap() = Instant::now();
        }
        history.push_back(snapshot);
        while history.len() > config.stability_threshold {
            history.pop_front();
        }
        let c_s = history.len() >= config.stability_threshold
            && history
                .iter()
                .all(|s| s == history.back().expect("just pushed"));
        drop(history);

        let full = items.len() >= topk.k();
        let tau = topk.threshold();

        let c_b = full
            && partitions
                .iter()
                .map(|p| p.upper_bound())
                .fold(f64::NEG_INFINITY, f64::max)
                < tau * (1.0 + config.bound_convergence_epsilon);

        let processed_total: u64 = partitions.iter().map(|p| p.processed()).sum();
        let search_space_total: u64 = partitions
            .iter()
            .map(|p| p.search_space(config.max_processed_per_partition))
            .sum();

        let mut last_poll = self.last_poll.lock().unwrap();
        let (prev_time, prev_processed) = *last_poll;
        let elapsed = prev_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            (processed_total.saturating_sub(prev_processed)) as f64 / elapsed
        } else {
            f64::INFINITY
        };
        *last_poll = (Instant::now(), processed_total);
        drop(last_poll);

        let exhaustion_ratio = if search_space_total == 0 {
            1.0
        } else {
            processed_total as f64 / search_space_total as f64
        };
        let c_w = exhaustion_ratio > config.work_exhaustion_fraction
            || rate < config.min_processing_rate;

        let minutes_since_change = self.last_change_at.lock().unwrap().elapsed().as_secs_f64() / 60.0;
        let s = sigmoid(0.5 * (minutes_since_change - 5.0));
        let v = 1.0 - (discovered as f64 / 10.0).min(1.0);
        let b = if items.is_empty() {
            0.0
        } else {
            items
                .iter()
                .map(|i| if i.ub <= 0.0 { 0.0 } else { i.eu / i.ub })
                .sum::<f64>()
                / items.len() as f64
        };
        let c_c = 0.4 * s + 0.3 * v + 0.3 * b >= config.confidence_threshold;

        (c_s && c_b) || c_w || c_c
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
