//! Global Top-K: a concurrent, at-most-K bounded min-ordered priority queue
//! keyed by `eu`, publishing a monotonically rising pruning threshold.
//!
//! The shared state is an immutable value swapped under an exclusive writer
//! lock with a version counter, the same shape this codebase uses for
//! `Arc<RwLock<Profile>>`: readers clone the `Arc` under a very short lock
//! and do all their real work lock-free afterwards; only the swap itself is
//! serialized.

use crate::config::MiningConfig;
use crate::data::ItemId;
use crate::data::Itemset;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Clone)]
struct TopKState {
    items: Vec<Itemset>,
    members: HashSet<BTreeSet<ItemId>>,
    version: u64,
}

impl TopKState {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            members: HashSet::new(),
            version: 0,
        }
    }

    fn min_eu(&self) -> Option<f64> {
        self.items.iter().map(|i| i.eu).fold(None, |acc, eu| {
            Some(acc.map_or(eu, |a: f64| a.min(eu)))
        })
    }

    fn inserted(&self, candidate: Itemset, k: usize) -> Self {
        let mut items = self.items.clone();
        let mut members = self.members.clone();
        members.insert(candidate.items().clone());
        items.push(candidate);
        if items.len() > k {
            let min_idx = items
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.cmp(b.1))
                .map(|(i, _)| i)
                .expect("items is non-empty here");
            let removed = items.swap_remove(min_idx);
            members.remove(removed.items());
        }
        Self {
            items,
            members,
            version: self.version + 1,
        }
    }

    fn consolidated(&self, k: usize) -> Self {
        let mut items = self.items.clone();
        items.sort_by(|a, b| b.cmp(a));
        items.truncate(k);
        let members = items.iter().map(|i| i.items().clone()).collect();
        Self {
            items,
            members,
            version: self.version,
        }
    }
}

pub struct TopK {
    k: usize,
    state: Mutex<Arc<TopKState>>,
    threshold_bits: AtomicU64,
    updates_since_consolidation: AtomicUsize,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            state: Mutex::new(Arc::new(TopKState::empty())),
            threshold_bits: AtomicU64::new(f64::NEG_INFINITY.to_bits()),
            updates_since_consolidation: AtomicUsize::new(0),
        }
    }

    /// Wait-free: the K-th largest `eu` currently held, or `-infinity` if
    /// the queue holds fewer than K items.
    pub fn threshold(&self) -> f64 {
        f64::from_bits(self.threshold_bits.load(Ordering::Acquire))
    }

    pub fn len(&self) -> usize {
        self.load().items.len()
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self) -> Arc<TopKState> {
        self.state.lock().unwrap().clone()
    }

    /// Compare-and-set `expected` for `new`. Fails if another writer raced
    /// ahead between `load()` and this call.
    fn cas(&self, expected: &Arc<TopKState>, new: TopKState) -> Result<(), ()> {
        let mut guard = self.state.lock().unwrap();
        if !Arc::ptr_eq(&guard, expected) {
            return Err(());
        }
        self.publish_threshold(&new);
        *guard = Arc::new(new);
        Ok(())
    }

    fn publish_threshold(&self, state: &TopKState) {
        if state.items.len() >= self.k {
            if let Some(min) = state.min_eu() {
                // Writes are serialized by the `state` lock, so successive
                // thresholds are non-decreasing by construction: a new state
                // only ever replaces the minimum with something that beat it.
                self.threshold_bits.store(min.to_bits(), Ordering::Release);
            }
        }
    }

    /// Merge a sorted-descending list of candidates. Duplicates are a no-op
    /// success; once a candidate fails to beat the current minimum, every
    /// lighter candidate after it in the list is skipped without a wasted
    /// CAS attempt.
    pub fn update(&self, mut candidates: Vec<Itemset>, config: &MiningConfig) {
        candidates.sort_by(|a, b| b.cmp(a));

        'candidates: for candidate in candidates {
            let key = candidate.items().clone();
            let mut attempt = 0usize;
            loop {
                let current = self.load();
                if current.members.contains(&key) {
                    continue 'candidates;
                }
                if current.items.len() >= self.k {
                    let min = current.min_eu().expect("full queue has a minimum");
                    if candidate.eu <= min {
                        break 'candidates;
                    }
                }
                let next = current.inserted(candidate.clone(), self.k);
                match self.cas(&current, next) {
                    Ok(()) => {
                        let count = self
                            .updates_since_consolidation
                            .fetch_add(1, Ordering::Relaxed)
                            + 1;
                        if count >= config.consolidation_threshold {
                            self.updates_since_consolidation.store(0, Ordering::Relaxed);
                            self.consolidate();
                        }
                        continue 'candidates;
                    }
                    Err(()) => {
                        attempt += 1;
                        if attempt >= config.max_cas_retries {
                            // Dropped silently: the threshold is monotone,
                            // so this candidate re-enters on a later
                            // equal-or-better offer, or the bound was
                            // already at least as tight.
                            continue 'candidates;
                        }
                        std::thread::sleep(Duration::from_micros(
                            50 * (1u64 << attempt.min(10)),
                        ));
                    }
                }
            }
        }
    }

    /// Re-heapify and trim to K, ensuring the membership set and the item
    /// list agree.
    fn consolidate(&self) {
        loop {
            let current = self.load();
            let next = current.consolidated(self.k);
            if self.cas(&current, next).is_ok() {
                return;
            }
        }
    }

    /// Snapshot, sort descending by `eu`, truncate to K (final extraction).
    pub fn extract(&self) -> Vec<Itemset> {
        let state = self.load();
        let mut items = state.items.clone();
        items.sort_by(|a, b| b.cmp(a));
        items.truncate(self.k);
        items
    }
}
