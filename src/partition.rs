//! Search Partition: a worker's slice of the item universe plus progress
//! counters and a per-partition upper bound used by the convergence
//! monitor.

use crate::data::ItemId;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::RwLock;

pub struct SearchPartition {
    pub id: usize,
    items: RwLock<BTreeSet<ItemId>>,
    processed: AtomicU64,
    terminated: AtomicBool,
    upper_bound_bits: AtomicU64,
}

impl SearchPartition {
    pub fn new(id: usize, items: BTreeSet<ItemId>) -> Self {
        Self {
            id,
            items: RwLock::new(items),
            processed: AtomicU64::new(0),
            terminated: AtomicBool::new(false),
            upper_bound_bits: AtomicU64::new(f64::INFINITY.to_bits()),
        }
    }

    pub fn items(&self) -> BTreeSet<ItemId> {
        self.items.read().unwrap().clone()
    }

    pub fn item_count(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Relaxed)
    }

    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::Relaxed);
    }

    pub fn upper_bound(&self) -> f64 {
        f64::from_bits(self.upper_bound_bits.load(Ordering::Relaxed))
    }

    pub fn set_upper_bound(&self, ub: f64) {
        self.upper_bound_bits.store(ub.to_bits(), Ordering::Relaxed);
    }

    /// Total search space for this partition's current item set:
    /// `min(2^|S_i| - 1, cap)`.
    pub fn search_space(&self, cap: usize) -> u64 {
        let n = self.item_count();
        if n >= 63 {
            return cap as u64;
        }
        ((1u64 << n) - 1).min(cap as u64)
    }

    /// Moves `count` unexplored single items from this partition's
    /// remaining item set to `recipient`'s. Only unexplored single items
    /// move; the recipient's in-flight level and candidate buffer are left
    /// untouched.
    pub fn transfer_to(&self, recipient: &SearchPartition, count: usize) -> usize {
        let mut donor = self.items.write().unwrap();
        let moving: Vec<ItemId> = donor.iter().take(count).cloned().collect();
        for item in &moving {
            donor.remove(item);
        }
        drop(donor);
        let mut theirs = recipient.items.write().unwrap();
        for item in &moving {
            theirs.insert(item.clone());
        }
        moving.len()
    }
}
