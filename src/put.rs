//! Probabilistic Utility Tensor: the precomputed single-item expected
//! utilities, the inverted index, and the expected utility memoization map.

use crate::config::MiningConfig;
use crate::data::Database;
use crate::data::ItemId;
use crate::euc;
use crate::euc::SynergyTable;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::RwLock;

/// Built once by the coordinator before any worker starts. The inverted
/// index is immutable after construction; the memoization map is the only
/// mutable part, and concurrent writes are idempotent (the function being
/// memoized is deterministic) — the same "cheap reads, serialized writes,
/// benign races" shape as `Arc<RwLock<Profile>>` elsewhere in this codebase.
pub struct Put {
    eu_single: HashMap<ItemId, f64>,
    inverted: HashMap<ItemId, Vec<usize>>,
    /// Whether an item's mean per-transaction utility is positive. Used by
    /// the Polar Bounds Calculator to split `U \ X` into `U+`/`U-`.
    positive: HashMap<ItemId, bool>,
    memo: RwLock<HashMap<BTreeSet<ItemId>, f64>>,
}

impl Put {
    /// Build the inverted index and single-item expected utilities by
    /// scanning `db` once.
    pub fn build(db: &Database, config: &MiningConfig) -> Self {
        let mut inverted: HashMap<ItemId, Vec<usize>> = HashMap::new();
        let mut utility_sums: HashMap<ItemId, (f64, usize)> = HashMap::new();
        for (idx, t) in db.transactions().iter().enumerate() {
            for (item, (_, u)) in t.items() {
                inverted.entry(item.clone()).or_default().push(idx);
                let entry = utility_sums.entry(item.clone()).or_insert((0.0, 0));
                entry.0 += u;
                entry.1 += 1;
            }
        }

        let mut eu_single = HashMap::new();
        let mut memo = HashMap::new();
        let synergies = SynergyTable::new();
        for item in db.items() {
            let members = inverted.get(item).cloned().unwrap_or_default();
            let key: BTreeSet<ItemId> = [item.clone()].into_iter().collect();
            let eu = euc::expected_utility(db, &members, &key, config, &synergies);
            eu_single.insert(item.clone(), eu);
            memo.insert(key, eu);
        }

        let positive = utility_sums
            .into_iter()
            .map(|(item, (sum, n))| (item, n > 0 && sum / (n as f64) > 0.0))
            .collect();

        Self {
            eu_single,
            inverted,
            positive,
            memo: RwLock::new(memo),
        }
    }

    pub fn eu_single(&self, item: &str) -> f64 {
        self.eu_single.get(item).copied().unwrap_or(0.0)
    }

    pub fn is_positive(&self, item: &ItemId) -> bool {
        self.positive.get(item).copied().unwrap_or(false)
    }

    pub fn inverted(&self, item: &ItemId) -> &[usize] {
        self.inverted.get(item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transactions containing every item of `itemset`: the intersection of
    /// each member item's inverted list, smallest list first.
    pub fn transactions_for(&self, itemset: &BTreeSet<ItemId>) -> Vec<usize> {
        let mut lists: Vec<&[usize]> = itemset.iter().map(|i| self.inverted(i)).collect();
        lists.sort_by_key(|l| l.len());
        let mut iter = lists.into_iter();
        let first = match iter.next() {
            Some(l) => l.iter().copied().collect::<BTreeSet<usize>>(),
            None => return Vec::new(),
        };
        iter.fold(first, |acc, list| {
            let set: BTreeSet<usize> = list.iter().copied().collect();
            acc.intersection(&set).copied().collect()
        })
        .into_iter()
        .collect()
    }

    /// Expected utility of `itemset`, consulting the memo first: cache
    /// writes are idempotent, a second call performs no transaction scan.
    pub fn expected_utility(
        &self,
        db: &Database,
        itemset: &BTreeSet<ItemId>,
        config: &MiningConfig,
        synergies: &SynergyTable,
    ) -> f64 {
        if let Some(&eu) = self.memo.read().unwrap().get(itemset) {
            return eu;
        }
        let members = self.transactions_for(itemset);
        let eu = euc::expected_utility(db, &members, itemset, config, synergies);
        self.memo.write().unwrap().insert(itemset.clone(), eu);
        eu
    }

    pub fn memo_len(&self) -> usize {
        self.memo.read().unwrap().len()
    }
}
