//! Worker Miner / `UncertainMine`: Apriori-style level-wise candidate
//! generation over a single `SearchPartition`, with pruning, speculative
//! extension, and periodic flush into the global top-K.

use crate::bounds;
use crate::config::MiningConfig;
use crate::data::Database;
use crate::data::ItemId;
use crate::data::Itemset;
use crate::euc::SynergyTable;
use crate::partition::SearchPartition;
use crate::put::Put;
use crate::topk::TopK;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::sync::Arc;

/// Mines one worker's partition to completion. Holds everything read-only
/// except `partition`, `topk`, and `put`'s memo map, all of which carry their
/// own interior synchronization — this struct itself needs no lock.
pub struct Miner {
    db: Arc<Database>,
    put: Arc<Put>,
    topk: Arc<TopK>,
    partition: Arc<SearchPartition>,
    config: Arc<MiningConfig>,
    synergies: Arc<SynergyTable>,
    /// Snapshot of the partition's item set taken at worker start. Load
    /// rebalancing may still grow/shrink the underlying `SearchPartition`;
    /// this worker picks that up only on its next `run()`, not mid-flight —
    /// the safe-default transfer semantics this crate chose (see DESIGN.md).
    partition_items: BTreeSet<ItemId>,
    universe: BTreeSet<ItemId>,
}

impl Miner {
    pub fn new(
        db: Arc<Database>,
        put: Arc<Put>,
        topk: Arc<TopK>,
        partition: Arc<SearchPartition>,
        config: Arc<MiningConfig>,
        synergies: Arc<SynergyTable>,
        universe: BTreeSet<ItemId>,
    ) -> Self {
        let partition_items = partition.items();
        Self {
            db,
            put,
            topk,
            partition,
            config,
            synergies,
            partition_items,
            universe,
        }
    }

    /// Drives the level-wise search to completion, flushing survivors into
    /// the global top-K as it goes and on exit. Level 1 (the partition's raw
    /// single items) is pushed through the same evaluate/prune/emit pipeline
    /// as every later level, so a singleton itemset is as eligible for the
    /// top-K as any pair or triple.
    pub fn run(&self) {
        let mut level = self.seed_level();
        let mut buffer = Vec::new();
        let mut since_sync = 0usize;
        let cap = self.partition.search_space(self.config.max_processed_per_partition);

        loop {
            if level.is_empty() || self.partition.is_terminated() {
                break;
            }

            let mut survivors = Vec::new();
            let mut interrupted = false;
            for mut candidate in level {
                if self.partition.is_terminated() {
                    interrupted = true;
                    break;
                }

                let tau = self.topk.threshold();
                self.evaluate(&mut candidate);

                if candidate.ub >= tau {
                    if candidate.eu >= tau {
                        buffer.push(candidate.clone());
                    }
                    self.speculate(&candidate, tau, &mut buffer);
                    survivors.push(candidate);
                }

                self.partition.inc_processed();
                since_sync += 1;
                if since_sync >= self.config.sync_interval
                    || buffer.len() > self.config.flush_buffer_size
                {
                    self.flush(&mut buffer);
                    since_sync = 0;
                }
                if self.partition.processed() >= cap {
                    self.flush(&mut buffer);
                    return;
                }
            }

            if interrupted || survivors.is_empty() {
                break;
            }
            survivors.sort_by(|a, b| b.cmp(a));
            if survivors[0].len() >= self.config.max_itemset_size {
                break;
            }
            level = self.join_level(&survivors);
        }

        self.flush(&mut buffer);
    }

    /// Step 1 seed: one raw (unevaluated) singleton itemset per item in the
    /// partition's item set, `has_neg` flagged from the database directly.
    fn seed_level(&self) -> Vec<Itemset> {
        self.partition_items
            .iter()
            .map(|item| {
                let mut itemset = Itemset::singleton(item.clone());
                itemset.has_neg = self.item_has_negative(item);
                itemset
            })
            .collect()
    }

    /// Step 2: join every pair of the current level differing by exactly one
    /// item, deduplicating by resulting item set.
    fn join_level(&self, level: &[Itemset]) -> Vec<Itemset> {
        let mut seen: HashSet<BTreeSet<ItemId>> = HashSet::new();
        let mut out = Vec::new();
        for x in level {
            for y in level {
                if std::ptr::eq(x, y) {
                    continue;
                }
                if x.items().intersection(y.items()).count() + 1 != x.len() {
                    continue;
                }
                let candidate = x.joined(y);
                if candidate.len() == x.len() + 1 && seen.insert(candidate.items().clone()) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Step 3: expected utility plus either the polar bound (when the
    /// candidate has a negative member) or the cheaper positive-only bound.
    fn evaluate(&self, candidate: &mut Itemset) {
        let members = self.put.transactions_for(candidate.items());
        let eu = self
            .put
            .expected_utility(&self.db, candidate.items(), &self.config, &self.synergies);
        candidate.eu = eu;

        if candidate.has_neg {
            let b = bounds::bounds(
                &self.db,
                &self.put,
                &self.universe,
                candidate.items(),
                eu,
                &members,
                &self.config,
            );
            candidate.ub = b.upper;
            candidate.lb = b.lower;
        } else {
            candidate.ub = bounds::positive_only_upper_bound(
                &self.db,
                &self.partition_items,
                candidate.items(),
                eu,
                &members,
                &self.put,
            );
            candidate.lb = eu;
        }
    }

    /// Step 5: extend a surviving candidate by up to `max_speculation`
    /// single items from the partition's remaining item set, appending any
    /// extension that already clears `τ` straight into the output buffer.
    fn speculate(&self, candidate: &Itemset, tau: f64, buffer: &mut Vec<Itemset>) {
        if candidate.eu < tau * self.config.speculation_factor {
            return;
        }
        if candidate.len() >= self.config.max_itemset_size / 2 {
            return;
        }

        let mut tried = 0usize;
        for item in &self.partition_items {
            if tried >= self.config.max_speculation {
                break;
            }
            if candidate.contains(item.as_ref()) {
                continue;
            }
            tried += 1;

            let mut items = candidate.items().clone();
            items.insert(item.clone());
            let mut extended = Itemset::new(items);
            extended.has_neg = candidate.has_neg || self.item_has_negative(item);
            extended.eu =
                self.put
                    .expected_utility(&self.db, extended.items(), &self.config, &self.synergies);
            if extended.eu >= tau {
                buffer.push(extended);
            }
        }
    }

    fn flush(&self, buffer: &mut Vec<Itemset>) {
        if buffer.is_empty() {
            return;
        }
        let mut drained: Vec<Itemset> = buffer.drain(..).collect();
        drained.sort_by(|a, b| b.cmp(a));
        self.topk.update(drained, &self.config);
    }

    fn item_has_negative(&self, item: &ItemId) -> bool {
        self.put
            .inverted(item)
            .iter()
            .any(|&idx| matches!(self.db.transactions()[idx].get(item), Some((_, u)) if u < 0.0))
    }
}
