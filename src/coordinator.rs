//! Coordinator / PHANTOM driver: builds the shared PUT and top-K once,
//! partitions the item universe across a fixed worker pool, polls the
//! convergence monitor, rebalances load, and extracts the final top-K.
//!
//! Every worker shares the whole database and the whole PUT (both are
//! read-only after construction); only the item universe is split. An
//! itemset's expected utility depends on every transaction that contains
//! it, so handing a worker a transaction slice instead would make its EU
//! computations wrong for any itemset whose supporting transactions land
//! in more than one slice.

use crate::config::MiningConfig;
use crate::convergence::ConvergenceMonitor;
use crate::data::Database;
use crate::data::ItemId;
use crate::data::Itemset;
use crate::error::PhantomError;
use crate::euc::SynergyTable;
use crate::miner::Miner;
use crate::partition::SearchPartition;
use crate::put::Put;
use crate::topk::TopK;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct Coordinator {
    config: MiningConfig,
    k: usize,
    processors: usize,
}

impl Coordinator {
    pub fn new(config: MiningConfig, k: usize, processors: usize) -> Self {
        Self {
            config,
            k,
            processors: processors.max(1),
        }
    }

    /// Mines `db` to its converged top-K.
    pub fn mine(&self, db: &Database) -> Result<Vec<Itemset>, PhantomError> {
        if db.is_empty() {
            log::info!("empty database or item universe, skipping worker launch");
            return Ok(Vec::new());
        }

        let db = Arc::new(db.clone());
        let put = Arc::new(Put::build(&db, &self.config));
        let topk = Arc::new(TopK::new(self.k));
        let synergies = Arc::new(SynergyTable::new());
        let universe = db.items().clone();
        log::info!(
            "built PUT over {} items, {} transactions",
            universe.len(),
            db.transactions().len()
        );

        let partitions = self.build_partitions(&db, &put);
        let n = partitions.len();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| PhantomError::Io(std::io::Error::other(e.to_string())))?;

        let monitor = ConvergenceMonitor::new();
        let config = self.config.clone();

        pool.scope(|scope| {
            for partition in &partitions {
                let db = db.clone();
                let put = put.clone();
                let topk = topk.clone();
                let partition = partition.clone();
                let config = Arc::new(config.clone());
                let synergies = synergies.clone();
                let universe = universe.clone();
                scope.spawn(move |_| {
                    let miner = Miner::new(db, put, topk, partition, config, synergies, universe);
                    miner.run();
                });
            }

            loop {
                std::thread::sleep(config.poll_interval);
                if monitor.poll(&topk, &partitions, &config) {
                    log::info!("convergence reached, signalling termination");
                    for p in &partitions {
                        p.terminate();
                    }
                    break;
                }
                self.rebalance(&partitions, &config);
            }
        });

        let result = topk.extract();
        log::info!("mining complete, returning {} itemsets", result.len());
        Ok(result)
    }

    /// Sort the universe by single-item EU descending, split into
    /// `processors` contiguous chunks, one `SearchPartition` per chunk.
    fn build_partitions(&self, db: &Database, put: &Put) -> Vec<Arc<SearchPartition>> {
        let mut items: Vec<ItemId> = db.items().iter().cloned().collect();
        items.sort_by(|a, b| {
            put.eu_single(b.as_ref())
                .partial_cmp(&put.eu_single(a.as_ref()))
                .expect("expected utility is never NaN")
        });

        let n = self.processors.min(items.len().max(1));
        let chunk_size = items.len().div_ceil(n).max(1);
        items
            .chunks(chunk_size)
            .enumerate()
            .map(|(id, chunk)| {
                let set: BTreeSet<ItemId> = chunk.iter().cloned().collect();
                Arc::new(SearchPartition::new(id, set))
            })
            .collect()
    }

    /// Load rebalancing: a partition whose processed count trails the mean
    /// by more than `imbalance_fraction` is treated as the overloaded donor
    /// (it is making slow progress, likely because it still has more items
    /// to explore); one running ahead of the mean by the same margin is the
    /// underloaded recipient.
    fn rebalance(&self, partitions: &[Arc<SearchPartition>], config: &MiningConfig) {
        if partitions.len() < 2 {
            return;
        }
        let counts: Vec<u64> = partitions.iter().map(|p| p.processed()).collect();
        let mean: f64 = counts.iter().sum::<u64>() as f64 / counts.len() as f64;
        if mean <= 0.0 {
            return;
        }

        let mut donors: Vec<usize> = Vec::new();
        let mut recipients: Vec<usize> = Vec::new();
        for (i, &c) in counts.iter().enumerate() {
            if partitions[i].is_terminated() {
                continue;
            }
            let deviation = (c as f64 - mean) / mean;
            if deviation < -config.imbalance_fraction {
                donors.push(i);
            } else if deviation > config.imbalance_fraction {
                recipients.push(i);
            }
        }

        for (donor_idx, recipient_idx) in donors.iter().zip(recipients.iter()) {
            if donor_idx == recipient_idx {
                continue;
            }
            let donor = &partitions[*donor_idx];
            let recipient = &partitions[*recipient_idx];
            let count = (donor.item_count() / 4).max(1);
            let moved = donor.transfer_to(recipient, count);
            if moved > 0 {
                log::debug!(
                    "rebalance: moved {} items from partition {} to partition {}",
                    moved,
                    donor.id,
                    recipient.id
                );
            }
        }
    }
}
