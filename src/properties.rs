//! Property-based tests for cross-cutting invariants: bound admissibility,
//! determinism, and agreement under parallelism. Kept as its own module
//! (rather than folded into `bounds.rs`/`coordinator.rs`) because each
//! property spans several components at once.

use crate::bounds;
use crate::config::MiningConfig;
use crate::data::Database;
use crate::data::ItemId;
use crate::data::Itemset;
use crate::data::Transaction;
use crate::euc::SynergyTable;
use crate::put::Put;
use crate::Coordinator;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

/// A small random uncertain database: `n_items` items over `n_transactions`
/// transactions, utilities drawn from `[-50, 50]` so negative items are
/// common, probabilities from `(0, 1]` so no item is ever silently absent.
fn random_database(rng: &mut SmallRng, n_transactions: usize, n_items: usize) -> Database {
    let items: Vec<ItemId> = (0..n_items).map(|i| Arc::from(format!("i{i}"))).collect();
    let mut universe = BTreeSet::new();
    let mut transactions = Vec::with_capacity(n_transactions);

    for t in 0..n_transactions {
        let mut entries = HashMap::new();
        for item in &items {
            if rng.random_bool(0.5) {
                continue;
            }
            universe.insert(item.clone());
            let p = rng.random_range(0.05..=1.0);
            let u = rng.random_range(-50.0..=50.0);
            entries.insert(item.clone(), (p, u));
        }
        if entries.is_empty() {
            continue;
        }
        let exists = rng.random_range(0.1..=1.0);
        transactions.push(Transaction::new(format!("T{t}"), exists, entries));
    }

    Database::new(transactions, universe)
}

/// Bound admissibility: for every itemset `X` evaluated, every superset `Y`
/// observed in the database's own item universe must satisfy
/// `eu(Y) <= UB(X)` within `1e-6`.
#[test]
fn bound_admissibility_holds_on_random_databases() {
    let config = MiningConfig::strict();
    let synergies = SynergyTable::new();

    for seed in 0..20u64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let db = random_database(&mut rng, 20, 8);
        if db.is_empty() {
            continue;
        }
        let put = Put::build(&db, &config);
        let universe = db.items().clone();
        let items: Vec<ItemId> = universe.iter().cloned().collect();

        for i in 0..items.len() {
            let x: BTreeSet<ItemId> = [items[i].clone()].into_iter().collect();
            let members_x = put.transactions_for(&x);
            let eu_x = put.expected_utility(&db, &x, &config, &synergies);
            let b = bounds::bounds(&db, &put, &universe, &x, eu_x, &members_x, &config);

            for j in 0..items.len() {
                if i == j {
                    continue;
                }
                let mut y = x.clone();
                y.insert(items[j].clone());
                let eu_y = put.expected_utility(&db, &y, &config, &synergies);
                assert!(
                    eu_y <= b.upper + 1e-6,
                    "seed {seed}: eu(Y)={eu_y} exceeds UB(X)={} for X={:?} Y={:?}",
                    b.upper,
                    x,
                    y
                );
            }
        }
    }
}

/// Determinism: a single worker with `alpha=0` and no synergies returns the
/// exact same top-K ordered list across repeated runs of the same
/// database.
#[test]
fn single_worker_mining_is_deterministic() {
    let mut rng = SmallRng::seed_from_u64(7);
    let db = random_database(&mut rng, 15, 6);
    if db.is_empty() {
        return;
    }
    let config = MiningConfig::deterministic();
    let a = Coordinator::new(config.clone(), 5, 1).mine(&db).unwrap();
    let b = Coordinator::new(config, 5, 1).mine(&db).unwrap();

    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.items(), y.items());
        assert!((x.eu - y.eu).abs() < 1e-9);
    }
}

/// Agreement under parallelism: `set(mine(D, K, N))` equals
/// `set(mine(D, K, 1))` for `N >= 1` as long as no two itemsets tie on `eu`.
#[test]
fn parallel_mining_agrees_with_single_worker_when_no_ties() {
    let mut rng = SmallRng::seed_from_u64(42);
    let db = random_database(&mut rng, 25, 7);
    if db.is_empty() {
        return;
    }
    let config = MiningConfig::deterministic();

    let single: Vec<Itemset> = Coordinator::new(config.clone(), 5, 1).mine(&db).unwrap();
    let eus: Vec<f64> = single.iter().map(|i| i.eu).collect();
    let has_tie = eus
        .windows(2)
        .any(|w| (w[0] - w[1]).abs() < 1e-9);
    if has_tie {
        // Agreement is only guaranteed when no two itemsets tie on eu; skip
        // rather than assert on a database that happens to produce one.
        return;
    }

    let parallel: Vec<Itemset> = Coordinator::new(config, 5, 4).mine(&db).unwrap();
    let single_set: BTreeSet<&BTreeSet<ItemId>> = single.iter().map(|i| i.items()).collect();
    let parallel_set: BTreeSet<&BTreeSet<ItemId>> = parallel.iter().map(|i| i.items()).collect();
    assert_eq!(single_set, parallel_set);
}
