use phantom_mine::data::Database;
use phantom_mine::data::Transaction;
use phantom_mine::Coordinator;
use phantom_mine::MiningConfig;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        mining_small_positive_database,
        mining_database_with_negative_items,
        building_the_put,
}

/// A synthetic uncertain database with `n_transactions` transactions drawn
/// over `n_items` items, a fraction of them carrying a negative utility.
fn synthetic_database(n_transactions: usize, n_items: usize, negative_fraction: f64) -> Database {
    let items: Vec<Arc<str>> = (0..n_items).map(|i| Arc::from(format!("item{i}"))).collect();
    let mut universe = BTreeSet::new();
    let mut transactions = Vec::with_capacity(n_transactions);

    for t in 0..n_transactions {
        let mut entries = HashMap::new();
        let per_transaction = (n_items / 4).max(1);
        for slot in 0..per_transaction {
            let item = items[(t + slot) % n_items].clone();
            universe.insert(item.clone());
            let negative = (slot as f64) < negative_fraction * per_transaction as f64;
            let utility = if negative { -10.0 } else { 10.0 };
            entries.insert(item, (0.8, utility));
        }
        transactions.push(Transaction::new(format!("T{t}"), 0.9, entries));
    }

    Database::new(transactions, universe)
}

fn mining_small_positive_database(c: &mut criterion::Criterion) {
    let db = synthetic_database(200, 12, 0.0);
    c.bench_function("mine top-10 over a 12-item all-positive database", |b| {
        b.iter(|| {
            let coordinator = Coordinator::new(MiningConfig::default(), 10, 2);
            coordinator.mine(&db).unwrap()
        })
    });
}

fn mining_database_with_negative_items(c: &mut criterion::Criterion) {
    let db = synthetic_database(200, 12, 0.3);
    c.bench_function("mine top-10 over a 12-item mixed-utility database", |b| {
        b.iter(|| {
            let coordinator = Coordinator::new(MiningConfig::default(), 10, 2);
            coordinator.mine(&db).unwrap()
        })
    });
}

fn building_the_put(c: &mut criterion::Criterion) {
    let db = synthetic_database(500, 20, 0.2);
    let config = MiningConfig::default();
    c.bench_function("build the PUT over a 500-transaction, 20-item database", |b| {
        b.iter(|| phantom_mine::put::Put::build(&db, &config))
    });
}
