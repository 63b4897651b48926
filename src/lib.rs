pub mod bounds;
pub mod config;
pub mod convergence;
pub mod coordinator;
pub mod data;
pub mod error;
pub mod euc;
pub mod io;
pub mod logging;
pub mod miner;
pub mod partition;
pub mod put;
pub mod topk;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(test)]
mod properties;

pub use config::MiningConfig;
pub use coordinator::Coordinator;
pub use data::Database;
pub use data::ItemId;
pub use data::Itemset;
pub use data::Transaction;
pub use error::PhantomError;

/// dimensional analysis types
pub type Probability = f64;
pub type Utility = f64;

/// trait for random generation, used by adversarial property tests
pub trait Arbitrary {
    fn random() -> Self;
}

/// Mines the top-K highest expected-utility itemsets from `database`.
///
/// The public library surface: build the shared PUT and top-K once,
/// partition the item universe across `processors` workers, and drive them
/// to convergence.
pub fn mine(
    database: &Database,
    k: usize,
    processors: usize,
) -> Result<Vec<Itemset>, PhantomError> {
    Coordinator::new(MiningConfig::default(), k, processors).mine(database)
}
