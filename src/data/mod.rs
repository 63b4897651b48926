mod database;
mod itemset;
mod transaction;

pub use database::Database;
pub use itemset::ItemId;
pub use itemset::Itemset;
pub use transaction::Transaction;
