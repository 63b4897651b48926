use super::itemset::ItemId;
use super::transaction::Transaction;
use std::collections::BTreeSet;

/// The uncertain transactional database `D`: an ordered sequence of
/// transactions plus the set of all observed item identifiers. Immutable
/// once loaded.
#[derive(Debug, Clone)]
pub struct Database {
    transactions: Vec<Transaction>,
    items: BTreeSet<ItemId>,
}

impl Database {
    pub fn new(transactions: Vec<Transaction>, items: BTreeSet<ItemId>) -> Self {
        Self { transactions, items }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn items(&self) -> &BTreeSet<ItemId> {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty() || self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_reports_empty() {
        let d = Database::new(Vec::new(), BTreeSet::new());
        assert!(d.is_empty());
    }
}
