use super::itemset::ItemId;
use std::collections::HashMap;

/// A single uncertain transaction: an existence probability `P(T)` and, per
/// item present, an occurrence probability / utility pair. An item appears
/// at most once; only items with a recorded pair are considered present.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub tid: String,
    pub exists: f64,
    items: HashMap<ItemId, (f64, f64)>,
}

impl Transaction {
    pub fn new(
        tid: impl Into<String>,
        exists: f64,
        items: HashMap<ItemId, (f64, f64)>,
    ) -> Self {
        Self {
            tid: tid.into(),
            exists,
            items,
        }
    }

    /// `(p_i, u_i)` for `item`, if present in this transaction.
    pub fn get(&self, item: &str) -> Option<(f64, f64)> {
        self.items
            .iter()
            .find(|(i, _)| i.as_ref() == item)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.keys().any(|i| i.as_ref() == item)
    }

    pub fn items(&self) -> impl Iterator<Item = (&ItemId, &(f64, f64))> {
        self.items.iter()
    }

    /// Whether every item of `itemset` is present in this transaction.
    pub fn contains_all<'a>(&self, itemset: impl Iterator<Item = &'a ItemId>) -> bool {
        itemset.into_iter().all(|i| self.items.contains_key(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn get_returns_recorded_pair() {
        let mut items = HashMap::new();
        items.insert(Arc::from("a"), (0.5, 10.0));
        let t = Transaction::new("T1", 1.0, items);
        assert_eq!(t.get("a"), Some((0.5, 10.0)));
        assert_eq!(t.get("b"), None);
    }

    #[test]
    fn contains_all_requires_every_item() {
        let mut items = HashMap::new();
        items.insert(Arc::from("a"), (1.0, 1.0));
        items.insert(Arc::from("b"), (1.0, 1.0));
        let t = Transaction::new("T1", 1.0, items);
        let ab: Vec<ItemId> = vec![Arc::from("a"), Arc::from("b")];
        let ac: Vec<ItemId> = vec![Arc::from("a"), Arc::from("c")];
        assert!(t.contains_all(ab.iter()));
        assert!(!t.contains_all(ac.iter()));
    }
}
