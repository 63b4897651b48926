use std::collections::BTreeSet;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;

/// An item identifier. `Arc<str>` so that the same string is shared (cheap
/// clone, cheap hash-of-pointer-adjacent-bytes) across the inverted index,
/// every itemset that mentions it, and every level of the search lattice.
pub type ItemId = Arc<str>;

/// A non-empty set of item identifiers with attached, mutable utility
/// metadata. Equality and hashing are determined solely by the item set:
/// `eu`/`ub`/`lb`/`has_neg` are bookkeeping, not identity.
#[derive(Debug, Clone)]
pub struct Itemset {
    items: BTreeSet<ItemId>,
    pub eu: f64,
    pub ub: f64,
    pub lb: f64,
    pub has_neg: bool,
}

impl Itemset {
    pub fn new(items: BTreeSet<ItemId>) -> Self {
        assert!(!items.is_empty(), "itemsets are non-empty by construction");
        Self {
            items,
            eu: 0.0,
            ub: f64::INFINITY,
            lb: f64::NEG_INFINITY,
            has_neg: false,
        }
    }

    pub fn singleton(item: ItemId) -> Self {
        let mut items = BTreeSet::new();
        items.insert(item);
        Self::new(items)
    }

    pub fn items(&self) -> &BTreeSet<ItemId> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i.as_ref() == item)
    }

    /// Union with another itemset, inheriting `has_neg` from either parent.
    pub fn joined(&self, other: &Itemset) -> Self {
        let items = self.items.union(&other.items).cloned().collect();
        let mut joined = Self::new(items);
        joined.has_neg = self.has_neg || other.has_neg;
        joined
    }

    /// Lexicographically sorted item labels, for canonical display as
    /// `{item1, item2, ...}`.
    pub fn sorted_labels(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.as_ref()).collect()
    }
}

impl PartialEq for Itemset {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}
impl Eq for Itemset {}

impl Hash for Itemset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for item in &self.items {
            item.hash(state);
        }
    }
}

impl PartialOrd for Itemset {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Itemset {
    /// Ordered by `eu`; NaN is rejected at input parse time, so this is
    /// total in practice.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.eu
            .partial_cmp(&other.eu)
            .expect("expected utility is never NaN")
    }
}
