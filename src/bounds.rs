//! Polar Bounds Calculator: upper/lower bounds on the utility of any
//! superset of a given itemset, accounting asymmetrically for positive-
//! and negative-utility candidate items.

use crate::config::MiningConfig;
use crate::data::Database;
use crate::data::ItemId;
use crate::put::Put;
use std::collections::BTreeSet;

/// `UB(X) = EU(X) + ω·G+(X) + L-(X)`, `LB(X) = EU(X) + Σ max(-loss)`.
pub struct Bounds {
    pub upper: f64,
    pub lower: f64,
}

/// Partition `U \ X` into candidate-positive and candidate-negative items.
fn candidates<'a>(
    universe: &'a BTreeSet<ItemId>,
    itemset: &BTreeSet<ItemId>,
    put: &Put,
) -> (Vec<&'a ItemId>, Vec<&'a ItemId>) {
    universe
        .iter()
        .filter(|i| !itemset.contains(*i))
        .partition(|i| put.is_positive(i))
}

/// `corr(X, i) = |{T' in D : X subseteq T' and i in T'}| / |{T' : i in T'}|`,
/// or 0 if `i` never occurs. Depends only on `X` and `i`, not on any
/// particular transaction.
fn support_correlation(db: &Database, put: &Put, members: &[usize], item: &ItemId) -> f64 {
    let occurs = put.inverted(item);
    if occurs.is_empty() {
        return 0.0;
    }
    let co_occurring = members
        .iter()
        .filter(|idx| db.transactions()[**idx].contains(item))
        .count();
    co_occurring as f64 / occurs.len() as f64
}

pub fn bounds(
    db: &Database,
    put: &Put,
    universe: &BTreeSet<ItemId>,
    itemset: &BTreeSet<ItemId>,
    eu: f64,
    members: &[usize],
    config: &MiningConfig,
) -> Bounds {
    let (positive, negative) = candidates(universe, itemset, put);

    let gain: f64 = positive
        .iter()
        .filter_map(|item| {
            members
                .iter()
                .filter_map(|&idx| {
                    let t = &db.transactions()[idx];
                    t.get(item).map(|(p, u)| t.exists * p * u)
                })
                .fold(None, |acc: Option<f64>, v| {
                    Some(acc.map_or(v, |a| a.max(v)))
                })
                .map(|best| best * support_correlation(db, put, members, item))
        })
        .sum();

    let loss_upper: f64 = negative
        .iter()
        .filter_map(|item| {
            members
                .iter()
                .filter_map(|&idx| {
                    let t = &db.transactions()[idx];
                    t.get(item)
                        .map(|(p, u)| -config.epsilon * t.exists * p * u.abs())
                })
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))))
        })
        .sum();

    let loss_lower: f64 = negative
        .iter()
        .filter_map(|item| {
            members
                .iter()
                .filter_map(|&idx| {
                    let t = &db.transactions()[idx];
                    t.get(item).map(|(p, u)| -t.exists * p * u.abs())
                })
                .fold(None, |acc: Option<f64>, v| {
                    Some(acc.map_or(v, |a| a.max(v)))
                })
        })
        .sum();

    Bounds {
        upper: eu + config.omega * gain + loss_upper,
        lower: eu + loss_lower,
    }
}

/// Upper bound used when an itemset has no negative-utility member: only
/// positive extensions are considered, without the `ω`/`corr` discount since
/// there is nothing negative to guard against.
pub fn positive_only_upper_bound(
    db: &Database,
    remaining: &BTreeSet<ItemId>,
    itemset: &BTreeSet<ItemId>,
    eu: f64,
    members: &[usize],
    put: &Put,
) -> f64 {
    let gain: f64 = remaining
        .iter()
        .filter(|i| !itemset.contains(*i) && put.is_positive(i))
        .filter_map(|item| {
            members
                .iter()
                .filter_map(|&idx| {
                    let t = &db.transactions()[idx];
                    t.get(item).map(|(p, u)| t.exists * p * u)
                })
                .fold(None, |acc: Option<f64>, v| {
                    Some(acc.map_or(v, |a| a.max(v)))
                })
        })
        .sum();
    eu + gain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Transaction;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn item(s: &str) -> ItemId {
        Arc::from(s)
    }

    #[test]
    fn empty_transaction_set_yields_ub_equal_to_eu() {
        let db = Database::new(Vec::new(), BTreeSet::new());
        let config = MiningConfig::default();
        let put = Put::build(&db, &config);
        let universe: BTreeSet<ItemId> = [item("a"), item("b")].into_iter().collect();
        let x: BTreeSet<ItemId> = [item("a")].into_iter().collect();
        let b = bounds(&db, &put, &universe, &x, 42.0, &[], &config);
        assert_eq!(b.upper, 42.0);
    }

    #[test]
    fn scenario_negative_item_pruning() {
        let mut t1 = HashMap::new();
        t1.insert(item("a"), (1.0, 100.0));
        t1.insert(item("b"), (1.0, -80.0));
        let mut t2 = HashMap::new();
        t2.insert(item("a"), (1.0, 100.0));
        let db = Database::new(
            vec![Transaction::new("T1", 1.0, t1), Transaction::new("T2", 1.0, t2)],
            BTreeSet::from([item("a"), item("b")]),
        );
        let config = MiningConfig::deterministic();
        let put = Put::build(&db, &config);
        let universe = db.items().clone();

        let b_set: BTreeSet<ItemId> = [item("b")].into_iter().collect();
        let eu_b = put.eu_single("b");
        let members_b = put.transactions_for(&b_set);
        let b = bounds(&db, &put, &universe, &b_set, eu_b, &members_b, &config);
        // eu({a}) = 200; UB({b}) must fall short of it so the worker prunes
        // {b} before expanding.
        assert!(b.upper < 200.0);
    }
}
