//! Expected Utility Calculator.

use crate::config::MiningConfig;
use crate::data::Database;
use crate::data::ItemId;
use std::collections::BTreeSet;
use std::collections::HashMap;

/// Optional caller-supplied `(subset -> bonus)` table. `u_X(T)` is augmented
/// by every bonus whose subset is contained in `X`; empty by default, which
/// recovers the pure formula.
pub type SynergyTable = HashMap<BTreeSet<ItemId>, f64>;

/// Expected utility of `itemset` over the transactions in `members`
/// (already known to contain every item of `itemset`), plus the weighted
/// coefficient-of-variation discount.
///
/// Total on well-formed inputs: no error path.
pub fn expected_utility(
    db: &Database,
    members: &[usize],
    itemset: &BTreeSet<ItemId>,
    config: &MiningConfig,
    synergies: &SynergyTable,
) -> f64 {
    if members.is_empty() {
        return 0.0;
    }

    let transactions = db.transactions();
    let mut weighted_sum = 0.0;
    let mut weights = Vec::with_capacity(members.len());
    let mut utilities = Vec::with_capacity(members.len());

    for &idx in members {
        let t = &transactions[idx];
        let mut product = t.exists;
        let mut dropped = false;
        for item in itemset {
            let (p, _) = t.get(item).expect("members already filtered to contain itemset");
            product *= p;
            if product < config.probability_floor {
                dropped = true;
                break;
            }
        }
        let weight = if dropped { 0.0 } else { product };
        let mut utility: f64 = itemset
            .iter()
            .map(|item| t.get(item).map(|(_, u)| u).unwrap_or(0.0))
            .sum();
        utility += synergy_bonus(itemset, synergies);

        weighted_sum += weight * utility;
        weights.push(weight);
        utilities.push(utility);
    }

    let discount = 1.0 / (1.0 + config.alpha * weighted_variance(&weights, &utilities));
    weighted_sum * discount
}

fn synergy_bonus(itemset: &BTreeSet<ItemId>, synergies: &SynergyTable) -> f64 {
    synergies
        .iter()
        .filter(|(subset, _)| subset.is_subset(itemset))
        .map(|(_, bonus)| bonus)
        .sum()
}

/// Weighted coefficient of variation of `utilities` under `weights`. Zero
/// when the total weight is zero, fewer than two transactions contribute, or
/// the weighted mean itself is zero, avoiding a division by zero.
fn weighted_variance(weights: &[f64], utilities: &[f64]) -> f64 {
    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 || weights.len() < 2 {
        return 0.0;
    }
    let mean = weights
        .iter()
        .zip(utilities)
        .map(|(w, u)| w * u)
        .sum::<f64>()
        / total_weight;
    if mean == 0.0 {
        return 0.0;
    }
    let variance = weights
        .iter()
        .zip(utilities)
        .map(|(w, u)| w * (u - mean).powi(2))
        .sum::<f64>()
        / total_weight;
    variance.sqrt() / mean.abs()
}
