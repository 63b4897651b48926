//! Input file format:
//!
//!     <tid> <existence_probability> <item>:<prob>:<utility> ...
//!
//! Whitespace-delimited tokens, colon-separated item triplets. `#`-prefixed
//! and blank lines are ignored. Malformed input is surfaced to the caller;
//! the coordinator never starts mining on it.

use crate::data::Database;
use crate::data::ItemId;
use crate::data::Transaction;
use crate::error::PhantomError;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::path::Path;

/// Parses `path` into a [`Database`]. See [`parse_str`] for the line format.
pub fn parse_file(path: &Path) -> Result<Database, PhantomError> {
    let text = std::fs::read_to_string(path)?;
    parse_str(&text)
}

/// Parses the in-memory text of an input file into a [`Database`].
pub fn parse_str(text: &str) -> Result<Database, PhantomError> {
    let mut transactions = Vec::new();
    let mut items = BTreeSet::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let transaction = parse_line(line, line_no)?;
        for item in transaction.items().map(|(i, _)| i.clone()) {
            items.insert(item);
        }
        transactions.push(transaction);
    }

    Ok(Database::new(transactions, items))
}

fn parse_line(line: &str, line_no: usize) -> Result<Transaction, PhantomError> {
    let mut tokens = line.split_whitespace();

    let tid = tokens
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed(line_no, "missing transaction id"))?;

    let exists: f64 = tokens
        .next()
        .ok_or_else(|| malformed(line_no, "missing existence probability"))?
        .parse()
        .map_err(|_| malformed(line_no, "existence probability is not a number"))?;
    check_probability(exists, line_no, None)?;

    let mut entries: HashMap<ItemId, (f64, f64)> = HashMap::new();
    for token in tokens {
        let mut parts = token.splitn(3, ':');
        let item = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed(line_no, "empty item triplet"))?;
        let p: f64 = parts
            .next()
            .ok_or_else(|| malformed(line_no, &format!("item {item:?} missing probability")))?
            .parse()
            .map_err(|_| malformed(line_no, &format!("item {item:?} has a non-numeric probability")))?;
        let u: f64 = parts
            .next()
            .ok_or_else(|| malformed(line_no, &format!("item {item:?} missing utility")))?
            .parse()
            .map_err(|_| malformed(line_no, &format!("item {item:?} has a non-numeric utility")))?;

        check_probability(p, line_no, Some(item))?;
        if !u.is_finite() {
            return Err(PhantomError::NonFinite {
                line: line_no,
                item: Some(item.to_string()),
                value: u,
            });
        }

        let item: ItemId = item.into();
        if entries.insert(item.clone(), (p, u)).is_some() {
            return Err(PhantomError::DuplicateItem {
                line: line_no,
                item: item.to_string(),
            });
        }
    }

    Ok(Transaction::new(tid, exists, entries))
}

fn check_probability(value: f64, line: usize, item: Option<&str>) -> Result<(), PhantomError> {
    if !value.is_finite() {
        return Err(PhantomError::NonFinite {
            line,
            item: item.map(str::to_string),
            value,
        });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(PhantomError::OutOfRangeProbability {
            line,
            item: item.map(str::to_string),
            value,
        });
    }
    Ok(())
}

fn malformed(line: usize, reason: &str) -> PhantomError {
    PhantomError::MalformedLine {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scenario_three_item_positive() {
        let text = "\
# comment
T1 1.0 a:1.0:10 b:1.0:20
T2 1.0 a:1.0:10 c:1.0:30
";
        let db = parse_str(text).unwrap();
        assert_eq!(db.transactions().len(), 2);
        assert_eq!(db.items().len(), 3);
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let text = "\n# nothing here\n\nT1 1.0 a:1.0:1.0\n";
        let db = parse_str(text).unwrap();
        assert_eq!(db.transactions().len(), 1);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let text = "T1 1.5 a:1.0:1.0\n";
        let err = parse_str(text).unwrap_err();
        assert!(matches!(err, PhantomError::OutOfRangeProbability { .. }));
    }

    #[test]
    fn non_finite_utility_is_rejected() {
        let text = "T1 1.0 a:1.0:nan\n";
        assert!(parse_str(text).is_err());
    }

    #[test]
    fn duplicate_item_on_one_line_is_rejected() {
        let text = "T1 1.0 a:1.0:1.0 a:1.0:2.0\n";
        let err = parse_str(text).unwrap_err();
        assert!(matches!(err, PhantomError::DuplicateItem { .. }));
    }

    #[test]
    fn malformed_token_shape_is_rejected() {
        let text = "T1 1.0 a:1.0\n";
        let err = parse_str(text).unwrap_err();
        assert!(matches!(err, PhantomError::MalformedLine { .. }));
    }
}
