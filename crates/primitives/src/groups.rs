//! Per-date group assignments.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{Date, PrimitivesError, Symbol};

/// Partition of the ranked universe into value-ordered groups at one date.
///
/// Ranks are 1-based: rank 1 holds the lowest values, rank `n_groups` the
/// highest. The number of groups is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAssignment")]
pub struct GroupAssignment {
    date: Date,
    groups: Box<[BTreeSet<Symbol>]>,
}

/// Unchecked wire form, validated through [`GroupAssignment::new`].
#[derive(Deserialize)]
struct RawAssignment {
    date: Date,
    groups: Vec<BTreeSet<Symbol>>,
}

impl TryFrom<RawAssignment> for GroupAssignment {
    type Error = PrimitivesError;

    fn try_from(raw: RawAssignment) -> Result<Self, Self::Error> {
        Self::new(raw.date, raw.groups)
    }
}

impl GroupAssignment {
    /// Create an assignment from groups ordered lowest to highest.
    ///
    /// # Errors
    /// Returns an error if `groups` is empty or a symbol appears in two groups.
    pub fn new(date: Date, groups: Vec<BTreeSet<Symbol>>) -> Result<Self, PrimitivesError> {
        if groups.is_empty() {
            return Err(PrimitivesError::NoGroups);
        }

        let mut seen = BTreeSet::new();
        for symbol in groups.iter().flatten() {
            if !seen.insert(symbol) {
                return Err(PrimitivesError::OverlappingGroups(symbol.clone()));
            }
        }

        Ok(Self { date, groups: groups.into_boxed_slice() })
    }

    /// Rebalancing date.
    #[must_use]
    pub const fn date(&self) -> Date {
        self.date
    }

    /// Number of groups.
    #[must_use]
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Members of the group with the given 1-based rank.
    #[must_use]
    pub fn group(&self, rank: usize) -> Option<&BTreeSet<Symbol>> {
        rank.checked_sub(1).and_then(|i| self.groups.get(i))
    }

    /// Lowest-value group (rank 1).
    #[must_use]
    pub fn lowest(&self) -> &BTreeSet<Symbol> {
        &self.groups[0]
    }

    /// Highest-value group (rank `n_groups`).
    #[must_use]
    pub fn highest(&self) -> &BTreeSet<Symbol> {
        &self.groups[self.groups.len() - 1]
    }

    /// 1-based rank of `symbol`, if it was ranked.
    #[must_use]
    pub fn rank_of(&self, symbol: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(symbol)).map(|i| i + 1)
    }

    /// Iterate over `(rank, members)` from lowest to highest.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeSet<Symbol>)> {
        self.groups.iter().enumerate().map(|(i, g)| (i + 1, g))
    }

    /// Total number of ranked symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(BTreeSet::len).sum()
    }

    /// Check if no symbol was ranked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(BTreeSet::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<Symbol> {
        names.iter().map(|&n| Symbol::from(n)).collect()
    }

    fn date() -> Date {
        Date::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn ranks_are_one_based() {
        let assignment =
            GroupAssignment::new(date(), vec![set(&["A"]), set(&["B", "C"]), set(&["D"])])
                .unwrap();

        assert_eq!(assignment.n_groups(), 3);
        assert_eq!(assignment.lowest(), &set(&["A"]));
        assert_eq!(assignment.highest(), &set(&["D"]));
        assert_eq!(assignment.group(2), Some(&set(&["B", "C"])));
        assert_eq!(assignment.group(0), None);
        assert_eq!(assignment.group(4), None);
        assert_eq!(assignment.rank_of("C"), Some(2));
        assert_eq!(assignment.rank_of("Z"), None);
        assert_eq!(assignment.len(), 4);
    }

    #[test]
    fn rejects_overlap() {
        let err = GroupAssignment::new(date(), vec![set(&["A", "B"]), set(&["B"])]).unwrap_err();
        assert!(matches!(err, PrimitivesError::OverlappingGroups(s) if s.as_str() == "B"));
    }

    #[test]
    fn rejects_zero_groups() {
        assert!(matches!(GroupAssignment::new(date(), vec![]), Err(PrimitivesError::NoGroups)));
    }

    #[test]
    fn deserialization_validates() {
        let assignment =
            GroupAssignment::new(date(), vec![set(&["A"]), set(&["B", "C"])]).unwrap();
        let json = serde_json::to_string(&assignment).unwrap();
        let back: GroupAssignment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, assignment);

        let no_groups = r#"{"date":"2024-06-30","groups":[]}"#;
        assert!(serde_json::from_str::<GroupAssignment>(no_groups).is_err());

        let overlap = r#"{"date":"2024-06-30","groups":[["A","B"],["B"]]}"#;
        let err = serde_json::from_str::<GroupAssignment>(overlap).unwrap_err();
        assert!(err.to_string().contains("more than one group"));
    }

    #[test]
    fn empty_groups_allowed() {
        let assignment = GroupAssignment::new(date(), vec![set(&[]), set(&[])]).unwrap();
        assert!(assignment.is_empty());
        assert!(assignment.lowest().is_empty());
    }
}
