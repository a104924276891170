//! Active author classification.
//!
//! An author is active when their edge positions reach `min_edge` or their
//! middle positions reach `min_middle`. Both comparisons are inclusive.

use crate::index::{PositionCounts, PositionIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::info;

/// How first and last positions are combined for the edge threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRule {
    /// `first + last >= min_edge`
    #[default]
    Combined,
    /// `first >= min_edge || last >= min_edge`
    Either,
}

impl fmt::Display for EdgeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeRule::Combined => write!(f, "combined"),
            EdgeRule::Either => write!(f, "either"),
        }
    }
}

/// Validated activity thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityThresholds {
    pub min_edge: u32,
    pub min_middle: u32,
    pub edge_rule: EdgeRule,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            min_edge: 2,
            min_middle: 4,
            edge_rule: EdgeRule::Combined,
        }
    }
}

impl ActivityThresholds {
    pub fn new(min_edge: u32, min_middle: u32) -> Self {
        Self {
            min_edge,
            min_middle,
            edge_rule: EdgeRule::Combined,
        }
    }

    pub fn with_edge_rule(mut self, edge_rule: EdgeRule) -> Self {
        self.edge_rule = edge_rule;
        self
    }

    /// Whether the edge-position half of the predicate holds.
    pub fn meets_edge(&self, counts: &PositionCounts) -> bool {
        match self.edge_rule {
            EdgeRule::Combined => counts.edge() >= self.min_edge,
            EdgeRule::Either => counts.first >= self.min_edge || counts.last >= self.min_edge,
        }
    }

    pub fn meets_middle(&self, counts: &PositionCounts) -> bool {
        counts.middle >= self.min_middle
    }

    pub fn is_active(&self, counts: &PositionCounts) -> bool {
        self.meets_edge(counts) || self.meets_middle(counts)
    }
}

/// The set of active author identifiers, in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveAuthorSet {
    authors: BTreeSet<String>,
}

impl ActiveAuthorSet {
    pub fn contains(&self, author: &str) -> bool {
        self.authors.contains(author)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.authors.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveAuthorSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            authors: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Classify every author in the index.
pub fn classify(index: &PositionIndex, thresholds: &ActivityThresholds) -> ActiveAuthorSet {
    let active: ActiveAuthorSet = index
        .iter()
        .filter(|(_, counts)| thresholds.is_active(counts))
        .map(|(author, _)| author)
        .collect();
    info!(
        authors = index.len(),
        active = active.len(),
        min_edge = thresholds.min_edge,
        min_middle = thresholds.min_middle,
        edge_rule = %thresholds.edge_rule,
        "Authors classified"
    );
    active
}

/// Counts describing which half of the predicate made authors active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityBreakdown {
    pub total_authors: usize,
    pub active: usize,
    pub inactive: usize,
    /// Active through the edge-position rule.
    pub via_edge: usize,
    /// Active only through the middle-position rule.
    pub middle_only: usize,
    pub first_at_least_edge: usize,
    pub last_at_least_edge: usize,
    pub both_at_least_edge: usize,
}

impl ActivityBreakdown {
    pub fn compute(index: &PositionIndex, thresholds: &ActivityThresholds) -> Self {
        let mut b = Self {
            total_authors: index.len(),
            ..Self::default()
        };
        for (_, counts) in index.iter() {
            let edge = thresholds.meets_edge(counts);
            if edge {
                b.via_edge += 1;
            } else if thresholds.meets_middle(counts) {
                b.middle_only += 1;
            }
            let first = counts.first >= thresholds.min_edge;
            let last = counts.last >= thresholds.min_edge;
            b.first_at_least_edge += usize::from(first);
            b.last_at_least_edge += usize::from(last);
            b.both_at_least_edge += usize::from(first && last);
        }
        b.active = b.via_edge + b.middle_only;
        b.inactive = b.total_authors - b.active;
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, Paper};
    use crate::index::SoloAuthorPolicy;

    #[test]
    fn test_boundary_values_are_active() {
        let t = ActivityThresholds::default();
        assert!(t.is_active(&PositionCounts::new(1, 1, 0)));
        assert!(t.is_active(&PositionCounts::new(2, 0, 0)));
        assert!(t.is_active(&PositionCounts::new(0, 2, 0)));
        assert!(t.is_active(&PositionCounts::new(0, 0, 4)));
    }

    #[test]
    fn test_below_thresholds_inactive() {
        let t = ActivityThresholds::default();
        assert!(!t.is_active(&PositionCounts::new(1, 0, 3)));
        assert!(!t.is_active(&PositionCounts::new(0, 1, 3)));
        assert!(!t.is_active(&PositionCounts::default()));
    }

    #[test]
    fn test_either_rule() {
        let t = ActivityThresholds::default().with_edge_rule(EdgeRule::Either);
        assert!(!t.is_active(&PositionCounts::new(1, 1, 0)));
        assert!(t.is_active(&PositionCounts::new(2, 0, 0)));
        assert!(t.is_active(&PositionCounts::new(0, 2, 0)));
    }

    #[test]
    fn test_custom_thresholds() {
        let t = ActivityThresholds::new(3, 1);
        assert!(!t.is_active(&PositionCounts::new(1, 1, 0)));
        assert!(t.is_active(&PositionCounts::new(0, 0, 1)));
    }

    #[test]
    fn test_classify_example_corpus() {
        let corpus = Corpus::from_papers(vec![
            Paper::new("P1", ["A", "B", "C"]),
            Paper::new("P2", ["A", "D"]),
            Paper::new("P3", ["A", "E", "F"]),
        ])
        .unwrap();
        let index = PositionIndex::build(&corpus, SoloAuthorPolicy::FirstOnly);
        let active = classify(&index, &ActivityThresholds::default());
        assert_eq!(active.iter().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let index: PositionIndex = [
            ("A".to_string(), PositionCounts::new(2, 0, 0)),
            ("B".to_string(), PositionCounts::new(0, 0, 4)),
            ("C".to_string(), PositionCounts::new(1, 0, 3)),
        ]
        .into_iter()
        .collect();
        let t = ActivityThresholds::default();
        let first = classify(&index, &t);
        let second = classify(&index, &t);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_breakdown() {
        let index: PositionIndex = [
            ("A".to_string(), PositionCounts::new(2, 2, 0)),
            ("B".to_string(), PositionCounts::new(0, 0, 4)),
            ("C".to_string(), PositionCounts::new(1, 0, 3)),
            ("D".to_string(), PositionCounts::new(1, 1, 9)),
        ]
        .into_iter()
        .collect();
        let b = ActivityBreakdown::compute(&index, &ActivityThresholds::default());
        assert_eq!(b.total_authors, 4);
        assert_eq!(b.active, 3);
        assert_eq!(b.inactive, 1);
        assert_eq!(b.via_edge, 2);
        assert_eq!(b.middle_only, 1);
        assert_eq!(b.first_at_least_edge, 1);
        assert_eq!(b.last_at_least_edge, 1);
        assert_eq!(b.both_at_least_edge, 1);
    }
}
