//! Authorship position indexing.
//!
//! Folds the corpus into an immutable author → [`PositionCounts`] mapping.
//! For a paper with `n` authors, index 0 is `first`, index `n - 1` is `last`
//! (when `n >= 2`), and everything strictly between is `middle`. A sole
//! author is counted once as `first` unless [`SoloAuthorPolicy::FirstAndLast`]
//! is configured.

use crate::corpus::{Corpus, Paper};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{info, warn};

/// An author's role on a single paper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionClass {
    First,
    Middle,
    Last,
}

/// How a single-author paper counts toward edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoloAuthorPolicy {
    /// The sole author counts once, as `first`.
    #[default]
    FirstOnly,
    /// The sole author counts as both `first` and `last`.
    FirstAndLast,
}

impl fmt::Display for SoloAuthorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoloAuthorPolicy::FirstOnly => write!(f, "first_only"),
            SoloAuthorPolicy::FirstAndLast => write!(f, "first_and_last"),
        }
    }
}

/// Classify the author at `index` in a byline of `len` authors.
pub fn position_class(index: usize, len: usize) -> PositionClass {
    if index == 0 {
        PositionClass::First
    } else if index + 1 == len {
        PositionClass::Last
    } else {
        PositionClass::Middle
    }
}

/// Per-author position tallies across the whole corpus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionCounts {
    pub first: u32,
    pub last: u32,
    pub middle: u32,
}

impl PositionCounts {
    pub fn new(first: u32, last: u32, middle: u32) -> Self {
        Self {
            first,
            last,
            middle,
        }
    }

    /// First plus last positions.
    pub fn edge(&self) -> u32 {
        self.first + self.last
    }

    /// Number of papers the author appears on.
    ///
    /// Under [`SoloAuthorPolicy::FirstAndLast`] a solo paper contributes to
    /// both `first` and `last`, so this overcounts by the number of solo papers.
    pub fn total(&self) -> u32 {
        self.first + self.last + self.middle
    }

    fn record(&mut self, class: PositionClass) {
        match class {
            PositionClass::First => self.first += 1,
            PositionClass::Middle => self.middle += 1,
            PositionClass::Last => self.last += 1,
        }
    }

    fn add(&mut self, other: &PositionCounts) {
        self.first += other.first;
        self.last += other.last;
        self.middle += other.middle;
    }
}

/// Immutable author → position counts mapping.
///
/// Keys are ordered so every traversal (and every report built from one) is
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionIndex {
    counts: BTreeMap<String, PositionCounts>,
}

impl PositionIndex {
    /// Single pass over all papers.
    pub fn build(corpus: &Corpus, solo: SoloAuthorPolicy) -> Self {
        let index = Self::from_papers(corpus.papers(), solo);
        info!(
            papers = corpus.len(),
            authors = index.len(),
            "Authorship positions indexed"
        );
        index
    }

    /// Fold a slice of papers. Usable on a shard; combine shards with
    /// [`PositionIndex::merge`] before classifying.
    pub fn from_papers(papers: &[Paper], solo: SoloAuthorPolicy) -> Self {
        papers.iter().fold(Self::default(), |mut acc, paper| {
            acc.record_paper(paper, solo);
            acc
        })
    }

    fn record_paper(&mut self, paper: &Paper, solo: SoloAuthorPolicy) {
        let len = paper.authors.len();
        let mut seen: HashSet<&str> = HashSet::with_capacity(len);

        for (idx, author) in paper.authors.iter().enumerate() {
            // First occurrence governs the position.
            if !seen.insert(author.as_str()) {
                warn!(paper = %paper.id, author = %author, "Ignoring duplicate author entry");
                continue;
            }
            let counts = self.counts.entry(author.clone()).or_default();
            counts.record(position_class(idx, len));
            if len == 1 && solo == SoloAuthorPolicy::FirstAndLast {
                counts.record(PositionClass::Last);
            }
        }
    }

    /// Combine two partial indexes by summation.
    pub fn merge(mut self, other: PositionIndex) -> Self {
        for (author, counts) in &other.counts {
            self.counts.entry(author.clone()).or_default().add(counts);
        }
        self
    }

    pub fn from_shards(shards: impl IntoIterator<Item = PositionIndex>) -> Self {
        shards.into_iter().fold(Self::default(), Self::merge)
    }

    pub fn get(&self, author: &str) -> Option<&PositionCounts> {
        self.counts.get(author)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PositionCounts)> {
        self.counts.iter().map(|(a, c)| (a.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl FromIterator<(String, PositionCounts)> for PositionIndex {
    fn from_iter<T: IntoIterator<Item = (String, PositionCounts)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}
