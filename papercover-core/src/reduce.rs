//! Greedy minimal paper cover.
//!
//! Given the active authors `U` and, for every paper `p`, the set `S_p` of
//! active authors on it, pick papers until their union is `U`. Each step
//! takes the paper covering the most still-uncovered authors; ties go to the
//! lexicographically smallest paper identifier. The result is within a factor
//! `H(d)` of the optimum, where `d` is the largest `|S_p|`.
//!
//! Gains only ever decrease, so a lazy max-heap keyed by
//! `(gain, Reverse(paper id))` is enough: a popped entry whose stored gain is
//! stale is pushed back with its current gain.

use crate::classify::ActiveAuthorSet;
use crate::corpus::Corpus;
use crate::error::CoverError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet};
use tracing::{debug, info};

/// One greedy step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub paper_id: String,
    /// Active authors first covered by this paper.
    pub newly_covered: usize,
}

/// Ordered, duplicate-free sequence of selected papers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoveringPaperSet {
    pub selections: Vec<Selection>,
    /// Papers with at least one active author.
    pub relevant_papers: usize,
}

impl CoveringPaperSet {
    pub fn paper_ids(&self) -> impl Iterator<Item = &str> {
        self.selections.iter().map(|s| s.paper_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// SHA-256 over the newline-joined identifier sequence.
    pub fn digest(&self) -> String {
        sequence_digest(self.paper_ids())
    }
}

/// SHA-256 over a newline-joined identifier sequence.
pub fn sequence_digest<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for id in ids {
        hasher.update(id.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Per-run working state. Dropped once the cover is final.
struct CoverState<'a> {
    /// Candidate papers sorted by identifier; the position is the tie-break rank.
    paper_ids: Vec<&'a str>,
    /// Active-author indices contributed by each candidate.
    members: Vec<Vec<usize>>,
    /// Candidates containing each active author.
    papers_of: Vec<Vec<usize>>,
    gain: Vec<usize>,
    covered: Vec<bool>,
    uncovered: usize,
}

impl<'a> CoverState<'a> {
    fn new(corpus: &'a Corpus, active: &'a ActiveAuthorSet) -> Self {
        let authors: Vec<&str> = active.iter().collect();
        let author_idx: HashMap<&str, usize> =
            authors.iter().enumerate().map(|(i, a)| (*a, i)).collect();

        let mut candidates: Vec<(&str, Vec<usize>)> = corpus
            .papers()
            .iter()
            .filter_map(|paper| {
                let set: BTreeSet<usize> = paper
                    .authors
                    .iter()
                    .filter_map(|a| author_idx.get(a.as_str()).copied())
                    .collect();
                (!set.is_empty()).then(|| (paper.id.as_str(), set.into_iter().collect()))
            })
            .collect();
        candidates.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut papers_of = vec![Vec::new(); authors.len()];
        for (rank, (_, members)) in candidates.iter().enumerate() {
            for &a in members {
                papers_of[a].push(rank);
            }
        }

        let gain = candidates.iter().map(|(_, m)| m.len()).collect();
        let (paper_ids, members) = candidates.into_iter().unzip();
        Self {
            paper_ids,
            members,
            papers_of,
            gain,
            covered: vec![false; authors.len()],
            uncovered: authors.len(),
        }
    }

    /// Mark a paper's authors covered and decrement every affected gain.
    fn take(&mut self, rank: usize) -> usize {
        let mut newly = 0;
        for &a in &self.members[rank] {
            if self.covered[a] {
                continue;
            }
            self.covered[a] = true;
            self.uncovered -= 1;
            newly += 1;
            for &other in &self.papers_of[a] {
                self.gain[other] -= 1;
            }
        }
        newly
    }
}

/// Compute a covering paper sequence for `active` over `corpus`.
///
/// Inactive authors are ignored entirely. An empty universe yields an empty
/// cover. An active author that appears on no paper is an error, never
/// skipped.
pub fn greedy_cover(
    corpus: &Corpus,
    active: &ActiveAuthorSet,
) -> Result<CoveringPaperSet, CoverError> {
    let mut state = CoverState::new(corpus, active);
    let relevant_papers = state.paper_ids.len();

    let mut heap: BinaryHeap<(usize, Reverse<usize>)> = state
        .gain
        .iter()
        .enumerate()
        .map(|(rank, &g)| (g, Reverse(rank)))
        .collect();

    let mut selections = Vec::new();
    while state.uncovered > 0 {
        let Some((stored, Reverse(rank))) = heap.pop() else {
            break;
        };
        let current = state.gain[rank];
        if current == 0 {
            continue;
        }
        if current != stored {
            heap.push((current, Reverse(rank)));
            continue;
        }

        let newly_covered = state.take(rank);
        debug!(
            iteration = selections.len() + 1,
            paper = state.paper_ids[rank],
            newly_covered,
            remaining = state.uncovered,
            "Selected paper"
        );
        selections.push(Selection {
            paper_id: state.paper_ids[rank].to_string(),
            newly_covered,
        });
    }

    if state.uncovered > 0 {
        let author = active
            .iter()
            .zip(&state.covered)
            .find(|(_, covered)| !**covered)
            .map(|(a, _)| a.to_string())
            .unwrap_or_default();
        return Err(CoverError::UncoverableAuthor {
            author,
            uncovered: state.uncovered,
        });
    }

    info!(
        active = active.len(),
        relevant_papers,
        selected = selections.len(),
        "Greedy cover complete"
    );
    Ok(CoveringPaperSet {
        selections,
        relevant_papers,
    })
}

/// Outcome of an independent coverage check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageCheck {
    pub active_authors: usize,
    pub covered_authors: usize,
}

impl CoverageCheck {
    pub fn percentage(&self) -> f64 {
        if self.active_authors == 0 {
            100.0
        } else {
            self.covered_authors as f64 / self.active_authors as f64 * 100.0
        }
    }
}

/// Recompute the union of the selected papers' authors and confirm it
/// contains every active author.
pub fn verify_coverage<'a>(
    corpus: &Corpus,
    active: &ActiveAuthorSet,
    selected: impl IntoIterator<Item = &'a str>,
) -> Result<CoverageCheck, CoverError> {
    let mut seen = HashSet::new();
    let mut covered: HashSet<&str> = HashSet::new();
    for id in selected {
        if !seen.insert(id) {
            return Err(CoverError::DuplicateSelection {
                paper: id.to_string(),
            });
        }
        let paper = corpus.get(id).ok_or_else(|| CoverError::UnknownPaper {
            paper: id.to_string(),
        })?;
        covered.extend(
            paper
                .authors
                .iter()
                .map(String::as_str)
                .filter(|a| active.contains(a)),
        );
    }

    let missing: Vec<String> = active
        .iter()
        .filter(|a| !covered.contains(a))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(CoverError::CoverageViolation { missing });
    }
    Ok(CoverageCheck {
        active_authors: active.len(),
        covered_authors: covered.len(),
    })
}
