//! Report generation.
//!
//! Pure consumers of the index, the active set, and the cover: nothing here
//! re-derives or mutates those inputs, and every output is a deterministic
//! function of them (ranking ties break by author name, no timestamps).

use crate::classify::{ActiveAuthorSet, ActivityBreakdown, ActivityThresholds};
use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::index::{PositionCounts, PositionIndex};
use crate::reduce::{CoverageCheck, CoveringPaperSet};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

const RULE: &str = "================================================================================";
const THIN_RULE: &str = "--------------------------------------------------------------------------------";

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Primary key for author rankings. Always descending; ties by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankKey {
    #[default]
    Total,
    Edge,
    First,
    Last,
    Middle,
}

impl RankKey {
    fn value(&self, counts: &PositionCounts) -> u32 {
        match self {
            RankKey::Total => counts.total(),
            RankKey::Edge => counts.edge(),
            RankKey::First => counts.first,
            RankKey::Last => counts.last,
            RankKey::Middle => counts.middle,
        }
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RankKey::Total => "total",
            RankKey::Edge => "edge",
            RankKey::First => "first",
            RankKey::Last => "last",
            RankKey::Middle => "middle",
        };
        f.write_str(s)
    }
}

impl FromStr for RankKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" => Ok(RankKey::Total),
            "edge" => Ok(RankKey::Edge),
            "first" => Ok(RankKey::First),
            "last" => Ok(RankKey::Last),
            "middle" => Ok(RankKey::Middle),
            other => Err(format!(
                "unknown rank key '{other}' (expected total, edge, first, last, middle)"
            )),
        }
    }
}

/// Entry of the ranked active author listing (`active_authors.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedAuthor {
    pub name: String,
    pub total_papers: u32,
    pub first_author: u32,
    pub last_author: u32,
    pub middle_author: u32,
}

/// Active authors ranked by `key` descending, then by the other position
/// totals, then by name.
pub fn rank_active_authors(
    index: &PositionIndex,
    active: &ActiveAuthorSet,
    key: RankKey,
) -> Vec<RankedAuthor> {
    let mut rows: Vec<(&str, &PositionCounts)> = index
        .iter()
        .filter(|(author, _)| active.contains(author))
        .collect();
    rows.sort_by_key(|(author, counts)| {
        (
            Reverse(key.value(counts)),
            Reverse(counts.total()),
            Reverse(counts.edge()),
            *author,
        )
    });
    rows.into_iter()
        .map(|(name, c)| RankedAuthor {
            name: name.to_string(),
            total_papers: c.total(),
            first_author: c.first,
            last_author: c.last,
            middle_author: c.middle,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Author listing
// ---------------------------------------------------------------------------

/// Per-author record of `author_positions.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub first_count: u32,
    pub last_count: u32,
    pub middle_count: u32,
    pub total: u32,
    pub active: bool,
}

/// Every author with their counts and classification, keyed by author.
pub fn author_listing(
    index: &PositionIndex,
    active: &ActiveAuthorSet,
) -> BTreeMap<String, AuthorRecord> {
    index
        .iter()
        .map(|(author, c)| {
            (
                author.to_string(),
                AuthorRecord {
                    first_count: c.first,
                    last_count: c.last,
                    middle_count: c.middle,
                    total: c.total(),
                    active: active.contains(author),
                },
            )
        })
        .collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActiveEntry {
    Name(String),
    Record { name: String },
}

/// Parse an active author list: either the ranked `active_authors.json`
/// shape or a plain array of names.
pub fn parse_active_authors(json: &str) -> std::result::Result<ActiveAuthorSet, String> {
    let entries: Vec<ActiveEntry> = serde_json::from_str(json).map_err(|e| e.to_string())?;
    Ok(entries
        .into_iter()
        .map(|e| match e {
            ActiveEntry::Name(name) | ActiveEntry::Record { name } => name.trim().to_string(),
        })
        .filter(|name| !name.is_empty())
        .collect())
}

pub fn read_active_authors(path: &Path) -> Result<ActiveAuthorSet> {
    let content = std::fs::read_to_string(path)?;
    parse_active_authors(&content).map_err(|message| {
        CorpusError::InvalidActiveList {
            path: path.to_path_buf(),
            message,
        }
        .into()
    })
}

// ---------------------------------------------------------------------------
// Cover statistics
// ---------------------------------------------------------------------------

/// Summary numbers for a covering set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverStats {
    pub original_papers: usize,
    pub relevant_papers: usize,
    pub active_authors: usize,
    pub covering_set_size: usize,
    pub covered_authors: usize,
    /// Share of the corpus dropped, in percent.
    pub reduction_percentage: f64,
    /// Covering set size as a share of the corpus, in percent.
    pub compression_ratio: f64,
    pub coverage_percentage: f64,
}

impl CoverStats {
    pub fn compute(corpus: &Corpus, cover: &CoveringPaperSet, check: &CoverageCheck) -> Self {
        let original = corpus.len();
        let compression_ratio = if original == 0 {
            0.0
        } else {
            cover.len() as f64 / original as f64 * 100.0
        };
        Self {
            original_papers: original,
            relevant_papers: cover.relevant_papers,
            active_authors: check.active_authors,
            covering_set_size: cover.len(),
            covered_authors: check.covered_authors,
            reduction_percentage: if original == 0 {
                0.0
            } else {
                100.0 - compression_ratio
            },
            compression_ratio,
            coverage_percentage: check.percentage(),
        }
    }
}

/// Contents of `covering_set.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverReport {
    pub papers: Vec<String>,
    pub stats: CoverStats,
    /// SHA-256 of the newline-joined `papers` sequence.
    pub digest: String,
}

impl CoverReport {
    pub fn new(cover: &CoveringPaperSet, stats: CoverStats) -> Self {
        Self {
            papers: cover.paper_ids().map(str::to_string).collect(),
            stats,
            digest: cover.digest(),
        }
    }
}

/// Entry of `minimal_paper_set.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPaper {
    pub rank: usize,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    pub authors: Vec<String>,
    pub newly_covered: usize,
}

/// Full records for the selected papers, in selection order.
pub fn selected_papers(corpus: &Corpus, cover: &CoveringPaperSet) -> Vec<SelectedPaper> {
    cover
        .selections
        .iter()
        .enumerate()
        .filter_map(|(i, sel)| {
            corpus.get(&sel.paper_id).map(|p| SelectedPaper {
                rank: i + 1,
                id: p.id.clone(),
                title: p.title.clone(),
                venue: p.venue.clone(),
                year: p.year,
                authors: p.authors.clone(),
                newly_covered: sel.newly_covered,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Author statistics
// ---------------------------------------------------------------------------

/// Corpus-wide paper counts per author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorStatistics {
    pub total_papers: usize,
    pub author_entries: usize,
    pub unique_authors: usize,
    pub single_paper_authors: usize,
    pub two_paper_authors: usize,
    pub average_papers_per_author: f64,
    /// Paper count → number of authors with that many papers.
    pub distribution: BTreeMap<u32, usize>,
}

impl AuthorStatistics {
    pub fn compute(corpus: &Corpus, index: &PositionIndex) -> Self {
        let mut distribution = BTreeMap::new();
        for (_, counts) in index.iter() {
            *distribution.entry(counts.total()).or_insert(0) += 1;
        }
        let unique_authors = index.len();
        let author_entries: usize = index.iter().map(|(_, c)| c.total() as usize).sum();
        Self {
            total_papers: corpus.len(),
            author_entries,
            unique_authors,
            single_paper_authors: distribution.get(&1).copied().unwrap_or(0),
            two_paper_authors: distribution.get(&2).copied().unwrap_or(0),
            average_papers_per_author: if unique_authors == 0 {
                0.0
            } else {
                author_entries as f64 / unique_authors as f64
            },
            distribution,
        }
    }
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// `active_authors_report.txt`
pub fn render_active_report(
    corpus: &Corpus,
    thresholds: &ActivityThresholds,
    breakdown: &ActivityBreakdown,
    ranked: &[RankedAuthor],
) -> String {
    let b = breakdown;
    let with_authors = corpus
        .papers()
        .iter()
        .filter(|p| !p.authors.is_empty())
        .count();

    let mut out = String::new();
    out.push_str(&format!("{RULE}\nActive Author Analysis Report\n{RULE}\n\n"));
    out.push_str(&format!("Criteria ({} edge rule):\n", thresholds.edge_rule));
    out.push_str(&format!(
        "  - At least {} first/last author positions, OR\n",
        thresholds.min_edge
    ));
    out.push_str(&format!(
        "  - At least {} middle author positions\n\n",
        thresholds.min_middle
    ));

    out.push_str(&format!("Total papers: {}\n", corpus.len()));
    out.push_str(&format!("Papers with authors: {with_authors}\n"));
    out.push_str(&format!("Total unique authors: {}\n", b.total_authors));
    out.push_str(&format!(
        "Active authors: {} ({:.1}%)\n",
        b.active,
        pct(b.active, b.total_authors)
    ));
    out.push_str(&format!(
        "Inactive authors: {} ({:.1}%)\n\n",
        b.inactive,
        pct(b.inactive, b.total_authors)
    ));

    out.push_str(&format!("Breakdown:\n{THIN_RULE}\n"));
    out.push_str(&format!(
        "Active through first/last positions: {}\n",
        b.via_edge
    ));
    out.push_str(&format!(
        "Active through middle positions only: {}\n",
        b.middle_only
    ));
    out.push_str(&format!(
        "Authors with >= {} first positions: {}\n",
        thresholds.min_edge, b.first_at_least_edge
    ));
    out.push_str(&format!(
        "Authors with >= {} last positions: {}\n",
        thresholds.min_edge, b.last_at_least_edge
    ));
    out.push_str(&format!("Authors with both: {}\n\n", b.both_at_least_edge));

    out.push_str(&format!("{RULE}\nActive Authors\n{RULE}\n\n"));
    out.push_str(&format!(
        "{:<8} {:<50} {:<8} {:<8} {:<8} {:<8}\n",
        "Rank", "Author Name", "Total", "First", "Last", "Middle"
    ));
    out.push_str(&format!("{THIN_RULE}\n"));
    for (i, a) in ranked.iter().enumerate() {
        out.push_str(&format!(
            "{:<8} {:<50} {:<8} {:<8} {:<8} {:<8}\n",
            i + 1,
            a.name,
            a.total_papers,
            a.first_author,
            a.last_author,
            a.middle_author
        ));
    }
    out
}

/// `minimal_paper_set_report.txt`
pub fn render_cover_report(
    stats: &CoverStats,
    digest: &str,
    papers: &[SelectedPaper],
    preview_authors: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{RULE}\nMinimal Paper Set (greedy cover of active authors)\n{RULE}\n\n"
    ));
    out.push_str(&format!("Total papers: {}\n", stats.original_papers));
    out.push_str(&format!("Relevant papers: {}\n", stats.relevant_papers));
    out.push_str(&format!("Active authors: {}\n", stats.active_authors));
    out.push_str(&format!("Selected papers: {}\n", stats.covering_set_size));
    out.push_str(&format!("Compression ratio: {:.2}%\n", stats.compression_ratio));
    out.push_str(&format!("Reduction: {:.2}%\n", stats.reduction_percentage));
    out.push_str(&format!("Covered authors: {}\n", stats.covered_authors));
    out.push_str(&format!("Coverage: {:.2}%\n", stats.coverage_percentage));
    out.push_str(&format!("Sequence digest: {digest}\n\n"));

    out.push_str(&format!("{RULE}\nSelected Papers\n{RULE}\n\n"));
    for p in papers {
        out.push_str(&format!("{}. {}\n", p.rank, p.title.as_deref().unwrap_or(&p.id)));
        out.push_str(&format!("   Id: {}\n", p.id));
        let venue = match (&p.venue, p.year) {
            (Some(v), Some(y)) => format!("{v} {y}"),
            (Some(v), None) => v.clone(),
            (None, Some(y)) => y.to_string(),
            (None, None) => "N/A".to_string(),
        };
        out.push_str(&format!("   Venue: {venue}\n"));
        let shown: Vec<&str> = p
            .authors
            .iter()
            .take(preview_authors)
            .map(String::as_str)
            .collect();
        out.push_str(&format!(
            "   Authors ({}): {}",
            p.authors.len(),
            shown.join(", ")
        ));
        if p.authors.len() > preview_authors {
            out.push_str(&format!(" ... and {} more", p.authors.len() - preview_authors));
        }
        out.push_str(&format!("\n   Newly covered: {}\n\n", p.newly_covered));
    }
    out
}

/// `author_statistics.txt`
pub fn render_author_statistics(stats: &AuthorStatistics, index: &PositionIndex) -> String {
    let mut out = String::new();
    out.push_str(&format!("{RULE}\nConference Paper Author Statistics\n{RULE}\n\n"));
    out.push_str(&format!("Total papers: {}\n", stats.total_papers));
    out.push_str(&format!("Total author entries: {}\n", stats.author_entries));
    out.push_str(&format!("Unique authors: {}\n", stats.unique_authors));
    out.push_str(&format!(
        "Authors with only 1 paper: {} ({:.1}%)\n",
        stats.single_paper_authors,
        pct(stats.single_paper_authors, stats.unique_authors)
    ));
    out.push_str(&format!(
        "Authors with only 2 papers: {} ({:.1}%)\n",
        stats.two_paper_authors,
        pct(stats.two_paper_authors, stats.unique_authors)
    ));
    out.push_str(&format!(
        "Average papers per author: {:.2}\n\n",
        stats.average_papers_per_author
    ));

    out.push_str(&format!("Paper Count Distribution:\n{THIN_RULE}\n"));
    for (papers, authors) in &stats.distribution {
        out.push_str(&format!("{papers:>4} papers: {authors:>8} authors\n"));
    }

    out.push_str(&format!("\n{RULE}\nAll Authors Sorted by Paper Count\n{RULE}\n\n"));
    out.push_str(&format!("{:<8} {:<60} {:<10}\n", "Rank", "Author Name", "Papers"));
    out.push_str(&format!("{THIN_RULE}\n"));
    let mut rows: Vec<(&str, u32)> = index.iter().map(|(a, c)| (a, c.total())).collect();
    rows.sort_by_key(|(a, total)| (Reverse(*total), *a));
    for (i, (author, total)) in rows.iter().enumerate() {
        out.push_str(&format!("{:<8} {:<60} {:<10}\n", i + 1, author, total));
    }
    out
}
