//! Corpus loading: per-venue-per-year paper files into a uniform paper list.
//!
//! A corpus directory holds files named `<venue>_<year>_papers.json`, each a
//! JSON array of paper records. Only the identifier and the ordered author
//! list matter downstream; venue, year, and title are carried for reports.

use crate::error::{CorpusError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A single paper with its ordered author list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// Identifier, unique within the corpus.
    pub id: String,
    /// Author identifiers in byline order.
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
}

impl Paper {
    pub fn new<I, S>(id: impl Into<String>, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            authors: authors.into_iter().map(Into::into).collect(),
            title: None,
            venue: None,
            year: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>, year: Option<u16>) -> Self {
        self.venue = Some(venue.into());
        self.year = year;
        self
    }
}

/// The loaded, validated paper collection. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    papers: Vec<Paper>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    /// Build a corpus, rejecting blank and duplicate identifiers.
    pub fn from_papers(papers: Vec<Paper>) -> std::result::Result<Self, CorpusError> {
        let mut by_id = HashMap::with_capacity(papers.len());
        for (idx, paper) in papers.iter().enumerate() {
            if paper.id.trim().is_empty() {
                return Err(CorpusError::MissingIdentifier {
                    file: "<memory>".into(),
                    index: idx,
                });
            }
            if by_id.insert(paper.id.clone(), idx).is_some() {
                return Err(CorpusError::DuplicatePaper {
                    paper: paper.id.clone(),
                });
            }
        }
        Ok(Self { papers, by_id })
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn get(&self, id: &str) -> Option<&Paper> {
        self.by_id.get(id).map(|&idx| &self.papers[idx])
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    /// Total number of (paper, author) entries across the corpus.
    pub fn author_entries(&self) -> usize {
        self.papers.iter().map(|p| p.authors.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPaperRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    authors: Option<Vec<Option<String>>>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    year: Option<YearField>,
}

/// Years show up as numbers, numeric strings, or placeholders like `"N/A"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum YearField {
    Number(i64),
    Text(String),
}

impl YearField {
    fn as_year(&self) -> Option<u16> {
        match self {
            YearField::Number(n) => u16::try_from(*n).ok(),
            YearField::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Venue and year encoded in a `<venue>_<year>_papers` file stem.
fn stem_venue_year(stem: &str) -> (Option<String>, Option<u16>) {
    let mut parts = stem.split('_');
    let venue = parts
        .next()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string());
    let year = parts.next().and_then(|y| y.parse().ok());
    (venue, year)
}

/// Parse one file's worth of records.
///
/// `stem` is the file stem; it supplies positional identifiers for records
/// without an `id` and fallback venue/year values.
pub fn parse_records(json: &str, stem: &str) -> std::result::Result<Vec<Paper>, CorpusError> {
    let raw: Vec<RawPaperRecord> =
        serde_json::from_str(json).map_err(|e| CorpusError::InvalidFile {
            path: PathBuf::from(stem),
            message: e.to_string(),
        })?;
    let (file_venue, file_year) = stem_venue_year(stem);

    let mut papers = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        let id = match record.id {
            Some(id) if id.trim().is_empty() => {
                return Err(CorpusError::MissingIdentifier {
                    file: stem.to_string(),
                    index,
                });
            }
            Some(id) => id.trim().to_string(),
            None => format!("{stem}#{index}"),
        };

        let Some(raw_authors) = record.authors else {
            return Err(CorpusError::MissingAuthors { paper: id });
        };

        let mut authors = Vec::with_capacity(raw_authors.len());
        for name in raw_authors {
            match name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => authors.push(name.to_string()),
                _ => warn!(paper = %id, "Dropping blank author entry"),
            }
        }

        papers.push(Paper {
            id,
            authors,
            title: record.title.filter(|t| !t.trim().is_empty()),
            venue: record.venue.or_else(|| file_venue.clone()),
            year: record
                .year
                .as_ref()
                .and_then(YearField::as_year)
                .or(file_year),
        });
    }
    Ok(papers)
}

/// Whether a corpus file belongs to one of the requested venues.
///
/// An empty filter accepts everything; matching is a case-insensitive
/// file-name prefix test.
pub fn venue_matches(file_name: &str, venues: &[String]) -> bool {
    if venues.is_empty() {
        return true;
    }
    let lower = file_name.to_lowercase();
    venues.iter().any(|v| lower.starts_with(&v.to_lowercase()))
}

/// List the `.json` files of a corpus directory in sorted order.
///
/// Directory read errors propagate. With a venue filter, a file name that is
/// not valid UTF-8 cannot be matched and is an `InvalidFile` error.
pub fn corpus_files(dir: &Path, venues: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CorpusError::DirectoryNotFound {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if !path.extension().is_some_and(|ext| ext == "json") {
            continue;
        }
        if !venues.is_empty() {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                return Err(CorpusError::InvalidFile {
                    path,
                    message: "file name is not valid UTF-8".into(),
                }
                .into());
            };
            if !venue_matches(name, venues) {
                continue;
            }
        }
        files.push(path);
    }
    files.sort();
    Ok(files)
}

/// Load every matching corpus file in `dir` into a single [`Corpus`].
///
/// Fails fast: one malformed record aborts the whole load.
pub fn load_dir(dir: &Path, venues: &[String]) -> Result<Corpus> {
    let files = corpus_files(dir, venues)?;
    let mut papers = Vec::new();

    for path in &files {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        let parsed = parse_records(&content, &stem).map_err(|e| match e {
            CorpusError::InvalidFile { message, .. } => CorpusError::InvalidFile {
                path: path.clone(),
                message,
            },
            other => other,
        })?;
        debug!(file = %path.display(), papers = parsed.len(), "Loaded corpus file");
        papers.extend(parsed);
    }

    let corpus = Corpus::from_papers(papers)?;
    info!(
        files = files.len(),
        papers = corpus.len(),
        author_entries = corpus.author_entries(),
        "Corpus loaded"
    );
    Ok(corpus)
}
