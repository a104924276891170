//! End-to-end run: index → classify → reduce → verify.
//!
//! Each stage consumes the previous stage's immutable output. Either every
//! stage succeeds and a consistent active set / covering set pair is
//! returned, or the run fails with no partial output.

use crate::classify::{ActiveAuthorSet, ActivityBreakdown, ActivityThresholds, classify};
use crate::config::PaperCoverConfig;
use crate::corpus::Corpus;
use crate::error::Result;
use crate::index::{PositionIndex, SoloAuthorPolicy};
use crate::reduce::{CoverageCheck, CoveringPaperSet, greedy_cover, verify_coverage};
use tracing::info;

/// Index and classification results.
#[derive(Debug, Clone)]
pub struct Classification {
    pub index: PositionIndex,
    pub thresholds: ActivityThresholds,
    pub active: ActiveAuthorSet,
    pub breakdown: ActivityBreakdown,
}

impl Classification {
    pub fn compute(
        corpus: &Corpus,
        thresholds: ActivityThresholds,
        solo: SoloAuthorPolicy,
    ) -> Self {
        let index = PositionIndex::build(corpus, solo);
        let active = classify(&index, &thresholds);
        let breakdown = ActivityBreakdown::compute(&index, &thresholds);
        Self {
            index,
            thresholds,
            active,
            breakdown,
        }
    }
}

/// A verified covering set.
#[derive(Debug, Clone)]
pub struct Coverage {
    pub cover: CoveringPaperSet,
    pub check: CoverageCheck,
}

impl Coverage {
    /// Run the greedy reducer and independently re-check its output.
    pub fn compute(corpus: &Corpus, active: &ActiveAuthorSet) -> Result<Self> {
        let cover = greedy_cover(corpus, active)?;
        let check = verify_coverage(corpus, active, cover.paper_ids())?;
        info!(
            selected = cover.len(),
            covered = check.covered_authors,
            coverage = check.percentage(),
            "Coverage verified"
        );
        Ok(Self { cover, check })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub classification: Classification,
    pub coverage: Coverage,
}

/// Run the full pipeline over an already loaded corpus.
pub fn run(corpus: &Corpus, config: &PaperCoverConfig) -> Result<PipelineOutput> {
    let thresholds = config.validate()?;
    let classification =
        Classification::compute(corpus, thresholds, config.thresholds.solo_author);
    let coverage = Coverage::compute(corpus, &classification.active)?;
    Ok(PipelineOutput {
        classification,
        coverage,
    })
}
