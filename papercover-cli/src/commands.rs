//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use papercover_core::classify::{ActiveAuthorSet, ActivityThresholds};
use papercover_core::config::{self, PaperCoverConfig};
use papercover_core::corpus::{self, Corpus};
use papercover_core::pipeline::{self, Classification, Coverage};
use papercover_core::reduce::{CoverageCheck, sequence_digest, verify_coverage};
use papercover_core::report::{
    self, AuthorStatistics, CoverReport, CoverStats, RankKey, RankedAuthor,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Values from global CLI flags, layered over the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub corpus: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub venues: Vec<String>,
    pub min_edge: Option<i64>,
    pub min_middle: Option<i64>,
    pub rank_by: Option<RankKey>,
    pub top: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, config: &mut PaperCoverConfig) {
        if let Some(dir) = &self.corpus {
            config.corpus.dir = dir.clone();
        }
        if !self.venues.is_empty() {
            config.corpus.venues = self.venues.clone();
        }
        if let Some(dir) = &self.output {
            config.report.output_dir = dir.clone();
        }
        if let Some(min_edge) = self.min_edge {
            config.thresholds.min_edge_positions = min_edge;
        }
        if let Some(min_middle) = self.min_middle {
            config.thresholds.min_middle_positions = min_middle;
        }
        if let Some(key) = self.rank_by {
            config.report.rank_by = key;
        }
        if let Some(top) = self.top {
            config.report.top_n = top;
        }
    }
}

fn load_merged_config(workspace: &Path, overrides: &Overrides) -> anyhow::Result<PaperCoverConfig> {
    let mut config = config::load_config(Some(workspace), overrides.config_file.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    overrides.apply(&mut config);
    Ok(config)
}

/// Validated configuration plus the loaded corpus.
struct Session {
    config: PaperCoverConfig,
    thresholds: ActivityThresholds,
    corpus: Corpus,
    output_dir: PathBuf,
}

impl Session {
    fn open(workspace: &Path, overrides: &Overrides) -> anyhow::Result<Self> {
        let config = load_merged_config(workspace, overrides)?;
        // Reject bad thresholds before touching the corpus.
        let thresholds = config.validate()?;
        let corpus = corpus::load_dir(
            &workspace.join(&config.corpus.dir),
            &config.corpus.venues,
        )?;
        let output_dir = workspace.join(&config.report.output_dir);
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            config,
            thresholds,
            corpus,
            output_dir,
        })
    }

    fn classify(&self) -> Classification {
        Classification::compute(
            &self.corpus,
            self.thresholds,
            self.config.thresholds.solo_author,
        )
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> anyhow::Result<()> {
        let path = self.output_dir.join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
        info!(path = %path.display(), "Wrote artifact");
        Ok(())
    }

    fn write_text(&self, name: &str, content: &str) -> anyhow::Result<()> {
        let path = self.output_dir.join(name);
        std::fs::write(&path, content)?;
        info!(path = %path.display(), "Wrote artifact");
        Ok(())
    }
}

/// Handle a CLI subcommand.
pub fn handle_command(
    command: Commands,
    workspace: &Path,
    overrides: &Overrides,
) -> anyhow::Result<()> {
    match command {
        Commands::Run => handle_run(workspace, overrides),
        Commands::Classify => {
            let session = Session::open(workspace, overrides)?;
            let classification = session.classify();
            write_classification(&session, &classification)?;
            Ok(())
        }
        Commands::Cover { active } => handle_cover(&active, workspace, overrides),
        Commands::Stats => handle_stats(workspace, overrides),
        Commands::Verify { cover, active } => {
            handle_verify(&cover, active.as_deref(), workspace, overrides)
        }
        Commands::Config { action } => handle_config(action, workspace, overrides),
    }
}

fn handle_run(workspace: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let session = Session::open(workspace, overrides)?;
    // Nothing is written until every stage has succeeded.
    let output = pipeline::run(&session.corpus, &session.config)?;

    write_classification(&session, &output.classification)?;
    write_coverage(&session, &output.coverage)?;
    write_statistics(&session, &output.classification)?;
    Ok(())
}

fn handle_cover(active: &Path, workspace: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let session = Session::open(workspace, overrides)?;
    let active = report::read_active_authors(&workspace.join(active))?;
    info!(active = active.len(), "Loaded active author list");
    let coverage = Coverage::compute(&session.corpus, &active)?;
    write_coverage(&session, &coverage)
}

fn handle_stats(workspace: &Path, overrides: &Overrides) -> anyhow::Result<()> {
    let session = Session::open(workspace, overrides)?;
    let classification = session.classify();
    write_statistics(&session, &classification)
}

fn handle_verify(
    cover: &Path,
    active: Option<&Path>,
    workspace: &Path,
    overrides: &Overrides,
) -> anyhow::Result<()> {
    let session = Session::open(workspace, overrides)?;
    let content = std::fs::read_to_string(workspace.join(cover))?;
    let recorded: CoverReport = serde_json::from_str(&content)?;

    let digest = sequence_digest(recorded.papers.iter().map(String::as_str));
    if digest != recorded.digest {
        anyhow::bail!(
            "Covering set digest mismatch: recorded {}, computed {}",
            recorded.digest,
            digest
        );
    }

    let active: ActiveAuthorSet = match active {
        Some(path) => report::read_active_authors(&workspace.join(path))?,
        None => session.classify().active,
    };
    let check = verify_coverage(
        &session.corpus,
        &active,
        recorded.papers.iter().map(String::as_str),
    )?;
    print_verification(&recorded, &check);
    Ok(())
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    overrides: &Overrides,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = config::workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = toml::to_string_pretty(&PaperCoverConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_merged_config(workspace, overrides)?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Artifact writers
// ---------------------------------------------------------------------------

fn write_classification(session: &Session, classification: &Classification) -> anyhow::Result<()> {
    let ranked = report::rank_active_authors(
        &classification.index,
        &classification.active,
        session.config.report.rank_by,
    );

    session.write_json(
        "author_positions.json",
        &report::author_listing(&classification.index, &classification.active),
    )?;
    session.write_json("active_authors.json", &ranked)?;
    session.write_text(
        "active_authors_report.txt",
        &report::render_active_report(
            &session.corpus,
            &classification.thresholds,
            &classification.breakdown,
            &ranked,
        ),
    )?;

    print_classification(session, classification, &ranked);
    Ok(())
}

fn write_coverage(session: &Session, coverage: &Coverage) -> anyhow::Result<()> {
    let stats = CoverStats::compute(&session.corpus, &coverage.cover, &coverage.check);
    let papers = report::selected_papers(&session.corpus, &coverage.cover);
    let cover_report = CoverReport::new(&coverage.cover, stats.clone());

    session.write_json("covering_set.json", &cover_report)?;
    session.write_json("minimal_paper_set.json", &papers)?;
    session.write_text(
        "minimal_paper_set_report.txt",
        &report::render_cover_report(
            &stats,
            &cover_report.digest,
            &papers,
            session.config.report.preview_authors,
        ),
    )?;

    print_cover_summary(&stats, &cover_report.digest);
    Ok(())
}

fn write_statistics(session: &Session, classification: &Classification) -> anyhow::Result<()> {
    let stats = AuthorStatistics::compute(&session.corpus, &classification.index);
    session.write_text(
        "author_statistics.txt",
        &report::render_author_statistics(&stats, &classification.index),
    )?;
    println!(
        "Author statistics: {} papers, {} unique authors, {:.2} papers per author",
        stats.total_papers, stats.unique_authors, stats.average_papers_per_author
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Console output
// ---------------------------------------------------------------------------

fn print_classification(session: &Session, classification: &Classification, ranked: &[RankedAuthor]) {
    let b = &classification.breakdown;
    println!(
        "Active authors: {} of {} ({} via first/last, {} via middle only)",
        b.active, b.total_authors, b.via_edge, b.middle_only
    );

    let top_n = session.config.report.top_n;
    if ranked.is_empty() {
        return;
    }
    println!(
        "\nTop {} active authors by {}:",
        top_n.min(ranked.len()),
        session.config.report.rank_by
    );
    println!(
        "{:<6} {:<40} {:>6} {:>6} {:>6} {:>6}",
        "Rank", "Author", "Total", "First", "Last", "Middle"
    );
    for (i, a) in ranked.iter().take(top_n).enumerate() {
        println!(
            "{:<6} {:<40} {:>6} {:>6} {:>6} {:>6}",
            i + 1,
            a.name,
            a.total_papers,
            a.first_author,
            a.last_author,
            a.middle_author
        );
    }
    println!();
}

fn print_cover_summary(stats: &CoverStats, digest: &str) {
    println!(
        "Covering set: {} of {} papers ({:.2}% reduction), {}/{} active authors covered ({:.2}%)",
        stats.covering_set_size,
        stats.original_papers,
        stats.reduction_percentage,
        stats.covered_authors,
        stats.active_authors,
        stats.coverage_percentage
    );
    println!("Sequence digest: {digest}");
}

fn print_verification(recorded: &CoverReport, check: &CoverageCheck) {
    println!(
        "Covering set OK: {} papers cover {}/{} active authors ({:.2}%)",
        recorded.papers.len(),
        check.covered_authors,
        check.active_authors,
        check.percentage()
    );
}
