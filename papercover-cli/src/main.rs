//! papercover CLI — classify active authors and reduce a paper corpus to a
//! minimal covering set.

mod commands;

use clap::Parser;
use papercover_core::RankKey;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// papercover: find active authors and the fewest papers that include them all
#[derive(Parser, Debug)]
#[command(name = "papercover", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (relative corpus/output paths resolve against it)
    #[arg(short, long, default_value = ".", global = true)]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Corpus directory holding `<venue>_<year>_papers.json` files
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Directory for generated artifacts
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Restrict the corpus to venues with this file-name prefix (repeatable)
    #[arg(long = "venue", global = true)]
    venues: Vec<String>,

    /// Minimum edge (first + last) positions for an active author
    #[arg(long, global = true, allow_negative_numbers = true)]
    min_edge: Option<i64>,

    /// Minimum middle positions for an active author
    #[arg(long, global = true, allow_negative_numbers = true)]
    min_middle: Option<i64>,

    /// Ranking key for author listings: total, edge, first, last, middle
    #[arg(long, global = true)]
    rank_by: Option<RankKey>,

    /// Number of ranked authors shown in console summaries
    #[arg(long, global = true)]
    top: Option<usize>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline and write every artifact
    Run,
    /// Index author positions and write the active author artifacts
    Classify,
    /// Compute a covering set for an active author list loaded from file
    Cover {
        /// Active author list (`active_authors.json` or a JSON array of names)
        #[arg(long)]
        active: PathBuf,
    },
    /// Write the author statistics report
    Stats,
    /// Re-check a covering set against the corpus
    Verify {
        /// `covering_set.json` produced by `run` or `cover`
        #[arg(long)]
        cover: PathBuf,
        /// Active author list; recomputed from the corpus when omitted
        #[arg(long)]
        active: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "papercover", "papercover")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "papercover.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let overrides = commands::Overrides {
        config_file: cli.config,
        corpus: cli.corpus,
        output: cli.output,
        venues: cli.venues,
        min_edge: cli.min_edge,
        min_middle: cli.min_middle,
        rank_by: cli.rank_by,
        top: cli.top,
    };

    commands::handle_command(cli.command, &workspace, &overrides)
}
