//! # papercover-core — Active Authors and Minimal Covering Paper Sets
//!
//! Given a corpus of papers with ordered author lists, this crate:
//! 1. **Indexes** every author's first / last / middle positions ([`index`])
//! 2. **Classifies** authors as active by positional thresholds ([`classify`])
//! 3. **Reduces** the corpus to a small set of papers that together include
//!    every active author, using greedy set cover with a fixed tie-break
//!    ([`reduce`])
//! 4. **Reports** ranked listings and coverage statistics ([`report`])
//!
//! Data flows strictly forward; every stage returns a new immutable value.

pub mod classify;
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod reduce;
pub mod report;

// Re-exports
pub use classify::{ActiveAuthorSet, ActivityBreakdown, ActivityThresholds, EdgeRule, classify};
pub use config::{PaperCoverConfig, load_config};
pub use corpus::{Corpus, Paper};
pub use error::{ConfigError, CorpusError, CoverError, PaperCoverError, Result};
pub use index::{PositionClass, PositionCounts, PositionIndex, SoloAuthorPolicy};
pub use pipeline::{Classification, Coverage, PipelineOutput};
pub use reduce::{CoverageCheck, CoveringPaperSet, Selection, greedy_cover, verify_coverage};
pub use report::RankKey;
