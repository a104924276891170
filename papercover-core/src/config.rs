//! Configuration system for papercover.
//!
//! Uses `figment` for layered configuration: defaults -> user config ->
//! workspace or explicit config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/papercover/config.toml` and/or
//! `.papercover/config.toml` in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::{ActivityThresholds, EdgeRule};
use crate::error::ConfigError;
use crate::index::SoloAuthorPolicy;
use crate::report::RankKey;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperCoverConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Activity thresholds as written in config files.
///
/// Stored signed so negative values are reported as such rather than as a
/// parse failure; [`ThresholdConfig::validate`] yields the typed form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum first/last positions (T_edge).
    pub min_edge_positions: i64,
    /// Minimum middle positions (T_middle).
    pub min_middle_positions: i64,
    pub edge_rule: EdgeRule,
    pub solo_author: SoloAuthorPolicy,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_edge_positions: 2,
            min_middle_positions: 4,
            edge_rule: EdgeRule::Combined,
            solo_author: SoloAuthorPolicy::FirstOnly,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<ActivityThresholds, ConfigError> {
        let min_edge = check_threshold("thresholds.min_edge_positions", self.min_edge_positions)?;
        let min_middle =
            check_threshold("thresholds.min_middle_positions", self.min_middle_positions)?;
        Ok(ActivityThresholds::new(min_edge, min_middle).with_edge_rule(self.edge_rule))
    }
}

fn check_threshold(field: &str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::NegativeThreshold {
            field: field.to_string(),
            value,
        });
    }
    u32::try_from(value).map_err(|_| ConfigError::ThresholdOutOfRange {
        field: field.to_string(),
        value,
    })
}

/// Where the paper records live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub dir: PathBuf,
    /// Venue prefixes to include. Empty means every venue.
    pub venues: Vec<String>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("conference_papers"),
            venues: Vec::new(),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    /// Rows shown in console summaries.
    pub top_n: usize,
    pub rank_by: RankKey,
    /// Authors listed per paper in the covering set report.
    pub preview_authors: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            top_n: 20,
            rank_by: RankKey::Total,
            preview_authors: 5,
        }
    }
}

impl PaperCoverConfig {
    /// Reject invalid settings before any computation starts.
    pub fn validate(&self) -> Result<ActivityThresholds, ConfigError> {
        if self.report.top_n == 0 {
            return Err(ConfigError::Invalid {
                message: "report.top_n must be at least 1".into(),
            });
        }
        self.thresholds.validate()
    }
}

/// Workspace-local config file path.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".papercover").join("config.toml")
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "papercover", "papercover")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `PAPERCOVER_`)
/// 2. `explicit` config file if given, else `<workspace>/.papercover/config.toml`
/// 3. User config (`~/.config/papercover/config.toml`)
/// 4. Built-in defaults
///
/// CLI flags are applied by the caller on the returned value.
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<PaperCoverConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(PaperCoverConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    match (explicit, workspace) {
        (Some(path), _) => {
            if !path.exists() {
                return Err(ConfigError::Load {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            figment = figment.merge(Toml::file(path));
        }
        (None, Some(ws)) => {
            let ws_config = workspace_config_path(ws);
            if ws_config.exists() {
                figment = figment.merge(Toml::file(&ws_config));
            }
        }
        (None, None) => {}
    }

    // PAPERCOVER_THRESHOLDS__MIN_EDGE_POSITIONS, PAPERCOVER_CORPUS__DIR, etc.
    figment = figment.merge(Env::prefixed("PAPERCOVER_").split("__"));

    figment.extract().map_err(|e| ConfigError::Load {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PaperCoverConfig::default();
        assert_eq!(config.thresholds.min_edge_positions, 2);
        assert_eq!(config.thresholds.min_middle_positions, 4);
        assert_eq!(config.thresholds.edge_rule, EdgeRule::Combined);
        assert_eq!(config.thresholds.solo_author, SoloAuthorPolicy::FirstOnly);
        assert_eq!(config.corpus.dir, PathBuf::from("conference_papers"));
        assert!(config.corpus.venues.is_empty());
        assert_eq!(config.report.top_n, 20);
    }

    #[test]
    fn test_default_thresholds_validate() {
        let t = PaperCoverConfig::default().validate().unwrap();
        assert_eq!(t, ActivityThresholds::default());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = ThresholdConfig {
            min_middle_positions: -3,
            ..ThresholdConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NegativeThreshold { ref field, value: -3 }
                if field == "thresholds.min_middle_positions"
        ));
    }

    #[test]
    fn test_oversized_threshold_rejected() {
        let config = ThresholdConfig {
            min_edge_positions: i64::from(u32::MAX) + 1,
            ..ThresholdConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn test_zero_top_n_rejected() {
        let mut config = PaperCoverConfig::default();
        config.report.top_n = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = PaperCoverConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: PaperCoverConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_load_config_workspace_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = workspace_config_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(
            &path,
            "[thresholds]\nmin_edge_positions = 3\nmin_middle_positions = 5\nedge_rule = \"either\"\n\n[corpus]\ndir = \"papers\"\nvenues = [\"iclr\"]\n",
        )
        .unwrap();

        let config = load_config(Some(dir.path()), None).unwrap();
        assert_eq!(config.thresholds.min_edge_positions, 3);
        assert_eq!(config.thresholds.min_middle_positions, 5);
        assert_eq!(config.thresholds.edge_rule, EdgeRule::Either);
        assert_eq!(config.corpus.dir, PathBuf::from("papers"));
        assert_eq!(config.corpus.venues, vec!["iclr"]);
        // Untouched sections keep their defaults.
        assert_eq!(config.report.top_n, 20);
    }

    #[test]
    fn test_load_config_explicit_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("custom.toml");
        std::fs::write(
            &explicit,
            "[thresholds]\nmin_edge_positions = 1\nmin_middle_positions = 2\n",
        )
        .unwrap();
        let config = load_config(Some(dir.path()), Some(&explicit)).unwrap();
        assert_eq!(config.thresholds.min_edge_positions, 1);
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let err = load_config(None, Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Load { .. }));
    }

    #[test]
    fn test_load_config_negative_value_survives_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = dir.path().join("neg.toml");
        std::fs::write(
            &explicit,
            "[thresholds]\nmin_edge_positions = -1\nmin_middle_positions = 4\n",
        )
        .unwrap();
        let config = load_config(None, Some(&explicit)).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeThreshold { value: -1, .. })
        ));
    }
}
