//! Analysis configuration: tier thresholds, federal handling, ranking size.

use std::path::{Path, PathBuf};

use billscope_core::FEDERAL_JURISDICTION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::Tier;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("medium tier starts at {medium_min} but high tier starts at {high_min}")]
    InvalidTiers { medium_min: u32, high_min: u32 },

    #[error("federal jurisdiction label is blank")]
    BlankFederalLabel,

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Score boundaries for the protection tiers.
///
/// Low is `[0, medium_min)`, Medium is `[medium_min, high_min)`, High is
/// `[high_min, ..]`. Defaults give Low 0–3, Medium 4–5, High 6+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub medium_min: u32,
    pub high_min: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            medium_min: 4,
            high_min: 6,
        }
    }
}

impl TierThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.medium_min > self.high_min {
            return Err(ConfigError::InvalidTiers {
                medium_min: self.medium_min,
                high_min: self.high_min,
            });
        }
        Ok(())
    }

    /// Tier for a provision score. Monotonic in `score`.
    pub fn tier(&self, score: u32) -> Tier {
        if score >= self.high_min {
            Tier::High
        } else if score >= self.medium_min {
            Tier::Medium
        } else {
            Tier::Low
        }
    }
}

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub tiers: TierThresholds,
    /// Jurisdiction label identifying federal bills (case-insensitive).
    pub federal_label: String,
    /// Whether the federal jurisdiction gets a score alongside the states.
    /// Federal bills count toward the federal/state ratio either way.
    pub score_federal: bool,
    /// Number of jurisdictions in each of the top and bottom rankings.
    pub ranking_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tiers: TierThresholds::default(),
            federal_label: FEDERAL_JURISDICTION.to_string(),
            score_federal: true,
            ranking_size: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tiers.validate()?;
        if self.federal_label.trim().is_empty() {
            return Err(ConfigError::BlankFederalLabel);
        }
        Ok(())
    }

    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}
