//! Analysis layer: per-jurisdiction aggregation, consensus statistics, and the end-to-end pipeline.

pub mod aggregate;
pub mod bundle;
pub mod config;
mod error;
pub mod pipeline;
pub mod stats;

pub use aggregate::{JurisdictionScore, Tier, aggregate};
pub use bundle::StatisticsBundle;
pub use config::{AnalysisConfig, ConfigError, TierThresholds};
pub use error::AnalysisError;
pub use pipeline::Pipeline;
pub use stats::FederalStateRatio;
