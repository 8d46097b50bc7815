use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("input dataset contains no bill records")]
    EmptyDataset,

    #[error("no passed, relevant bills among {records} records")]
    EmptySubset { records: usize },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("keyword table error: {0}")]
    Keyword(#[from] billscope_core::KeywordError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
