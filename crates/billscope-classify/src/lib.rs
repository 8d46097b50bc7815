//! Classification layer: bill loading, keyword-based provision tagging, relevance filtering.

pub mod classifier;
pub mod filter;
pub mod loader;

pub use classifier::{ClassificationSummary, ClassifiedBill, TopicClassifier};
pub use filter::{AnalysisSubset, RelevanceFilter};
pub use loader::{BillLoader, ColumnMap, LoadError, LoadOutcome, LoadReport};
