//! Optional narrative enhancement of a finished report.
//!
//! A [`NarrativeAnalyzer`] turns contract source into free-form prose. The
//! pipeline attaches the result with [`crate::report::Report::enhance`]; a
//! failing analyzer never aborts an audit.

pub mod file;
pub mod mock;

pub use file::FileNarrativeAnalyzer;
pub use mock::MockNarrativeAnalyzer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid narrative payload: {0}")]
    InvalidPayload(String),

    #[error("narrative analyzer failed: {0}")]
    Analyzer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingTime {
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeAnalysis {
    pub analysis: String,
    pub model: String,
    #[serde(default)]
    pub processing_time: ProcessingTime,
}

#[async_trait]
pub trait NarrativeAnalyzer: Send + Sync {
    async fn analyze(&self, source: &str) -> Result<NarrativeAnalysis, NarrativeError>;

    fn model_name(&self) -> &str;
}
