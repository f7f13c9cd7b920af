use crate::narrative::{NarrativeAnalysis, NarrativeAnalyzer, NarrativeError, ProcessingTime};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Serves an analysis produced ahead of time by an external tool.
///
/// A `.json` file must hold a full [`NarrativeAnalysis`] payload. Any other
/// file is taken as plain analysis text under the model name `file`.
pub struct FileNarrativeAnalyzer {
    path: PathBuf,
}

impl FileNarrativeAnalyzer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path.extension().and_then(|e| e.to_str()) == Some("json")
    }
}

#[async_trait]
impl NarrativeAnalyzer for FileNarrativeAnalyzer {
    async fn analyze(&self, _source: &str) -> Result<NarrativeAnalysis, NarrativeError> {
        let started = Instant::now();

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            NarrativeError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;

        if self.is_json() {
            return serde_json::from_str(&content)
                .map_err(|e| NarrativeError::InvalidPayload(e.to_string()));
        }

        let analysis = content.trim();
        if analysis.is_empty() {
            return Err(NarrativeError::InvalidPayload(format!(
                "{} is empty",
                self.path.display()
            )));
        }

        Ok(NarrativeAnalysis {
            analysis: analysis.to_string(),
            model: self.model_name().to_string(),
            processing_time: ProcessingTime {
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
        })
    }

    fn model_name(&self) -> &str {
        "file"
    }
}
