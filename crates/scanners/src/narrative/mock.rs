use crate::narrative::{NarrativeAnalysis, NarrativeAnalyzer, NarrativeError, ProcessingTime};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct MockNarrativeAnalyzer {
    response: String,
    call_count: AtomicUsize,
    should_fail: bool,
}

impl Default for MockNarrativeAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNarrativeAnalyzer {
    pub fn new() -> Self {
        Self::with_response("No additional concerns beyond the reported findings.")
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            call_count: AtomicUsize::new(0),
            should_fail: false,
        }
    }

    pub fn failing() -> Self {
        let mut analyzer = Self::new();
        analyzer.should_fail = true;
        analyzer
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeAnalyzer for MockNarrativeAnalyzer {
    async fn analyze(&self, _source: &str) -> Result<NarrativeAnalysis, NarrativeError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(NarrativeError::Analyzer("mock analyzer failure".to_string()));
        }

        Ok(NarrativeAnalysis {
            analysis: self.response.clone(),
            model: self.model_name().to_string(),
            processing_time: ProcessingTime::default(),
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
