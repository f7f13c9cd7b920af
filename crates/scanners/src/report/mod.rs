//! Report aggregation
//!
//! A [`Report`] is built once per audit from the combined finding list. The
//! findings are split into severity buckets by a single stable pass (a
//! partition, not a sort), so within each bucket the production order of
//! the engine is kept. Reports are never mutated afterwards; attaching a
//! narrative analysis returns a new value.

pub mod generator;

pub use generator::{OutputFormat, ReportGenerator};

use crate::core::{DetectorId, Finding, Severity};
use crate::narrative::NarrativeAnalysis;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeverityBuckets {
    pub high: Vec<Finding>,
    pub medium: Vec<Finding>,
    pub low: Vec<Finding>,
    pub informational: Vec<Finding>,
}

impl SeverityBuckets {
    pub fn partition(findings: &[Finding]) -> Self {
        let mut buckets = Self::default();
        for finding in findings {
            buckets.bucket_mut(finding.severity).push(finding.clone());
        }
        buckets
    }

    pub fn get(&self, severity: Severity) -> &[Finding] {
        match severity {
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
            Severity::Informational => &self.informational,
        }
    }

    fn bucket_mut(&mut self, severity: Severity) -> &mut Vec<Finding> {
        match severity {
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
            Severity::Informational => &mut self.informational,
        }
    }

    /// High to informational, bucket order preserved.
    pub fn iter(&self) -> impl Iterator<Item = &Finding> {
        Severity::ALL.into_iter().flat_map(move |s| self.get(s).iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub informational: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Informational => self.informational,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.informational
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub severity_counts: SeverityCounts,
    /// Only detectors with at least one finding appear.
    pub detector_counts: BTreeMap<DetectorId, usize>,
}

impl ReportSummary {
    fn from_buckets(buckets: &SeverityBuckets, findings: &[Finding]) -> Self {
        let severity_counts = SeverityCounts {
            high: buckets.high.len(),
            medium: buckets.medium.len(),
            low: buckets.low.len(),
            informational: buckets.informational.len(),
        };

        let mut detector_counts = BTreeMap::new();
        for finding in findings {
            *detector_counts.entry(finding.detector).or_insert(0) += 1;
        }

        Self {
            severity_counts,
            detector_counts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeEnhancement {
    pub analysis: NarrativeAnalysis,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    contract_path: String,
    timestamp: DateTime<Utc>,
    issue_count: usize,
    #[serde(rename = "issues")]
    issues_by_severity: SeverityBuckets,
    summary: ReportSummary,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    ai: Option<NarrativeEnhancement>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    ai_error: Option<String>,
}

impl Report {
    pub fn build(contract_path: impl Into<String>, findings: &[Finding]) -> Self {
        Self::build_at(contract_path, findings, Utc::now())
    }

    pub fn build_at(
        contract_path: impl Into<String>,
        findings: &[Finding],
        timestamp: DateTime<Utc>,
    ) -> Self {
        let issues_by_severity = SeverityBuckets::partition(findings);
        let summary = ReportSummary::from_buckets(&issues_by_severity, findings);

        Self {
            contract_path: contract_path.into(),
            timestamp,
            issue_count: findings.len(),
            issues_by_severity,
            summary,
            ai: None,
            ai_error: None,
        }
    }

    /// Copy of this report with `analysis` attached. A second call on the
    /// result replaces the attachment.
    pub fn enhance(&self, analysis: NarrativeAnalysis) -> Self {
        Self {
            ai: Some(NarrativeEnhancement {
                analysis,
                timestamp: Utc::now(),
            }),
            ..self.clone()
        }
    }

    /// Copy of this report marking that the narrative step failed.
    pub fn with_enhancement_error(&self, message: impl Into<String>) -> Self {
        Self {
            ai_error: Some(message.into()),
            ..self.clone()
        }
    }

    pub fn contract_path(&self) -> &str {
        &self.contract_path
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn issue_count(&self) -> usize {
        self.issue_count
    }

    pub fn issues_by_severity(&self) -> &SeverityBuckets {
        &self.issues_by_severity
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    pub fn ai(&self) -> Option<&NarrativeEnhancement> {
        self.ai.as_ref()
    }

    pub fn ai_error(&self) -> Option<&str> {
        self.ai_error.as_deref()
    }

    pub fn findings_for(&self, severity: Severity) -> &[Finding] {
        self.issues_by_severity.get(severity)
    }

    pub fn count_for(&self, detector: DetectorId) -> usize {
        self.summary
            .detector_counts
            .get(&detector)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_clean(&self) -> bool {
        self.issue_count == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
