use crate::ast::Node;
use crate::core::{AuditConfig, AuditError, DetectorId, Finding, Result, Severity};
use crate::report::Report;
use crate::runner::{AuditObserver, DetectorRegistry, TracingObserver};
use serde::Serialize;
use std::sync::Arc;

/// Runs the enabled detectors over one tree and builds the report.
pub struct AuditEngine {
    registry: DetectorRegistry,
    config: AuditConfig,
    observer: Arc<dyn AuditObserver>,
}

/// Outcome of one audit: the combined findings in production order and the
/// report categorized from them.
#[derive(Debug, Clone)]
pub struct AuditRun {
    pub findings: Vec<Finding>,
    pub report: Report,
}

#[derive(Debug, Clone, Serialize)]
pub struct DetectorInfo {
    pub id: DetectorId,
    pub name: String,
    pub description: String,
    pub severity: Severity,
}

impl AuditEngine {
    pub fn new(config: AuditConfig) -> Self {
        Self {
            registry: DetectorRegistry::builtin(),
            config,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_registry(mut self, registry: DetectorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn AuditObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Enabled detectors run one after another in registration order. Their
    /// outputs are concatenated without reordering.
    pub fn run(&self, tree: &Node, source: &str) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for detector in self.registry.selected(&self.config.enabled_detectors) {
            let id = detector.id();
            self.observer.detector_started(id);

            match detector.detect(tree, source) {
                Ok(found) => {
                    self.observer.detector_finished(id, found.len());
                    findings.extend(found);
                }
                Err(fault) => {
                    self.observer.detector_failed(id, &fault);
                    if !self.config.isolate_detector_faults {
                        return Err(AuditError::Detector {
                            detector: id,
                            fault,
                        });
                    }
                    findings.push(Finding::new(
                        DetectorId::DetectorError,
                        Severity::Low,
                        format!("Detector {} failed", id),
                        fault.to_string(),
                        fault.line,
                    ));
                }
            }
        }

        Ok(findings)
    }

    pub fn build_report(&self, contract_path: &str, findings: &[Finding]) -> Report {
        let report = Report::build(contract_path, findings);
        self.observer.report_built(&report);
        report
    }

    pub fn audit(&self, contract_path: &str, tree: &Node, source: &str) -> Result<AuditRun> {
        let findings = self.run(tree, source)?;
        let report = self.build_report(contract_path, &findings);
        Ok(AuditRun { findings, report })
    }

    pub fn list_detectors(&self) -> Vec<DetectorInfo> {
        self.registry
            .all()
            .iter()
            .map(|d| DetectorInfo {
                id: d.id(),
                name: d.name().to_string(),
                description: d.description().to_string(),
                severity: d.severity(),
            })
            .collect()
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new(AuditConfig::default())
    }
}
