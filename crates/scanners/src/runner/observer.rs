use crate::core::{DetectorFault, DetectorId};
use crate::report::Report;

/// Lifecycle callbacks fired by [`crate::runner::AuditEngine`].
#[allow(unused_variables)]
pub trait AuditObserver: Send + Sync {
    fn detector_started(&self, detector: DetectorId) {}

    fn detector_finished(&self, detector: DetectorId, findings: usize) {}

    fn detector_failed(&self, detector: DetectorId, fault: &DetectorFault) {}

    fn report_built(&self, report: &Report) {}
}

/// Forwards lifecycle events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AuditObserver for TracingObserver {
    fn detector_started(&self, detector: DetectorId) {
        tracing::debug!(%detector, "running detector");
    }

    fn detector_finished(&self, detector: DetectorId, findings: usize) {
        tracing::debug!(%detector, findings, "detector finished");
    }

    fn detector_failed(&self, detector: DetectorId, fault: &DetectorFault) {
        tracing::warn!(%detector, %fault, "detector failed");
    }

    fn report_built(&self, report: &Report) {
        tracing::info!(
            contract = report.contract_path(),
            issues = report.issue_count(),
            "report built"
        );
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl AuditObserver for NoopObserver {}
