//! VeriSecure Scanners - heuristic vulnerability detection for Solidity
//!
//! A contract is parsed once into a typed syntax tree, a fixed set of
//! independent detectors walks it, and their findings are aggregated into an
//! immutable report with per-severity and per-detector statistics. An
//! optional narrative analysis can be attached afterwards without touching
//! the deterministic result.

pub mod analysis;
pub mod ast;
pub mod core;
pub mod narrative;
pub mod pipeline;
pub mod report;
pub mod representations;
pub mod runner;
pub mod source;

pub use crate::core::{AuditConfig, AuditError, Detector, DetectorId, Finding, Severity};

pub use ast::{visit, Node, NodeKind, Visitor};

pub use narrative::{NarrativeAnalysis, NarrativeAnalyzer, NarrativeError};

pub use pipeline::{audit_file, audit_files, audit_source, audit_with_narrative};

pub use report::{OutputFormat, Report, ReportGenerator};

pub use representations::parse_source;

pub use runner::{AuditEngine, AuditRun, DetectorRegistry};

pub use source::{
    AccessControlDetector, OverflowUnderflowDetector, ReentrancyDetector, UncheckedCallDetector,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registration() {
        let registry = DetectorRegistry::builtin();
        assert_eq!(registry.list_ids(), DetectorId::BUILTIN.to_vec());
    }
}
