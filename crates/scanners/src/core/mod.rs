//! Core abstractions shared by every detector
//!
//! The `Detector` trait is the seam all heuristics implement; findings,
//! severities and detector ids are the value types they produce. Typed errors
//! and the audit configuration live here too so the runner and the pipeline
//! agree on them.

pub mod context;
pub mod error;
pub mod result;
pub mod scanner;
pub mod severity;

pub use context::{parse_detector_list, AuditConfig, NarrativeSettings};
pub use error::{AuditError, DetectorFault, Result};
pub use result::{DetectorId, Finding, Position};
pub use scanner::Detector;
pub use severity::Severity;
