//! Detector execution and orchestration
//!
//! The registry holds detectors in registration order; the engine runs them
//! one after another against the same tree, concatenates their findings and
//! reports progress to an injected observer instead of printing.

pub mod engine;
pub mod observer;
pub mod registry;

pub use engine::{AuditEngine, AuditRun, DetectorInfo};
pub use observer::{AuditObserver, NoopObserver, TracingObserver};
pub use registry::{DetectorRegistry, DetectorRegistryBuilder};
