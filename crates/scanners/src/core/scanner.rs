//! Detector trait for pluggable vulnerability heuristics.
//!
//! Each detector is an independent, stateless unit: it receives the shared
//! read-only syntax tree plus the raw source text and returns its findings.
//! Detectors never see each other's output, so they are `Send + Sync` and can
//! be run for separate files on separate threads. Within one file the engine
//! runs them sequentially in registration order.
//!
//! Detectors fix the severity of what they emit. There is no scoring pass
//! afterwards.

use crate::ast::Node;
use crate::core::{DetectorFault, DetectorId, Finding, Severity};

pub trait Detector: Send + Sync {
    fn id(&self) -> DetectorId;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    /// Severity of the findings this detector emits.
    fn severity(&self) -> Severity;

    fn detect(&self, tree: &Node, source: &str) -> Result<Vec<Finding>, DetectorFault>;
}

#[macro_export]
macro_rules! impl_detector {
    (
        $detector:ty,
        id: $id:expr,
        name: $name:expr,
        severity: $severity:expr
        $(, description: $description:expr)?
    ) => {
        impl $crate::core::Detector for $detector {
            fn id(&self) -> $crate::core::DetectorId {
                $id
            }

            fn name(&self) -> &'static str {
                $name
            }

            fn severity(&self) -> $crate::core::Severity {
                $severity
            }

            $(
                fn description(&self) -> &'static str {
                    $description
                }
            )?

            fn detect(
                &self,
                tree: &$crate::ast::Node,
                source: &str,
            ) -> Result<Vec<$crate::core::Finding>, $crate::core::DetectorFault> {
                self.detect_impl(tree, source)
            }
        }
    };
}
