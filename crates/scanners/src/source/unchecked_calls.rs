use crate::ast::{visit, Node, Visitor};
use crate::core::{DetectorFault, DetectorId, Finding, Severity};
use crate::impl_detector;

const LOW_LEVEL_CALLS: [&str; 2] = ["call", "send"];

/// Flags every low-level `call` / `send`.
///
/// Whether the returned success flag is consumed is not inspected: every
/// matching call is reported, including ones wrapped in `require`.
pub struct UncheckedCallDetector;

impl UncheckedCallDetector {
    pub fn new() -> Self {
        Self
    }

    fn detect_impl(&self, tree: &Node, _source: &str) -> Result<Vec<Finding>, DetectorFault> {
        let mut calls = LowLevelCalls::default();
        visit(tree, &mut calls);
        Ok(calls.findings)
    }
}

impl Default for UncheckedCallDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl_detector!(
    UncheckedCallDetector,
    id: DetectorId::UncheckedCall,
    name: "Unchecked External Call Detector",
    severity: Severity::Medium,
    description: "Detects low-level call/send whose return value may be ignored"
);

#[derive(Default)]
struct LowLevelCalls {
    findings: Vec<Finding>,
}

impl Visitor for LowLevelCalls {
    fn visit_function_call(&mut self, node: &Node, expression: &Node, _arguments: &[Node]) {
        let Some(member) = expression.member_name() else {
            return;
        };
        if !LOW_LEVEL_CALLS.contains(&member) {
            return;
        }

        self.findings.push(Finding::new(
            DetectorId::UncheckedCall,
            Severity::Medium,
            "Unchecked return value from external call",
            format!(
                "Return value from {} is not checked, which could lead to silent failures.",
                member
            ),
            node.line(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::Visibility;
    use crate::core::Detector;

    #[test]
    fn test_call_and_send_flagged() {
        let tree = contract(
            1,
            "Wallet",
            vec![function(
                2,
                "pay",
                Visibility::External,
                vec![],
                vec![
                    member_call(3, 8, "to", "call", vec![literal(3, 16, "\"\"")]),
                    member_call(4, 8, "to", "send", vec![literal(4, 16, "1")]),
                    member_call(5, 8, "to", "transfer", vec![literal(5, 20, "1")]),
                ],
            )],
        );

        let findings = UncheckedCallDetector::new().detect(&tree, "").unwrap();

        let lines: Vec<usize> = findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert!(findings[1].details.contains("send"));
    }

    #[test]
    fn test_required_call_still_flagged() {
        let tree = function(
            1,
            "pay",
            Visibility::Public,
            vec![],
            vec![require(2, 8, member_call(2, 16, "to", "send", vec![]))],
        );

        let findings = UncheckedCallDetector::new().detect(&tree, "").unwrap();
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_plain_function_call_ignored() {
        let tree = call(1, 0, ident(1, 0, "call"), vec![]);
        let findings = UncheckedCallDetector::new().detect(&tree, "").unwrap();
        assert!(findings.is_empty());
    }
}
