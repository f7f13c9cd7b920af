use crate::ast::{visit, FunctionDefinition, Node, Visitor};
use crate::core::{DetectorFault, DetectorId, Finding, Position, Severity};
use crate::impl_detector;

/// Members whose call hands control to another account.
const EXTERNAL_CALL_MEMBERS: [&str; 3] = ["call", "send", "transfer"];

/// Flags functions that assign after an external call.
///
/// Ordering comes from the pre-order walk: an assignment counts only when a
/// qualifying call appeared earlier in the same function, including calls
/// nested in branches or loops.
pub struct ReentrancyDetector;

impl ReentrancyDetector {
    pub fn new() -> Self {
        Self
    }

    fn detect_impl(&self, tree: &Node, _source: &str) -> Result<Vec<Finding>, DetectorFault> {
        let mut functions = FunctionCollector::default();
        visit(tree, &mut functions);
        Ok(functions.findings)
    }
}

impl Default for ReentrancyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl_detector!(
    ReentrancyDetector,
    id: DetectorId::Reentrancy,
    name: "Reentrancy Detector",
    severity: Severity::High,
    description: "Detects state changes that follow an external call (call, send, transfer)"
);

#[derive(Default)]
struct FunctionCollector {
    findings: Vec<Finding>,
}

impl Visitor for FunctionCollector {
    fn visit_function_definition(&mut self, node: &Node, function: &FunctionDefinition) {
        let mut body = CallThenWrite::default();
        visit(node, &mut body);

        if body.state_changes.is_empty() {
            return;
        }

        let name = function.display_name();
        tracing::debug!(
            function = name,
            state_changes = body.state_changes.len(),
            "state changes after external call"
        );

        self.findings.push(
            Finding::new(
                DetectorId::Reentrancy,
                Severity::High,
                "Potential reentrancy vulnerability detected. State changes after external call.",
                format!(
                    "Function {} makes external calls and then changes state. \
                     This pattern can lead to reentrancy attacks.",
                    name
                ),
                node.line(),
            )
            .with_function(name)
            .with_extra_locations(body.state_changes),
        );
    }
}

#[derive(Default)]
struct CallThenWrite {
    external_call_seen: bool,
    state_changes: Vec<Position>,
}

impl Visitor for CallThenWrite {
    fn visit_function_call(&mut self, _node: &Node, expression: &Node, _arguments: &[Node]) {
        if expression
            .member_name()
            .is_some_and(|member| EXTERNAL_CALL_MEMBERS.contains(&member))
        {
            self.external_call_seen = true;
        }
    }

    fn visit_assignment(&mut self, node: &Node, _operator: &str, _left: &Node, _right: &Node) {
        if self.external_call_seen {
            self.state_changes.push(node.loc.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::Visibility;
    use crate::core::Detector;

    fn withdraw(statements: Vec<Node>) -> Node {
        source_unit(vec![contract(
            1,
            "Bank",
            vec![function(3, "withdraw", Visibility::Public, vec![], statements)],
        )])
    }

    fn write(line: usize, target: &str) -> Node {
        assign(line, 8, "=", ident(line, 8, target), literal(line, 20, "0"))
    }

    #[test]
    fn test_write_after_call_is_flagged() {
        let tree = withdraw(vec![
            member_call(4, 8, "recipient", "call", vec![]),
            write(5, "balance"),
        ]);

        let findings = ReentrancyDetector::new().detect(&tree, "").unwrap();

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.line, 3);
        assert_eq!(finding.function.as_deref(), Some("withdraw"));
        assert_eq!(
            finding.extra_locations,
            Some(vec![Position { line: 5, column: 8 }])
        );
    }

    #[test]
    fn test_write_before_call_is_ignored() {
        let tree = withdraw(vec![
            write(4, "balance"),
            member_call(5, 8, "recipient", "transfer", vec![]),
        ]);

        let findings = ReentrancyDetector::new().detect(&tree, "").unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_only_writes_after_first_call_are_listed() {
        let tree = withdraw(vec![
            write(4, "before"),
            member_call(5, 8, "recipient", "send", vec![]),
            write(6, "first"),
            write(7, "second"),
        ]);

        let findings = ReentrancyDetector::new().detect(&tree, "").unwrap();
        let lines: Vec<usize> = findings[0]
            .extra_locations
            .as_ref()
            .unwrap()
            .iter()
            .map(|p| p.line)
            .collect();
        assert_eq!(lines, vec![6, 7]);
    }

    #[test]
    fn test_call_nested_in_branch_counts() {
        let tree = withdraw(vec![
            other(
                4,
                8,
                "if_statement",
                vec![member_call(5, 12, "recipient", "call", vec![])],
            ),
            write(7, "balance"),
        ]);

        let findings = ReentrancyDetector::new().detect(&tree, "").unwrap();
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn test_non_transfer_member_call_ignored() {
        let tree = withdraw(vec![
            member_call(4, 8, "token", "approve", vec![]),
            write(5, "balance"),
        ]);

        let findings = ReentrancyDetector::new().detect(&tree, "").unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_each_function_reported_separately() {
        let tree = source_unit(vec![contract(
            1,
            "Bank",
            vec![
                function(
                    2,
                    "a",
                    Visibility::Public,
                    vec![],
                    vec![member_call(3, 8, "x", "call", vec![]), write(4, "s")],
                ),
                function(6, "b", Visibility::Public, vec![], vec![write(7, "s")]),
                function(
                    9,
                    "c",
                    Visibility::Public,
                    vec![],
                    vec![member_call(10, 8, "y", "send", vec![]), write(11, "t")],
                ),
            ],
        )]);

        let findings = ReentrancyDetector::new().detect(&tree, "").unwrap();
        let names: Vec<_> = findings.iter().filter_map(|f| f.function.as_deref()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
