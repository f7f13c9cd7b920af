use crate::analysis::has_arithmetic_protection;
use crate::ast::{compound_arithmetic, visit, Node, Visitor};
use crate::core::{Detector, DetectorFault, DetectorId, Finding, Severity};

const UNCHECKED_OPERATORS: [&str; 3] = ["+", "-", "*"];

/// Flags every `+`, `-`, `*` (and their compound assignments) in sources that
/// neither mention SafeMath nor pin the compiler to 0.8.
pub struct OverflowUnderflowDetector;

impl OverflowUnderflowDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OverflowUnderflowDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for OverflowUnderflowDetector {
    fn id(&self) -> DetectorId {
        DetectorId::OverflowUnderflow
    }

    fn name(&self) -> &'static str {
        "Arithmetic Overflow/Underflow Detector"
    }

    fn description(&self) -> &'static str {
        "Detects unchecked +, - and * operations in contracts without SafeMath or Solidity 0.8+"
    }

    fn severity(&self) -> Severity {
        Severity::Medium
    }

    fn detect(&self, tree: &Node, source: &str) -> Result<Vec<Finding>, DetectorFault> {
        if has_arithmetic_protection(source) {
            tracing::debug!("arithmetic protected by SafeMath or 0.8 pragma, skipping walk");
            return Ok(Vec::new());
        }

        let mut operations = ArithmeticCollector::default();
        visit(tree, &mut operations);
        Ok(operations.findings)
    }
}

#[derive(Default)]
struct ArithmeticCollector {
    findings: Vec<Finding>,
}

impl ArithmeticCollector {
    fn record(&mut self, node: &Node, operator: &str) {
        self.findings.push(Finding::new(
            DetectorId::OverflowUnderflow,
            Severity::Medium,
            "Potential arithmetic overflow/underflow",
            format!(
                "Arithmetic operation {} without using SafeMath or Solidity 0.8+ \
                 could lead to overflow/underflow.",
                operator
            ),
            node.line(),
        ));
    }
}

impl Visitor for ArithmeticCollector {
    fn visit_binary_operation(&mut self, node: &Node, operator: &str, _left: &Node, _right: &Node) {
        if UNCHECKED_OPERATORS.contains(&operator) {
            self.record(node, operator);
        }
    }

    fn visit_assignment(&mut self, node: &Node, operator: &str, _left: &Node, _right: &Node) {
        if compound_arithmetic(operator).is_some_and(|base| UNCHECKED_OPERATORS.contains(&base)) {
            self.record(node, operator);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::*;
    use crate::ast::Visibility;

    fn tree_with(statements: Vec<Node>) -> Node {
        source_unit(vec![contract(
            2,
            "Token",
            vec![function(3, "mint", Visibility::Public, vec![], statements)],
        )])
    }

    fn add(line: usize) -> Node {
        binary(line, 16, "+", ident(line, 16, "a"), ident(line, 20, "b"))
    }

    #[test]
    fn test_each_operation_is_reported() {
        let tree = tree_with(vec![
            assign(4, 8, "=", ident(4, 8, "total"), add(4)),
            assign(
                5,
                8,
                "=",
                ident(5, 8, "x"),
                binary(5, 12, "*", ident(5, 12, "y"), add(5)),
            ),
        ]);

        let findings = OverflowUnderflowDetector::new()
            .detect(&tree, "pragma solidity ^0.7.6;")
            .unwrap();

        let lines: Vec<usize> = findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![4, 5, 5]);
        assert!(findings.iter().all(|f| f.severity == Severity::Medium));
    }

    #[test]
    fn test_non_arithmetic_operators_ignored() {
        let tree = tree_with(vec![
            binary(4, 8, "/", ident(4, 8, "a"), ident(4, 12, "b")),
            binary(5, 8, "==", ident(5, 8, "a"), ident(5, 12, "b")),
            assign(6, 8, "=", ident(6, 8, "a"), literal(6, 12, "1")),
        ]);

        let findings = OverflowUnderflowDetector::new().detect(&tree, "").unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_compound_assignment_reported() {
        let tree = tree_with(vec![assign(
            4,
            8,
            "-=",
            ident(4, 8, "balance"),
            ident(4, 19, "amt"),
        )]);

        let findings = OverflowUnderflowDetector::new().detect(&tree, "").unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].details.contains("-="));
    }

    #[test]
    fn test_short_circuit_ignores_tree() {
        let tree = tree_with(vec![add(4), add(5)]);
        let detector = OverflowUnderflowDetector::new();

        for source in [
            "using SafeMath for uint256;",
            "pragma solidity ^0.8.4;",
            "pragma solidity >=0.8.0 <0.9.0;",
        ] {
            assert!(detector.detect(&tree, source).unwrap().is_empty(), "{}", source);
        }
    }
}
