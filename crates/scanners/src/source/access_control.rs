//! Missing access control detector
//!
//! Walks every contract (and free functions at file level) and reports
//! externally reachable, non-constructor functions that assign to something
//! without either an access-control modifier or a
//! `require(msg.sender == ...)` style guard in their body.

use crate::ast::{visit, FunctionDefinition, Node, NodeKind, Visitor};
use crate::core::{Detector, DetectorFault, DetectorId, Finding, Severity};

const ACCESS_CONTROL_MODIFIERS: [&str; 3] = ["onlyOwner", "onlyAdmin", "onlyRole"];

const OWNER_VARIABLES: [&str; 2] = ["owner", "_owner"];

pub struct AccessControlDetector;

impl AccessControlDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AccessControlDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for AccessControlDetector {
    fn id(&self) -> DetectorId {
        DetectorId::AccessControl
    }

    fn name(&self) -> &'static str {
        "Access Control Detector"
    }

    fn description(&self) -> &'static str {
        "Detects public state-changing functions with no owner/admin/role guard"
    }

    fn severity(&self) -> Severity {
        Severity::High
    }

    fn detect(&self, tree: &Node, _source: &str) -> Result<Vec<Finding>, DetectorFault> {
        let mut contracts = ContractWalker::default();
        visit(tree, &mut contracts);

        match contracts.fault {
            Some(fault) => Err(fault),
            None => Ok(contracts.findings),
        }
    }
}

/// Per-contract facts gathered alongside the checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFacts {
    pub name: String,
    /// Declares an `owner` / `_owner` state variable. Gathered, not used in
    /// the emit decision.
    pub has_owner_variable: bool,
}

impl ContractFacts {
    pub fn from_members(name: &str, sub_nodes: &[Node]) -> Self {
        let has_owner_variable = sub_nodes.iter().any(|member| {
            matches!(
                &member.kind,
                NodeKind::VariableDeclaration { name, .. } if OWNER_VARIABLES.contains(&name.as_str())
            )
        });

        Self {
            name: name.to_string(),
            has_owner_variable,
        }
    }
}

/// Facts for every contract in the tree, in source order.
pub fn contract_facts(tree: &Node) -> Vec<ContractFacts> {
    let mut walker = ContractWalker::default();
    visit(tree, &mut walker);
    walker.facts
}

#[derive(Default)]
struct ContractWalker {
    findings: Vec<Finding>,
    facts: Vec<ContractFacts>,
    fault: Option<DetectorFault>,
}

impl ContractWalker {
    fn check_members(&mut self, members: &[Node]) {
        for member in members {
            let Some(function) = member.as_function() else {
                continue;
            };
            if self.fault.is_some() {
                return;
            }
            match check_function(member, function) {
                Ok(Some(finding)) => self.findings.push(finding),
                Ok(None) => {}
                Err(fault) => self.fault = Some(fault),
            }
        }
    }
}

impl Visitor for ContractWalker {
    fn visit_source_unit(&mut self, node: &Node) {
        if let NodeKind::SourceUnit { children } = &node.kind {
            self.check_members(children);
        }
    }

    fn visit_contract_definition(&mut self, _node: &Node, name: &str, sub_nodes: &[Node]) {
        let facts = ContractFacts::from_members(name, sub_nodes);
        tracing::trace!(
            contract = name,
            has_owner_variable = facts.has_owner_variable,
            "access control facts"
        );
        self.facts.push(facts);
        self.check_members(sub_nodes);
    }
}

fn check_function(
    node: &Node,
    function: &FunctionDefinition,
) -> Result<Option<Finding>, DetectorFault> {
    if function.is_constructor || !function.visibility.is_callable_externally() {
        return Ok(None);
    }

    let modifies_state = contains_assignment(node);
    let has_access_control = has_guard_modifier(function)? || has_sender_check(node);

    if !modifies_state || has_access_control {
        return Ok(None);
    }

    let name = function.display_name();
    Ok(Some(
        Finding::new(
            DetectorId::AccessControl,
            Severity::High,
            "Missing access control",
            format!(
                "Function {} modifies state but doesn't have access control checks.",
                name
            ),
            node.line(),
        )
        .with_function(name),
    ))
}

fn has_guard_modifier(function: &FunctionDefinition) -> Result<bool, DetectorFault> {
    for modifier in &function.modifiers {
        let NodeKind::ModifierInvocation { name, .. } = &modifier.kind else {
            return Err(DetectorFault::new(
                format!("{:?}", modifier.node_type()),
                modifier.line(),
                format!(
                    "modifier list of {} holds a non-modifier node",
                    function.display_name()
                ),
            ));
        };
        if ACCESS_CONTROL_MODIFIERS
            .iter()
            .any(|guard| name.contains(guard))
        {
            return Ok(true);
        }
    }
    Ok(false)
}

fn contains_assignment(function: &Node) -> bool {
    #[derive(Default)]
    struct AnyAssignment(bool);

    impl Visitor for AnyAssignment {
        fn visit_assignment(&mut self, _: &Node, _: &str, _: &Node, _: &Node) {
            self.0 = true;
        }
    }

    let mut finder = AnyAssignment::default();
    visit(function, &mut finder);
    finder.0
}

/// `require(msg.sender == x)` or `require(x != msg.sender)` anywhere in the body.
fn has_sender_check(function: &Node) -> bool {
    #[derive(Default)]
    struct SenderCheck(bool);

    impl Visitor for SenderCheck {
        fn visit_function_call(&mut self, _: &Node, expression: &Node, arguments: &[Node]) {
            if expression.identifier_name() != Some("require") {
                return;
            }
            if let Some(NodeKind::BinaryOperation {
                operator,
                left,
                right,
            }) = arguments.first().map(|arg| &arg.kind)
            {
                if matches!(operator.as_str(), "==" | "!=")
                    && (left.is_msg_sender() || right.is_msg_sender())
                {
                    self.0 = true;
                }
            }
        }
    }

    let mut check = SenderCheck::default();
    visit(function, &mut check);
    check.0
}
