//! Lowering of the tree-sitter Solidity grammar into [`crate::ast::Node`].
//!
//! Only the shapes detectors reason about get typed variants. Grammar
//! wrapper nodes (`expression`, `expression_statement`, `call_argument`,
//! parentheses) are unwrapped when they hold a single child; comments are
//! dropped; every other construct keeps its grammar kind in
//! [`NodeKind::Other`] so traversal still reaches its children.

use crate::ast::{FunctionDefinition, Node, NodeKind, SourceLocation, Visibility};
use crate::core::{AuditError, Result};
use tree_sitter::{Node as TsNode, Parser};

const WRAPPER_KINDS: [&str; 4] = [
    "expression",
    "expression_statement",
    "call_argument",
    "parenthesized_expression",
];

/// Parse Solidity source into a typed tree. Any syntax error in the input
/// is reported with the position of the first erroneous node.
pub fn parse_source(source: &str) -> Result<Node> {
    let mut parser = Parser::new();
    let language = tree_sitter_solidity::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| AuditError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| AuditError::Grammar("parser produced no tree".to_string()))?;
    let root = tree.root_node();

    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        let loc = location(bad);
        let message = if bad.is_missing() {
            format!("missing {}", bad.kind())
        } else {
            let text: String = source[bad.byte_range()].chars().take(40).collect();
            format!("unexpected `{}`", text.trim())
        };
        return Err(parse_error(loc.line, loc.column, message));
    }

    let tree = Lowering { source }.lower(root);
    tracing::debug!(nodes = count_nodes(&tree), "source lowered");
    Ok(tree)
}

fn parse_error(line: usize, column: usize, message: impl Into<String>) -> AuditError {
    AuditError::Parse {
        line,
        column,
        message: message.into(),
    }
}

fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn location(node: TsNode<'_>) -> SourceLocation {
    let start = node.start_position();
    SourceLocation::new(start.row + 1, start.column)
}

fn count_nodes(node: &Node) -> usize {
    1 + node.children().into_iter().map(count_nodes).sum::<usize>()
}

fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn children_of_kind<'t>(node: TsNode<'t>, kind: &str) -> Vec<TsNode<'t>> {
    named_children(node)
        .into_iter()
        .filter(|child| child.kind() == kind)
        .collect()
}

/// Strip `expression` wrappers around a single child.
fn unwrap_expression(mut node: TsNode<'_>) -> TsNode<'_> {
    while node.kind() == "expression" {
        match named_children(node).as_slice() {
            [only] => node = *only,
            _ => break,
        }
    }
    node
}

struct Lowering<'a> {
    source: &'a str,
}

impl<'a> Lowering<'a> {
    fn text(&self, node: TsNode<'_>) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn field_text(&self, node: TsNode<'_>, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|n| self.text(n).trim().to_string())
    }

    fn lower_all(&self, nodes: Vec<TsNode<'_>>) -> Vec<Node> {
        nodes.into_iter().map(|n| self.lower(n)).collect()
    }

    fn lower_children(&self, node: TsNode<'_>) -> Vec<Node> {
        self.lower_all(named_children(node))
    }

    fn lower_field(&self, node: TsNode<'_>, field: &str) -> Option<Box<Node>> {
        node.child_by_field_name(field)
            .map(|n| Box::new(self.lower(n)))
    }

    fn lower(&self, node: TsNode<'_>) -> Node {
        let kind = node.kind();

        if WRAPPER_KINDS.contains(&kind) {
            if let [only] = named_children(node).as_slice() {
                return self.lower(*only);
            }
        }

        let lowered = match kind {
            "source_file" => Some(NodeKind::SourceUnit {
                children: self.lower_children(node),
            }),
            "pragma_directive" => Some(self.pragma(node)),
            "contract_declaration" | "library_declaration" | "interface_declaration" => {
                Some(self.contract(node))
            }
            "function_definition" | "constructor_definition" | "fallback_receive_definition" => {
                Some(NodeKind::FunctionDefinition(self.function(node)))
            }
            "modifier_definition" => Some(NodeKind::ModifierDefinition {
                name: self.field_text(node, "name").unwrap_or_default(),
                body: self.lower_field(node, "body"),
            }),
            "modifier_invocation" => Some(self.modifier_invocation(node)),
            "state_variable_declaration" => self.variable(node, node, true),
            "variable_declaration_statement" => children_of_kind(node, "variable_declaration")
                .first()
                .and_then(|decl| self.variable(*decl, node, false)),
            "parameter" => self.variable(node, node, false),
            "function_body" | "block_statement" | "unchecked_block" => Some(NodeKind::Block {
                statements: self.lower_children(node),
            }),
            "binary_expression" => self.binary(node),
            "assignment_expression" | "augmented_assignment_expression" => self.assignment(node),
            "call_expression" => self.call(node),
            "member_expression" => self.member(node),
            "identifier" => Some(NodeKind::Identifier {
                name: self.text(node).to_string(),
            }),
            k if k.ends_with("_literal") => Some(NodeKind::Literal {
                value: self.text(node).to_string(),
            }),
            _ => None,
        };

        let kind = lowered.unwrap_or_else(|| NodeKind::Other {
            kind: kind.to_string(),
            children: self.lower_children(node),
        });
        Node::new(location(node), kind)
    }

    fn pragma(&self, node: TsNode<'_>) -> NodeKind {
        let text = self.text(node).trim();
        let body = text
            .strip_prefix("pragma")
            .unwrap_or(text)
            .trim()
            .trim_end_matches(';')
            .trim();
        let (name, value) = body.split_once(char::is_whitespace).unwrap_or((body, ""));

        NodeKind::PragmaDirective {
            name: name.to_string(),
            value: value.trim().to_string(),
        }
    }

    fn contract(&self, node: TsNode<'_>) -> NodeKind {
        let sub_nodes = node
            .child_by_field_name("body")
            .map(|body| self.lower_children(body))
            .unwrap_or_default();

        NodeKind::ContractDefinition {
            name: self.field_text(node, "name").unwrap_or_default(),
            sub_nodes,
        }
    }

    fn function(&self, node: TsNode<'_>) -> FunctionDefinition {
        let mut visibility = Visibility::Default;
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(
                child.kind(),
                "visibility" | "public" | "private" | "internal" | "external"
            ) {
                visibility = Visibility::from_keyword(self.text(child));
                break;
            }
        }

        let name = match node.kind() {
            "fallback_receive_definition" => Some(self.special_function_name(node).to_string()),
            _ => self.field_text(node, "name"),
        };

        FunctionDefinition {
            name,
            visibility,
            is_constructor: node.kind() == "constructor_definition",
            parameters: self.lower_all(children_of_kind(node, "parameter")),
            modifiers: self.lower_all(children_of_kind(node, "modifier_invocation")),
            body: self.lower_field(node, "body"),
        }
    }

    /// `receive` or `fallback`, from the leading keyword.
    fn special_function_name(&self, node: TsNode<'_>) -> &'static str {
        if self.text(node).trim_start().starts_with("receive") {
            "receive"
        } else {
            "fallback"
        }
    }

    fn modifier_invocation(&self, node: TsNode<'_>) -> NodeKind {
        let children = named_children(node);
        let name = children
            .iter()
            .find(|child| child.kind() == "identifier")
            .map(|ident| self.text(*ident).to_string())
            .unwrap_or_else(|| {
                let text = self.text(node);
                text.split('(').next().unwrap_or(text).trim().to_string()
            });
        let arguments = children
            .into_iter()
            .filter(|child| child.kind() == "call_argument")
            .collect();

        NodeKind::ModifierInvocation {
            name,
            arguments: self.lower_all(arguments),
        }
    }

    /// `decl` carries the name and type fields, `holder` the initializer.
    fn variable(
        &self,
        decl: TsNode<'_>,
        holder: TsNode<'_>,
        is_state_var: bool,
    ) -> Option<NodeKind> {
        Some(NodeKind::VariableDeclaration {
            name: self.field_text(decl, "name")?,
            type_name: self.field_text(decl, "type"),
            is_state_var,
            initial_value: self.lower_field(holder, "value"),
        })
    }

    fn binary(&self, node: TsNode<'_>) -> Option<NodeKind> {
        let operator = match node.child_by_field_name("operator") {
            Some(op) => self.text(op).to_string(),
            None => self.first_anonymous(node)?,
        };

        Some(NodeKind::BinaryOperation {
            operator,
            left: self.lower_field(node, "left")?,
            right: self.lower_field(node, "right")?,
        })
    }

    fn assignment(&self, node: TsNode<'_>) -> Option<NodeKind> {
        let mut operator = "=".to_string();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if !child.is_named() && child.kind().ends_with('=') {
                operator = child.kind().to_string();
                break;
            }
        }

        Some(NodeKind::Assignment {
            operator,
            left: self.lower_field(node, "left")?,
            right: self.lower_field(node, "right")?,
        })
    }

    fn call(&self, node: TsNode<'_>) -> Option<NodeKind> {
        let callee = unwrap_expression(node.child_by_field_name("function")?);
        let arguments = self.lower_all(children_of_kind(node, "call_argument"));

        // `target.call{value: v}(..)`: the options block wraps the callee.
        if callee.kind() == "struct_expression" {
            let target = callee.child_by_field_name("type")?;
            return Some(NodeKind::FunctionCall {
                expression: Box::new(self.lower(target)),
                options: self.lower_all(children_of_kind(callee, "struct_field_assignment")),
                arguments,
            });
        }

        Some(NodeKind::FunctionCall {
            expression: Box::new(self.lower(callee)),
            options: Vec::new(),
            arguments,
        })
    }

    fn member(&self, node: TsNode<'_>) -> Option<NodeKind> {
        Some(NodeKind::MemberAccess {
            expression: self.lower_field(node, "object")?,
            member_name: self.field_text(node, "property")?,
        })
    }

    fn first_anonymous(&self, node: TsNode<'_>) -> Option<String> {
        let mut cursor = node.walk();
        let operator = node
            .children(&mut cursor)
            .find(|child| !child.is_named() && !matches!(child.kind(), "(" | ")"))
            .map(|child| self.text(child).to_string());
        operator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{visit, Visitor};

    #[derive(Default)]
    struct Inventory {
        contracts: Vec<String>,
        functions: Vec<(String, Visibility, usize)>,
        modifiers: Vec<String>,
        members: Vec<String>,
        assignments: Vec<String>,
        pragmas: Vec<String>,
    }

    impl Visitor for Inventory {
        fn visit_pragma_directive(&mut self, _: &Node, value: &str) {
            self.pragmas.push(value.to_string());
        }

        fn visit_contract_definition(&mut self, _: &Node, name: &str, _: &[Node]) {
            self.contracts.push(name.to_string());
        }

        fn visit_function_definition(&mut self, node: &Node, function: &FunctionDefinition) {
            self.functions.push((
                function.display_name().to_string(),
                function.visibility,
                node.line(),
            ));
        }

        fn visit_modifier_invocation(&mut self, _: &Node, name: &str) {
            self.modifiers.push(name.to_string());
        }

        fn visit_member_access(&mut self, _: &Node, _: &Node, member: &str) {
            self.members.push(member.to_string());
        }

        fn visit_assignment(&mut self, _: &Node, operator: &str, _: &Node, _: &Node) {
            self.assignments.push(operator.to_string());
        }
    }

    fn inventory(source: &str) -> Inventory {
        let tree = parse_source(source).unwrap();
        let mut inventory = Inventory::default();
        visit(&tree, &mut inventory);
        inventory
    }

    const BANK: &str = r#"pragma solidity ^0.7.0;

contract Bank {
    address owner;
    mapping(address => uint) balances;

    function withdraw(uint amount) public onlyOwner {
        msg.sender.call{value: amount}("");
        balances[msg.sender] -= amount;
    }

    function _helper() internal {}
}
"#;

    #[test]
    fn test_contract_and_functions_lowered() {
        let found = inventory(BANK);

        assert_eq!(found.contracts, vec!["Bank"]);
        assert_eq!(found.pragmas, vec!["^0.7.0"]);
        assert_eq!(
            found.functions,
            vec![
                ("withdraw".to_string(), Visibility::Public, 7),
                ("_helper".to_string(), Visibility::Internal, 12),
            ]
        );
        assert_eq!(found.modifiers, vec!["onlyOwner"]);
    }

    #[test]
    fn test_call_and_compound_assignment_lowered() {
        let found = inventory(BANK);

        assert!(found.members.contains(&"call".to_string()));
        assert!(found.members.contains(&"sender".to_string()));
        assert!(found.assignments.contains(&"-=".to_string()));
    }

    #[test]
    fn test_root_is_source_unit() {
        let tree = parse_source("contract Empty {}").unwrap();
        assert_eq!(tree.node_type(), crate::ast::NodeType::SourceUnit);
        assert_eq!(tree.children().len(), 1);
    }

    #[test]
    fn test_receive_and_fallback_named() {
        let found = inventory(
            "contract Wallet {\n    receive() external payable {}\n    fallback() external {}\n}\n",
        );
        let names: Vec<(&str, usize)> = found
            .functions
            .iter()
            .map(|(name, _, line)| (name.as_str(), *line))
            .collect();

        assert_eq!(names, vec![("receive", 2), ("fallback", 3)]);
    }

    #[test]
    fn test_grammar_loads() {
        let tree = parse_source("pragma solidity ^0.8.0;\ncontract A {}\n");
        assert!(
            !matches!(tree, Err(AuditError::Grammar(_))),
            "grammar failed to load: {:?}",
            tree.err()
        );
    }

    #[test]
    fn test_syntax_error_reported() {
        let err = parse_source("contract Broken {\n    function f( public {\n").unwrap_err();
        assert!(matches!(err, AuditError::Parse { line, .. } if line >= 1));
    }
}
