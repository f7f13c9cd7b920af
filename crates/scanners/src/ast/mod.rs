//! Typed Solidity syntax tree consumed by the detectors
//!
//! The tree is produced once per audit (see [`crate::representations::source`])
//! and shared read-only by every detector and every nested traversal. Node
//! kinds the detectors reason about get their own variant with the fields
//! they need; everything else is carried as [`NodeKind::Other`] so the walker
//! can still descend into it.

pub mod walker;

pub use walker::{visit, Visitor};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 1-based line.
    pub line: usize,
    /// 0-based column.
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Default,
    Public,
    External,
    Internal,
    Private,
}

impl Visibility {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim() {
            "public" => Self::Public,
            "external" => Self::External,
            "internal" => Self::Internal,
            "private" => Self::Private,
            _ => Self::Default,
        }
    }

    /// Reachable by arbitrary callers.
    pub fn is_callable_externally(&self) -> bool {
        !matches!(self, Self::Internal | Self::Private)
    }
}

/// Kind tag used for handler dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    SourceUnit,
    PragmaDirective,
    ContractDefinition,
    FunctionDefinition,
    ModifierDefinition,
    ModifierInvocation,
    VariableDeclaration,
    Block,
    BinaryOperation,
    Assignment,
    FunctionCall,
    MemberAccess,
    Identifier,
    Literal,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: Option<String>,
    pub visibility: Visibility,
    pub is_constructor: bool,
    pub parameters: Vec<Node>,
    pub modifiers: Vec<Node>,
    pub body: Option<Box<Node>>,
}

impl FunctionDefinition {
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None if self.is_constructor => "constructor",
            None => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    SourceUnit {
        children: Vec<Node>,
    },
    PragmaDirective {
        name: String,
        value: String,
    },
    ContractDefinition {
        name: String,
        sub_nodes: Vec<Node>,
    },
    FunctionDefinition(FunctionDefinition),
    ModifierDefinition {
        name: String,
        body: Option<Box<Node>>,
    },
    ModifierInvocation {
        name: String,
        arguments: Vec<Node>,
    },
    VariableDeclaration {
        name: String,
        type_name: Option<String>,
        is_state_var: bool,
        initial_value: Option<Box<Node>>,
    },
    Block {
        statements: Vec<Node>,
    },
    BinaryOperation {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// `=` or a compound operator such as `-=`.
    Assignment {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    FunctionCall {
        expression: Box<Node>,
        /// `{value: v, gas: g}` call options, in source order.
        options: Vec<Node>,
        arguments: Vec<Node>,
    },
    MemberAccess {
        expression: Box<Node>,
        member_name: String,
    },
    Identifier {
        name: String,
    },
    Literal {
        value: String,
    },
    Other {
        kind: String,
        children: Vec<Node>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub loc: SourceLocation,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(loc: SourceLocation, kind: NodeKind) -> Self {
        Self { loc, kind }
    }

    pub fn node_type(&self) -> NodeType {
        match &self.kind {
            NodeKind::SourceUnit { .. } => NodeType::SourceUnit,
            NodeKind::PragmaDirective { .. } => NodeType::PragmaDirective,
            NodeKind::ContractDefinition { .. } => NodeType::ContractDefinition,
            NodeKind::FunctionDefinition(_) => NodeType::FunctionDefinition,
            NodeKind::ModifierDefinition { .. } => NodeType::ModifierDefinition,
            NodeKind::ModifierInvocation { .. } => NodeType::ModifierInvocation,
            NodeKind::VariableDeclaration { .. } => NodeType::VariableDeclaration,
            NodeKind::Block { .. } => NodeType::Block,
            NodeKind::BinaryOperation { .. } => NodeType::BinaryOperation,
            NodeKind::Assignment { .. } => NodeType::Assignment,
            NodeKind::FunctionCall { .. } => NodeType::FunctionCall,
            NodeKind::MemberAccess { .. } => NodeType::MemberAccess,
            NodeKind::Identifier { .. } => NodeType::Identifier,
            NodeKind::Literal { .. } => NodeType::Literal,
            NodeKind::Other { .. } => NodeType::Other,
        }
    }

    pub fn line(&self) -> usize {
        self.loc.line
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::SourceUnit { children } | NodeKind::Other { children, .. } => {
                children.iter().collect()
            }
            NodeKind::ContractDefinition { sub_nodes, .. } => sub_nodes.iter().collect(),
            NodeKind::FunctionDefinition(function) => function
                .parameters
                .iter()
                .chain(function.modifiers.iter())
                .chain(function.body.as_deref())
                .collect(),
            NodeKind::ModifierDefinition { body, .. } => body.as_deref().into_iter().collect(),
            NodeKind::ModifierInvocation { arguments, .. } => arguments.iter().collect(),
            NodeKind::VariableDeclaration { initial_value, .. } => {
                initial_value.as_deref().into_iter().collect()
            }
            NodeKind::Block { statements } => statements.iter().collect(),
            NodeKind::BinaryOperation { left, right, .. }
            | NodeKind::Assignment { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            NodeKind::FunctionCall {
                expression,
                options,
                arguments,
            } => std::iter::once(expression.as_ref())
                .chain(options.iter())
                .chain(arguments.iter())
                .collect(),
            NodeKind::MemberAccess { expression, .. } => vec![expression.as_ref()],
            NodeKind::PragmaDirective { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::Literal { .. } => Vec::new(),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDefinition> {
        match &self.kind {
            NodeKind::FunctionDefinition(function) => Some(function),
            _ => None,
        }
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Member name when this node is `<expr>.<member>`.
    pub fn member_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::MemberAccess { member_name, .. } => Some(member_name),
            _ => None,
        }
    }

    /// True for the exact `msg.sender` member access.
    pub fn is_msg_sender(&self) -> bool {
        match &self.kind {
            NodeKind::MemberAccess {
                expression,
                member_name,
            } => member_name == "sender" && expression.identifier_name() == Some("msg"),
            _ => false,
        }
    }
}

/// Arithmetic part of an assignment operator: `-` for `-=`, `None` for `=`.
pub fn compound_arithmetic(operator: &str) -> Option<&str> {
    match operator {
        "=" => None,
        op => op.strip_suffix('=').filter(|base| !base.is_empty()),
    }
}

/// Constructors for hand-built trees, mostly used by tests and adapters.
pub mod build {
    use super::*;

    fn at(line: usize, column: usize, kind: NodeKind) -> Node {
        Node::new(SourceLocation::new(line, column), kind)
    }

    pub fn source_unit(children: Vec<Node>) -> Node {
        at(1, 0, NodeKind::SourceUnit { children })
    }

    pub fn pragma(line: usize, value: &str) -> Node {
        at(
            line,
            0,
            NodeKind::PragmaDirective {
                name: "solidity".to_string(),
                value: value.to_string(),
            },
        )
    }

    pub fn contract(line: usize, name: &str, sub_nodes: Vec<Node>) -> Node {
        at(
            line,
            0,
            NodeKind::ContractDefinition {
                name: name.to_string(),
                sub_nodes,
            },
        )
    }

    pub fn function(
        line: usize,
        name: &str,
        visibility: Visibility,
        modifiers: Vec<Node>,
        statements: Vec<Node>,
    ) -> Node {
        at(
            line,
            4,
            NodeKind::FunctionDefinition(FunctionDefinition {
                name: Some(name.to_string()),
                visibility,
                is_constructor: false,
                parameters: Vec::new(),
                modifiers,
                body: Some(Box::new(block(line, statements))),
            }),
        )
    }

    pub fn constructor(line: usize, statements: Vec<Node>) -> Node {
        at(
            line,
            4,
            NodeKind::FunctionDefinition(FunctionDefinition {
                name: None,
                visibility: Visibility::Public,
                is_constructor: true,
                parameters: Vec::new(),
                modifiers: Vec::new(),
                body: Some(Box::new(block(line, statements))),
            }),
        )
    }

    pub fn block(line: usize, statements: Vec<Node>) -> Node {
        at(line, 0, NodeKind::Block { statements })
    }

    pub fn modifier(line: usize, name: &str) -> Node {
        at(
            line,
            0,
            NodeKind::ModifierInvocation {
                name: name.to_string(),
                arguments: Vec::new(),
            },
        )
    }

    pub fn state_var(line: usize, type_name: &str, name: &str) -> Node {
        at(
            line,
            4,
            NodeKind::VariableDeclaration {
                name: name.to_string(),
                type_name: Some(type_name.to_string()),
                is_state_var: true,
                initial_value: None,
            },
        )
    }

    pub fn ident(line: usize, column: usize, name: &str) -> Node {
        at(
            line,
            column,
            NodeKind::Identifier {
                name: name.to_string(),
            },
        )
    }

    pub fn literal(line: usize, column: usize, value: &str) -> Node {
        at(
            line,
            column,
            NodeKind::Literal {
                value: value.to_string(),
            },
        )
    }

    pub fn member(line: usize, column: usize, expression: Node, member_name: &str) -> Node {
        at(
            line,
            column,
            NodeKind::MemberAccess {
                expression: Box::new(expression),
                member_name: member_name.to_string(),
            },
        )
    }

    pub fn msg_sender(line: usize, column: usize) -> Node {
        member(line, column, ident(line, column, "msg"), "sender")
    }

    pub fn binary(line: usize, column: usize, operator: &str, left: Node, right: Node) -> Node {
        at(
            line,
            column,
            NodeKind::BinaryOperation {
                operator: operator.to_string(),
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    pub fn assign(line: usize, column: usize, operator: &str, left: Node, right: Node) -> Node {
        at(
            line,
            column,
            NodeKind::Assignment {
                operator: operator.to_string(),
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    pub fn call(line: usize, column: usize, expression: Node, arguments: Vec<Node>) -> Node {
        at(
            line,
            column,
            NodeKind::FunctionCall {
                expression: Box::new(expression),
                options: Vec::new(),
                arguments,
            },
        )
    }

    /// `<target>.<member>(<arguments>)`.
    pub fn member_call(
        line: usize,
        column: usize,
        target: &str,
        member_name: &str,
        arguments: Vec<Node>,
    ) -> Node {
        call(
            line,
            column,
            member(line, column, ident(line, column, target), member_name),
            arguments,
        )
    }

    pub fn require(line: usize, column: usize, condition: Node) -> Node {
        call(line, column, ident(line, column, "require"), vec![condition])
    }

    pub fn other(line: usize, column: usize, kind: &str, children: Vec<Node>) -> Node {
        at(
            line,
            column,
            NodeKind::Other {
                kind: kind.to_string(),
                children,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::build::*;
    use super::*;

    #[test]
    fn test_children_follow_source_order() {
        let call = member_call(3, 8, "msg", "value", vec![literal(3, 20, "1")]);
        let kinds: Vec<NodeType> = call.children().iter().map(|c| c.node_type()).collect();
        assert_eq!(kinds, vec![NodeType::MemberAccess, NodeType::Literal]);
    }

    #[test]
    fn test_msg_sender_detection() {
        assert!(msg_sender(1, 0).is_msg_sender());
        assert!(!member(1, 0, ident(1, 0, "tx"), "origin").is_msg_sender());
        assert!(!ident(1, 0, "sender").is_msg_sender());
    }

    #[test]
    fn test_compound_arithmetic() {
        assert_eq!(compound_arithmetic("="), None);
        assert_eq!(compound_arithmetic("-="), Some("-"));
        assert_eq!(compound_arithmetic("<<="), Some("<<"));
    }

    #[test]
    fn test_visibility_reachability() {
        assert!(Visibility::Default.is_callable_externally());
        assert!(Visibility::External.is_callable_externally());
        assert!(!Visibility::Internal.is_callable_externally());
        assert!(!Visibility::from_keyword("private").is_callable_externally());
    }
}
