//! Pre-order tree walker
//!
//! A [`Visitor`] is the handler table: one hook per node kind, all defaulting
//! to no-ops. [`visit`] calls the hook matching the current node and then
//! descends into every child unconditionally, so a hook never has to recurse
//! by itself. Hooks that need a narrower view (say, one function body) start
//! their own `visit` with a fresh visitor; the two walks share nothing.

use super::{FunctionDefinition, Node, NodeKind};

#[allow(unused_variables)]
pub trait Visitor {
    fn visit_source_unit(&mut self, node: &Node) {}

    fn visit_pragma_directive(&mut self, node: &Node, value: &str) {}

    fn visit_contract_definition(&mut self, node: &Node, name: &str, sub_nodes: &[Node]) {}

    fn visit_function_definition(&mut self, node: &Node, function: &FunctionDefinition) {}

    fn visit_modifier_definition(&mut self, node: &Node, name: &str) {}

    fn visit_modifier_invocation(&mut self, node: &Node, name: &str) {}

    fn visit_variable_declaration(&mut self, node: &Node, name: &str, is_state_var: bool) {}

    fn visit_block(&mut self, node: &Node) {}

    fn visit_binary_operation(&mut self, node: &Node, operator: &str, left: &Node, right: &Node) {}

    fn visit_assignment(&mut self, node: &Node, operator: &str, left: &Node, right: &Node) {}

    fn visit_function_call(&mut self, node: &Node, expression: &Node, arguments: &[Node]) {}

    fn visit_member_access(&mut self, node: &Node, expression: &Node, member_name: &str) {}

    fn visit_identifier(&mut self, node: &Node, name: &str) {}

    fn visit_literal(&mut self, node: &Node, value: &str) {}
}

pub fn visit<V: Visitor + ?Sized>(node: &Node, visitor: &mut V) {
    dispatch(node, visitor);

    for child in node.children() {
        visit(child, visitor);
    }
}

fn dispatch<V: Visitor + ?Sized>(node: &Node, visitor: &mut V) {
    match &node.kind {
        NodeKind::SourceUnit { .. } => visitor.visit_source_unit(node),
        NodeKind::PragmaDirective { value, .. } => visitor.visit_pragma_directive(node, value),
        NodeKind::ContractDefinition { name, sub_nodes } => {
            visitor.visit_contract_definition(node, name, sub_nodes)
        }
        NodeKind::FunctionDefinition(function) => {
            visitor.visit_function_definition(node, function)
        }
        NodeKind::ModifierDefinition { name, .. } => visitor.visit_modifier_definition(node, name),
        NodeKind::ModifierInvocation { name, .. } => visitor.visit_modifier_invocation(node, name),
        NodeKind::VariableDeclaration {
            name, is_state_var, ..
        } => visitor.visit_variable_declaration(node, name, *is_state_var),
        NodeKind::Block { .. } => visitor.visit_block(node),
        NodeKind::BinaryOperation {
            operator,
            left,
            right,
        } => visitor.visit_binary_operation(node, operator, left, right),
        NodeKind::Assignment {
            operator,
            left,
            right,
        } => visitor.visit_assignment(node, operator, left, right),
        NodeKind::FunctionCall {
            expression,
            arguments,
            ..
        } => visitor.visit_function_call(node, expression, arguments),
        NodeKind::MemberAccess {
            expression,
            member_name,
        } => visitor.visit_member_access(node, expression, member_name),
        NodeKind::Identifier { name } => visitor.visit_identifier(node, name),
        NodeKind::Literal { value } => visitor.visit_literal(node, value),
        // unmatched, still descended into by `visit`
        NodeKind::Other { .. } => {}
    }
}
