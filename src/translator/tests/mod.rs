use super::{StructuralError, TranslateOptions, translate};
use crate::grammar::parse;
use crate::tree::{Keyword, Node, NodeKind, Operator, Span, SyntaxTree, Token, TokenValue};

mod statements;

pub fn translate_source(source: &str) -> String {
    let tree = parse(source).expect("parse failed");
    translate(&tree, &TranslateOptions::default()).expect("translation failed")
}

pub fn translate_body(body: &str) -> String {
    translate_source(&format!("Program test Main [ {body} ]"))
}

/// The emitted line, indented to the entry routine's body.
pub fn body_line(text: &str) -> String {
    format!("\n            {text}\n")
}

/// A hoisted literal, e.g. `constant("CONST0", "RealValue", "1.0")`.
pub fn constant(name: &str, ty: &str, initializer: &str) -> String {
    format!("let {name}: ::entropy::runtime::{ty} = ::entropy::runtime::{ty}::new({initializer});")
}

/// A declared variable, e.g. `declared("x", "RealValue")`.
pub fn declared(name: &str, ty: &str) -> String {
    format!("let mut {name}: ::entropy::runtime::{ty} = ::entropy::runtime::{ty}::default();")
}

// ============================================================================
// Hand-built trees
// ============================================================================

pub fn translate_tree(root: Node) -> Result<String, StructuralError> {
    translate(&SyntaxTree::new(root), &TranslateOptions::default())
}

pub fn keyword(keyword: Keyword) -> Node {
    Node::leaf(
        NodeKind::Keyword,
        Token::new(keyword.as_str(), TokenValue::Keyword(keyword), Span::default()),
    )
}

pub fn name(kind: NodeKind, text: &str) -> Node {
    Node::leaf(
        kind,
        Token::new(text, TokenValue::Identifier(text.to_owned()), Span::default()),
    )
}

pub fn operator(kind: NodeKind, op: Operator) -> Node {
    Node::leaf(
        kind,
        Token::new(op.symbol(), TokenValue::Operator(op), Span::default()),
    )
}

pub fn number(value: f64) -> Node {
    Node::branch(
        NodeKind::Expression,
        vec![Node::leaf(
            NodeKind::Number,
            Token::new(value.to_string(), TokenValue::Number(value), Span::default()),
        )],
    )
}

pub fn program(children: Vec<Node>) -> Node {
    Node::branch(
        NodeKind::Program,
        vec![Node::branch(NodeKind::ProgramDeclaration, children)],
    )
}

/// `Program test Main [ <statements> ]`
pub fn program_with(statements: Vec<Node>) -> Node {
    let statements = statements
        .into_iter()
        .map(|s| Node::branch(NodeKind::Statement, vec![s]))
        .collect();
    program(vec![
        keyword(Keyword::Program),
        name(NodeKind::NamespaceId, "test"),
        name(NodeKind::ProgramId, "Main"),
        Node::branch(NodeKind::StatementList, statements),
    ])
}
