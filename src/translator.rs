//! Syntax-directed translation of an Entropy tree into a Rust program.
//!
//! The walk dispatches on [`NodeKind`]. Literals are hoisted into numbered
//! `CONST<n>` bindings declared ahead of the body; every operator becomes a
//! call to the runtime's named mutating method, so the nesting of the tree
//! fixes evaluation order and no parentheses are needed. Identifiers are
//! lower-cased where they are declared or assigned and kept verbatim where
//! they are read.

use tracing::{debug, info};

use crate::{
    runtime::MutationRate,
    tree::{Keyword, Node, NodeKind, Operator, SyntaxTree, TokenValue},
};

mod emitter;

use emitter::{
    Constant, Line, RUNTIME_BINDING, RuntimeType, TargetProgram, float_literal, rust_ident,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TranslateOptions {
    /// Rate baked into the emitted runtime construction.
    pub mutation_rate: MutationRate,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralError {
    #[error("no program declaration found")]
    MissingProgramDeclaration,

    #[error("program declaration nested inside another program")]
    NestedProgramDeclaration,

    #[error("no namespace provided")]
    MissingNamespace,

    #[error("no program name provided")]
    MissingProgramName,

    #[error("{construct} expects {expected} as child {index}, found {}", describe(.found))]
    UnexpectedChild {
        construct: NodeKind,
        index: usize,
        expected: NodeKind,
        found: Option<NodeKind>,
    },

    #[error("{construct} has no {expected} child")]
    MissingChild {
        construct: NodeKind,
        expected: NodeKind,
    },

    #[error("{construct} expects the `{}` keyword", .expected.as_str())]
    WrongKeyword {
        construct: NodeKind,
        expected: Keyword,
    },

    #[error("{kind} node with {count} children matches no production")]
    MalformedNode { kind: NodeKind, count: usize },

    #[error("{kind} node carries no usable token")]
    MissingToken { kind: NodeKind },

    #[error("{kind} cannot appear where a value is expected")]
    NotAnExpression { kind: NodeKind },

    #[error("`{0}` is not a datatype")]
    UnknownDatatype(String),
}

fn describe(found: &Option<NodeKind>) -> String {
    match found {
        Some(kind) => kind.to_string(),
        None => "nothing".to_owned(),
    }
}

/// Translates a tree into the full text of a Rust program.
///
/// The result depends only on the tree and the options, so translating the
/// same tree twice yields identical text.
pub fn translate(
    tree: &SyntaxTree,
    options: &TranslateOptions,
) -> Result<String, StructuralError> {
    let mut translator = Translator::new(options);
    translator.visit(&tree.root)?;
    let program = translator.finish()?;
    info!(
        namespace = %program.namespace,
        program = %program.program,
        constants = program.constants.len(),
        lines = program.body.len(),
        "translation finished"
    );
    Ok(program.render())
}

// ============================================================================
// Fragments
// ============================================================================

/// Rust source for one expression.
#[derive(Debug)]
struct Fragment {
    code: String,
    /// Names an existing binding rather than a fresh temporary.
    place: bool,
}

impl Fragment {
    fn place(code: String) -> Self {
        Fragment { code, place: true }
    }

    fn temporary(code: String) -> Self {
        Fragment { code, place: false }
    }

    /// The expression as an owned value, copying bindings without reading them.
    fn into_owned(self) -> String {
        if self.place {
            format!("{}.clone()", self.code)
        } else {
            self.code
        }
    }
}

/// Runtime method implementing an operator, `None` for plain assignment.
fn mutating_method(op: Operator) -> Option<&'static str> {
    use Operator::*;
    let method = match op {
        Add | AddAssign => "add_and_mutate",
        Sub | SubAssign => "sub_and_mutate",
        Mul | MulAssign => "mul_and_mutate",
        Div | DivAssign => "div_and_mutate",
        Rem | RemAssign => "rem_and_mutate",
        AndAssign => "and_and_mutate",
        OrAssign => "or_and_mutate",
        XorAssign => "xor_and_mutate",
        ShlAssign => "shl_and_mutate",
        ShrAssign => "shr_and_mutate",
        Lt => "lt_and_mutate",
        Gt => "gt_and_mutate",
        Le => "le_and_mutate",
        Ge => "ge_and_mutate",
        Assign => return None,
    };
    Some(method)
}

// ============================================================================
// Translator
// ============================================================================

struct Translator<'a> {
    options: &'a TranslateOptions,
    header: Option<(String, String)>,
    constants: Vec<Constant>,
    literal_count: usize,
    body: Vec<Line>,
    depth: usize,
}

impl<'a> Translator<'a> {
    fn new(options: &'a TranslateOptions) -> Self {
        Translator {
            options,
            header: None,
            constants: Vec::new(),
            literal_count: 0,
            body: Vec::new(),
            depth: 0,
        }
    }

    fn finish(self) -> Result<TargetProgram, StructuralError> {
        let (namespace, program) = self
            .header
            .ok_or(StructuralError::MissingProgramDeclaration)?;
        Ok(TargetProgram {
            namespace,
            program,
            rate: self.options.mutation_rate,
            constants: self.constants,
            body: self.body,
        })
    }

    fn line(&mut self, text: String) {
        self.body.push(Line {
            depth: self.depth,
            text,
        });
    }

    fn visit(&mut self, node: &Node) -> Result<(), StructuralError> {
        match node.kind {
            NodeKind::ProgramDeclaration => self.program_declaration(node),
            NodeKind::LocalVariableDeclaration => self.declaration(node),
            NodeKind::Assignment => self.assignment(node),
            NodeKind::PrintStatement => self.print(node),
            NodeKind::IfStatement => self.guarded_block(node, Keyword::If),
            NodeKind::WhileLoop => self.guarded_block(node, Keyword::While),
            NodeKind::Expression
            | NodeKind::ConditionalExpression
            | NodeKind::VariableId
            | NodeKind::Number
            | NodeKind::StringLiteral
            | NodeKind::CharLiteral => {
                // evaluated for its side effects on the operands
                let fragment = self.expression(node)?;
                self.line(format!("let _ = {};", fragment.code));
                Ok(())
            }
            _ => {
                for child in &node.children {
                    self.visit(child)?;
                }
                Ok(())
            }
        }
    }

    fn program_declaration(&mut self, node: &Node) -> Result<(), StructuralError> {
        if self.header.is_some() {
            return Err(StructuralError::NestedProgramDeclaration);
        }

        let mut namespace = None;
        let mut program = None;
        let mut body_start = node.children.len();
        for (index, child) in node.children.iter().enumerate() {
            match child.kind {
                NodeKind::NamespaceId if namespace.is_none() => {
                    namespace = Some(identifier(child)?);
                }
                NodeKind::ProgramId if program.is_none() => {
                    program = Some(identifier(child)?);
                }
                _ => {}
            }
            if namespace.is_some() && program.is_some() {
                body_start = index + 1;
                break;
            }
        }
        let namespace = rust_ident(&namespace.ok_or(StructuralError::MissingNamespace)?);
        let program = rust_ident(&program.ok_or(StructuralError::MissingProgramName)?);
        debug!(%namespace, %program, "program header");
        self.header = Some((namespace, program));

        for child in &node.children[body_start..] {
            self.visit(child)?;
        }
        Ok(())
    }

    fn declaration(&mut self, node: &Node) -> Result<(), StructuralError> {
        let construct = NodeKind::LocalVariableDeclaration;
        let name = node
            .find(NodeKind::IdentifierId)
            .ok_or(StructuralError::MissingChild {
                construct,
                expected: NodeKind::IdentifierId,
            })?;
        let datatype = node
            .find(NodeKind::Datatype)
            .ok_or(StructuralError::MissingChild {
                construct,
                expected: NodeKind::Datatype,
            })?;

        let name = rust_ident(&identifier(name)?.to_lowercase());
        let ty = datatype_of(datatype)?;
        debug!(%name, %ty, "declaration");
        self.line(format!("let mut {name}: {ty} = {ty}::default();"));
        Ok(())
    }

    fn assignment(&mut self, node: &Node) -> Result<(), StructuralError> {
        let construct = NodeKind::Assignment;
        let target = expect_child(node, construct, 1, NodeKind::IdentifierId)?;
        let op = expect_child(node, construct, 2, NodeKind::AssignmentOperator)?;
        let value = expect_child(node, construct, 3, NodeKind::Expression)?;

        let name = rust_ident(&identifier(target)?.to_lowercase());
        let op = operator(op)?;
        let fragment = self.expression(value)?;
        let text = match mutating_method(op) {
            None => format!("{name} = {};", fragment.into_owned()),
            Some(method) => format!(
                "{name} = {name}.{method}(&{}, &{RUNTIME_BINDING});",
                fragment.code
            ),
        };
        self.line(text);
        Ok(())
    }

    fn print(&mut self, node: &Node) -> Result<(), StructuralError> {
        let construct = NodeKind::PrintStatement;
        expect_keyword(node, construct, Keyword::Print)?;
        let value = expect_child(node, construct, 1, NodeKind::Expression)?;
        let fragment = self.expression(value)?;
        self.line(format!(
            "print!(\"{{}}\", {}.observe(&{RUNTIME_BINDING}));",
            fragment.code
        ));
        Ok(())
    }

    /// `if` and `while`: a keyword, a condition and a nested statement list.
    fn guarded_block(&mut self, node: &Node, keyword: Keyword) -> Result<(), StructuralError> {
        let construct = node.kind;
        expect_keyword(node, construct, keyword)?;
        let condition = expect_child(node, construct, 1, NodeKind::Expression)?;
        let body = expect_child(node, construct, 2, NodeKind::StatementList)?;

        let condition = self.expression(condition)?;
        self.line(format!("{} {} {{", keyword.as_str(), condition.code));
        self.depth += 1;
        let nested = self.visit(body);
        self.depth -= 1;
        nested?;
        self.line("}".to_owned());
        Ok(())
    }

    fn expression(&mut self, node: &Node) -> Result<Fragment, StructuralError> {
        match node.kind {
            NodeKind::Expression => match node.children.as_slice() {
                [inner] => self.expression(inner),
                [lhs, op, rhs] => self.binary(node, lhs, op, rhs, NodeKind::BinaryOperator),
                children => Err(StructuralError::MalformedNode {
                    kind: node.kind,
                    count: children.len(),
                }),
            },
            NodeKind::ConditionalExpression => match node.children.as_slice() {
                [lhs, op, rhs] => self.binary(node, lhs, op, rhs, NodeKind::RelationalOperator),
                children => Err(StructuralError::MalformedNode {
                    kind: node.kind,
                    count: children.len(),
                }),
            },
            NodeKind::VariableId => Ok(Fragment::place(rust_ident(&identifier(node)?))),
            NodeKind::Number | NodeKind::StringLiteral | NodeKind::CharLiteral => {
                self.hoist(node).map(Fragment::place)
            }
            kind => Err(StructuralError::NotAnExpression { kind }),
        }
    }

    fn binary(
        &mut self,
        node: &Node,
        lhs: &Node,
        op: &Node,
        rhs: &Node,
        operator_kind: NodeKind,
    ) -> Result<Fragment, StructuralError> {
        let construct = node.kind;
        for (index, child, expected) in [
            (0, lhs, NodeKind::Expression),
            (1, op, operator_kind),
            (2, rhs, NodeKind::Expression),
        ] {
            if child.kind != expected {
                return Err(StructuralError::UnexpectedChild {
                    construct,
                    index,
                    expected,
                    found: Some(child.kind),
                });
            }
        }

        let method = mutating_method(operator(op)?).ok_or(StructuralError::MalformedNode {
            kind: op.kind,
            count: op.children.len(),
        })?;
        let lhs = self.expression(lhs)?;
        let rhs = self.expression(rhs)?;
        Ok(Fragment::temporary(format!(
            "{}.{method}(&{}, &{RUNTIME_BINDING})",
            lhs.code, rhs.code
        )))
    }

    /// Declares a literal ahead of the body and returns the binding's name.
    fn hoist(&mut self, node: &Node) -> Result<String, StructuralError> {
        let kind = node.kind;
        let token = node
            .token
            .as_ref()
            .ok_or(StructuralError::MissingToken { kind })?;
        let (ty, initializer) = match (kind, &token.value) {
            (NodeKind::Number, TokenValue::Number(value)) => {
                (RuntimeType::Real, float_literal(*value))
            }
            (NodeKind::CharLiteral, TokenValue::Char(c)) => (RuntimeType::Char, format!("{c:?}")),
            (NodeKind::StringLiteral, TokenValue::Text(text)) => {
                (RuntimeType::String, format!("{text:?}"))
            }
            _ => return Err(StructuralError::MissingToken { kind }),
        };

        let name = format!("CONST{}", self.literal_count);
        self.literal_count += 1;
        debug!(%name, %ty, literal = %token.text, "hoisted literal");
        self.constants.push(Constant {
            name: name.clone(),
            ty,
            initializer,
        });
        Ok(name)
    }
}

// ============================================================================
// Child access
// ============================================================================

fn expect_child(
    node: &Node,
    construct: NodeKind,
    index: usize,
    expected: NodeKind,
) -> Result<&Node, StructuralError> {
    match node.child(index) {
        Some(child) if child.kind == expected => Ok(child),
        found => Err(StructuralError::UnexpectedChild {
            construct,
            index,
            expected,
            found: found.map(|c| c.kind),
        }),
    }
}

fn expect_keyword(
    node: &Node,
    construct: NodeKind,
    keyword: Keyword,
) -> Result<(), StructuralError> {
    let child = expect_child(node, construct, 0, NodeKind::Keyword)?;
    match child.token.as_ref().map(|t| &t.value) {
        Some(TokenValue::Keyword(found)) if *found == keyword => Ok(()),
        _ => Err(StructuralError::WrongKeyword {
            construct,
            expected: keyword,
        }),
    }
}

fn identifier(node: &Node) -> Result<String, StructuralError> {
    match node.token.as_ref().map(|t| &t.value) {
        Some(TokenValue::Identifier(name)) if !name.is_empty() => Ok(name.clone()),
        _ => Err(StructuralError::MissingToken { kind: node.kind }),
    }
}

fn operator(node: &Node) -> Result<Operator, StructuralError> {
    match node.token.as_ref().map(|t| &t.value) {
        Some(TokenValue::Operator(op)) => Ok(*op),
        _ => Err(StructuralError::MissingToken { kind: node.kind }),
    }
}

fn datatype_of(node: &Node) -> Result<RuntimeType, StructuralError> {
    let keyword = node
        .find(NodeKind::Keyword)
        .and_then(Node::text)
        .ok_or(StructuralError::MissingToken { kind: node.kind })?;
    RuntimeType::from_keyword(keyword)
        .ok_or_else(|| StructuralError::UnknownDatatype(keyword.to_owned()))
}

#[cfg(test)]
mod tests;
