//! Concrete syntax tree produced by the Entropy grammar.
//!
//! The tree keeps every grammar rule as a node (there is no separate abstract
//! syntax step). Punctuation is dropped; everything else stays, so the shape
//! of a node's children is fixed by the production that built it:
//!
//! ```text
//! Program                  [ProgramDeclaration]
//! ProgramDeclaration       [Keyword, NamespaceId, ProgramId, StatementList]
//! Statement                [<one statement>]
//! PrintStatement           [Keyword, Expression]
//! IfStatement / WhileLoop  [Keyword, Expression, StatementList]
//! LocalVariableDeclaration [Keyword, IdentifierId, Datatype]
//! Assignment               [Keyword, IdentifierId, AssignmentOperator, Expression]
//! Expression               [literal | VariableId]
//!                          [Expression, BinaryOperator, Expression]
//!                          [ConditionalExpression]
//!                          [Expression]
//! ConditionalExpression    [Expression, RelationalOperator, Expression]
//! ```

use std::fmt;

// ============================================================================
// Node kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    ProgramDeclaration,
    NamespaceId,
    ProgramId,
    StatementList,
    Statement,
    EmptyStatement,
    PrintStatement,
    IfStatement,
    WhileLoop,
    LocalVariableDeclaration,
    Assignment,
    Datatype,
    Expression,
    ConditionalExpression,
    BinaryOperator,
    RelationalOperator,
    AssignmentOperator,
    Keyword,
    IdentifierId,
    VariableId,
    Number,
    StringLiteral,
    CharLiteral,
}

impl NodeKind {
    /// Label used by the tree dump.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Program => "program",
            NodeKind::ProgramDeclaration => "programDeclaration",
            NodeKind::NamespaceId => "namespace_id",
            NodeKind::ProgramId => "program_id",
            NodeKind::StatementList => "statementList",
            NodeKind::Statement => "statement",
            NodeKind::EmptyStatement => "emptyStatement",
            NodeKind::PrintStatement => "printStatement",
            NodeKind::IfStatement => "ifStatement",
            NodeKind::WhileLoop => "whileLoop",
            NodeKind::LocalVariableDeclaration => "localVariableDeclaration",
            NodeKind::Assignment => "assignment",
            NodeKind::Datatype => "datatype",
            NodeKind::Expression => "expression",
            NodeKind::ConditionalExpression => "conditionalExpression",
            NodeKind::BinaryOperator => "binaryOperator",
            NodeKind::RelationalOperator => "relationalOperator",
            NodeKind::AssignmentOperator => "assignmentOperator",
            NodeKind::Keyword => "keyword",
            NodeKind::IdentifierId => "identifier_id",
            NodeKind::VariableId => "variable_id",
            NodeKind::Number => "Number",
            NodeKind::StringLiteral => "StringLiteral",
            NodeKind::CharLiteral => "CharLiteral",
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::NamespaceId
                | NodeKind::ProgramId
                | NodeKind::BinaryOperator
                | NodeKind::RelationalOperator
                | NodeKind::AssignmentOperator
                | NodeKind::Keyword
                | NodeKind::IdentifierId
                | NodeKind::VariableId
                | NodeKind::Number
                | NodeKind::StringLiteral
                | NodeKind::CharLiteral
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Token payloads
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Program,
    Print,
    If,
    While,
    Declare,
    Let,
    Char,
    Real,
    String,
}

impl Keyword {
    /// Keywords are case-insensitive.
    pub fn from_text(text: &str) -> Option<Self> {
        let keyword = match text.to_lowercase().as_str() {
            "program" => Keyword::Program,
            "print" => Keyword::Print,
            "if" => Keyword::If,
            "while" => Keyword::While,
            "declare" => Keyword::Declare,
            "let" => Keyword::Let,
            "char" => Keyword::Char,
            "real" => Keyword::Real,
            "string" => Keyword::String,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Program => "program",
            Keyword::Print => "print",
            Keyword::If => "if",
            Keyword::While => "while",
            Keyword::Declare => "declare",
            Keyword::Let => "let",
            Keyword::Char => "char",
            Keyword::Real => "real",
            Keyword::String => "string",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Lt,
    Gt,
    Le,
    Ge,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        use Operator::*;
        let op = match symbol {
            "+" => Add,
            "-" => Sub,
            "*" => Mul,
            "/" => Div,
            "%" => Rem,
            "<" => Lt,
            ">" => Gt,
            "<=" => Le,
            ">=" => Ge,
            "=" => Assign,
            "+=" => AddAssign,
            "-=" => SubAssign,
            "*=" => MulAssign,
            "/=" => DivAssign,
            "%=" => RemAssign,
            "&=" => AndAssign,
            "|=" => OrAssign,
            "^=" => XorAssign,
            "<<=" => ShlAssign,
            ">>=" => ShrAssign,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(&self) -> &'static str {
        use Operator::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Rem => "%",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            RemAssign => "%=",
            AndAssign => "&=",
            OrAssign => "|=",
            XorAssign => "^=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Keyword(Keyword),
    Identifier(String),
    Number(f64),
    Char(char),
    Text(String),
    Operator(Operator),
}

// ============================================================================
// Positions
// ============================================================================

/// Byte range in the source plus the 1-based line and column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

/// Maps byte offsets to lines and columns. Columns count characters.
#[derive(Debug)]
pub struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        LineIndex {
            source,
            line_starts,
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns `(line, column)`, both 1-based.
    pub fn locate(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let column = self
            .source
            .get(start..offset)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(offset - start);
        (line + 1, column + 1)
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        let (line, column) = self.locate(start);
        Span {
            start,
            end,
            line,
            column,
        }
    }

    /// Up to `max_chars` characters of source starting at `offset`.
    pub fn snippet(&self, offset: usize, max_chars: usize) -> &'src str {
        let Some(rest) = self.source.get(offset.min(self.source.len())..) else {
            return "";
        };
        match rest.char_indices().nth(max_chars) {
            Some((end, _)) => &rest[..end],
            None => rest,
        }
    }
}

// ============================================================================
// Tokens and nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub value: TokenValue,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, value: TokenValue, span: Span) -> Self {
        Token {
            text: text.into(),
            value,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub token: Option<Token>,
}

impl Node {
    pub fn branch(kind: NodeKind, children: Vec<Node>) -> Self {
        Node {
            kind,
            children,
            token: None,
        }
    }

    pub fn leaf(kind: NodeKind, token: Token) -> Self {
        Node {
            kind,
            children: Vec::new(),
            token: Some(token),
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// First direct child of the given kind.
    pub fn find(&self, kind: NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn text(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxTree {
    pub root: Node,
}

impl SyntaxTree {
    pub fn new(root: Node) -> Self {
        SyntaxTree { root }
    }

    /// Pre-order dump, one tab of indentation per depth.
    pub fn dump(&self) -> TreeDump<'_> {
        TreeDump(&self.root)
    }
}

pub struct TreeDump<'a>(&'a Node);

impl TreeDump<'_> {
    fn write_node(f: &mut fmt::Formatter<'_>, node: &Node, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("\t")?;
        }
        f.write_str(node.kind.label())?;
        if let Some(token) = &node.token {
            write!(f, "\t{}", token.text)?;
        }
        writeln!(f)?;
        for child in &node.children {
            Self::write_node(f, child, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write_node(f, self.0, 0)
    }
}
