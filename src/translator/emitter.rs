//! Structured assembly of the emitted Rust program.
//!
//! The translator fills a [`TargetProgram`] (header names, hoisted literal
//! constants, body lines) and rendering happens once at the end, so no user
//! text is ever spliced into a template.
//!
//! Runtime items are always named by absolute path. The user's namespace and
//! program names live in the same scopes as the emitted code, so any
//! unqualified runtime or prelude name could be shadowed by them.

use std::fmt::{self, Write};

use crate::runtime::MutationRate;

const INDENT: &str = "    ";
/// Depth of the entry routine's body: `mod` > `impl` > `fn`.
const BODY_DEPTH: usize = 3;
/// Name of the runtime binding inside the emitted entry routine.
pub(crate) const RUNTIME_BINDING: &str = "__rt";
/// Absolute path of the runtime module as seen from an emitted program.
pub(crate) const RUNTIME_PATH: &str = "::entropy::runtime";
const RESULT_PATH: &str = "::std::result::Result";

// ============================================================================
// Runtime types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuntimeType {
    Real,
    Char,
    String,
}

impl RuntimeType {
    pub fn name(&self) -> &'static str {
        match self {
            RuntimeType::Real => "RealValue",
            RuntimeType::Char => "CharValue",
            RuntimeType::String => "StringValue",
        }
    }

    /// `real` becomes `RealValue`, `char` becomes `CharValue`, and so on.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let mut chars = keyword.chars();
        let first = chars.next()?;
        let type_name = format!(
            "{}{}Value",
            first.to_uppercase(),
            chars.as_str().to_lowercase()
        );
        [RuntimeType::Real, RuntimeType::Char, RuntimeType::String]
            .into_iter()
            .find(|ty| ty.name() == type_name)
    }
}

/// The absolute path, e.g. `::entropy::runtime::RealValue`.
impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RUNTIME_PATH}::{}", self.name())
    }
}

// ============================================================================
// Program pieces
// ============================================================================

/// A hoisted literal: `let <name>: <ty> = <ty>::new(<initializer>);`
#[derive(Debug, Clone)]
pub(crate) struct Constant {
    pub name: String,
    pub ty: RuntimeType,
    pub initializer: String,
}

#[derive(Debug, Clone)]
pub(crate) struct Line {
    pub depth: usize,
    pub text: String,
}

#[derive(Debug)]
pub(crate) struct TargetProgram {
    pub namespace: String,
    pub program: String,
    pub rate: MutationRate,
    pub constants: Vec<Constant>,
    pub body: Vec<Line>,
}

impl TargetProgram {
    pub fn render(&self) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> fmt::Result {
        let ns = &self.namespace;
        let prog = &self.program;
        let rt = RUNTIME_BINDING;
        let runtime = RUNTIME_PATH;
        let result = RESULT_PATH;

        writeln!(out, "// Generated by entropyc. Do not edit.")?;
        writeln!(
            out,
            "#![allow(non_snake_case, non_camel_case_types, unused_mut, unused_variables, \
             unused_assignments, unused_imports)]"
        )?;
        writeln!(out)?;
        writeln!(out, "pub mod {ns} {{")?;
        writeln!(out, "{INDENT}use {runtime}::{{Numeric as _, Observe as _}};")?;
        writeln!(out)?;
        writeln!(out, "{INDENT}pub struct {prog};")?;
        writeln!(out)?;
        writeln!(out, "{INDENT}impl {prog} {{")?;
        writeln!(
            out,
            "{INDENT}{INDENT}pub fn main() -> {result}<(), {runtime}::RuntimeError> {{"
        )?;

        let body_indent = INDENT.repeat(BODY_DEPTH);
        let rate = format!("{runtime}::MutationRate::new({}_f64)?", self.rate);
        writeln!(out, "{body_indent}let {rt} = {runtime}::Runtime::new({rate});")?;
        for constant in &self.constants {
            writeln!(
                out,
                "{body_indent}let {}: {ty} = {ty}::new({});",
                constant.name,
                constant.initializer,
                ty = constant.ty
            )?;
        }
        for line in &self.body {
            writeln!(
                out,
                "{body_indent}{}{}",
                INDENT.repeat(line.depth),
                line.text
            )?;
        }
        writeln!(out, "{body_indent}{result}::Ok(())")?;

        writeln!(out, "{INDENT}{INDENT}}}")?;
        writeln!(out, "{INDENT}}}")?;
        writeln!(out, "}}")?;
        writeln!(out)?;
        writeln!(out, "fn main() -> {result}<(), {runtime}::RuntimeError> {{")?;
        writeln!(out, "{INDENT}{ns}::{prog}::main()")?;
        writeln!(out, "}}")?;
        Ok(())
    }
}

// ============================================================================
// Identifiers
// ============================================================================

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be written as raw identifiers.
const PATH_KEYWORDS: &[&str] = &["self", "Self", "super", "crate"];

/// Makes an Entropy identifier usable as a Rust identifier.
pub(crate) fn rust_ident(name: &str) -> String {
    if PATH_KEYWORDS.contains(&name) {
        format!("{name}_")
    } else if RUST_KEYWORDS.contains(&name) {
        format!("r#{name}")
    } else {
        name.to_owned()
    }
}

/// Rust source for a finite `f64`.
pub(crate) fn float_literal(value: f64) -> String {
    format!("{value:?}")
}
