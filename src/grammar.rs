//! # Entropy grammar
//!
//! ```text
//! Program test Main [
//!     declare counter real;
//!     let counter = 0;
//!     while counter < 10 [
//!         print counter;
//!         let counter += 1;
//!     ]
//! ]
//! ```
//!
//! Keywords are case-insensitive, `//` and `/* */` comments are skipped and
//! the punctuation `; [ ] ( )` never reaches the tree. Relational operators
//! bind looser than arithmetic and cannot be chained.
//!
//! The parser itself is generated by LALRPOP from `entropy_grammar.lalrpop`;
//! this module only wires it to [`SyntaxTree`] and [`SyntaxError`].

use lalrpop_util::{ParseError, lalrpop_mod};
lalrpop_mod!(entropy_grammar, "/grammar/entropy_grammar.rs");

pub mod literal;

use tracing::debug;

use crate::tree::{LineIndex, SyntaxTree};
use literal::LiteralError;

/// Number of source characters quoted after the failure point.
pub const CONTEXT_CHARS: usize = 20;

/// A parse failure with enough position information to point at it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub message: String,
    /// Text of the offending token, or `end of input`.
    pub token: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    /// Source following the failure point, at most [`CONTEXT_CHARS`] characters.
    pub context: String,
    pub expected: Vec<String>,
}

impl SyntaxError {
    fn at(
        lines: &LineIndex,
        offset: usize,
        token: String,
        message: String,
        expected: Vec<String>,
    ) -> Self {
        let (line, column) = lines.locate(offset);
        SyntaxError {
            message,
            token,
            offset,
            line,
            column,
            context: lines.snippet(offset, CONTEXT_CHARS).to_owned(),
            expected,
        }
    }

    pub(crate) fn from_parse_error(
        error: ParseError<usize, lalrpop_util::lexer::Token<'_>, LiteralError>,
        lines: &LineIndex,
    ) -> Self {
        match error {
            ParseError::InvalidToken { location } => {
                let token = lines.snippet(location, 1).to_owned();
                let message = format!("invalid token `{token}`");
                Self::at(lines, location, token, message, Vec::new())
            }
            ParseError::UnrecognizedEof { location, expected } => Self::at(
                lines,
                location,
                "end of input".to_owned(),
                "unexpected end of input".to_owned(),
                expected,
            ),
            ParseError::UnrecognizedToken {
                token: (from, token, _),
                expected,
            } => {
                let message = format!("unexpected token `{}`", token.1);
                Self::at(lines, from, token.1.to_owned(), message, expected)
            }
            ParseError::ExtraToken {
                token: (from, token, _),
            } => {
                let message = format!("extra token `{}`", token.1);
                Self::at(lines, from, token.1.to_owned(), message, Vec::new())
            }
            ParseError::User { error } => {
                let offset = error.offset();
                let token = lines
                    .source()
                    .get(offset..)
                    .and_then(|rest| rest.split_whitespace().next())
                    .unwrap_or_default()
                    .to_owned();
                Self::at(lines, offset, token, error.to_string(), Vec::new())
            }
        }
    }

    /// Multi-line report written to stderr by the command line.
    pub fn report(&self) -> String {
        let mut out = format!("An error has occurred: {}\n", self.message);
        out.push_str(&format!("Token: {}\n", self.token));
        out.push_str(&format!("Line #{}\n", self.line));
        out.push_str(&format!("Character #{}\n", self.column));
        if !self.expected.is_empty() {
            out.push_str(&format!("Expected one of: {}\n", self.expected.join(", ")));
        }
        out.push_str(&format!("Failed at: {}...", self.context));
        out
    }
}

/// Parses Entropy source text into its concrete syntax tree.
pub fn parse(source: &str) -> Result<SyntaxTree, SyntaxError> {
    let lines = LineIndex::new(source);
    match entropy_grammar::ProgramParser::new().parse(&lines, source) {
        Ok(root) => {
            debug!("parsed {} bytes of Entropy source", source.len());
            Ok(SyntaxTree::new(root))
        }
        Err(parse_error) => {
            let error = SyntaxError::from_parse_error(parse_error, &lines);
            debug!(line = error.line, column = error.column, "parse failed: {}", error.message);
            Err(error)
        }
    }
}

#[cfg(test)]
mod tests;
