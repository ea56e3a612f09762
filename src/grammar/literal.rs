//! Token construction for the grammar actions: literal decoding, identifier
//! cleanup, keyword and operator lookup.

use lalrpop_util::ParseError;
use lazy_static::lazy_static;
use regex::Regex;

use crate::tree::{Keyword, Operator, Span, Token, TokenValue};

lazy_static! {
    static ref FORMAT_CHARACTERS: Regex =
        Regex::new(r"\p{Cf}").expect("format character class is a valid regex");
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    #[error("invalid escape sequence `{sequence}`")]
    InvalidEscape { sequence: String, offset: usize },

    #[error("char literal {text} must hold exactly one character")]
    CharLength { text: String, offset: usize },

    #[error("number literal `{text}` is out of range")]
    NumberOutOfRange { text: String, offset: usize },

    #[error("`{text}` is not a keyword")]
    UnknownKeyword { text: String, offset: usize },

    #[error("`{text}` is not an operator")]
    UnknownOperator { text: String, offset: usize },
}

impl LiteralError {
    /// Byte offset of the offending literal in the source.
    pub fn offset(&self) -> usize {
        match self {
            LiteralError::InvalidEscape { offset, .. }
            | LiteralError::CharLength { offset, .. }
            | LiteralError::NumberOutOfRange { offset, .. }
            | LiteralError::UnknownKeyword { offset, .. }
            | LiteralError::UnknownOperator { offset, .. } => *offset,
        }
    }
}

/// Wraps a literal failure so a fallible grammar action can return it.
pub fn lift<T, L, Tok>(
    result: Result<T, LiteralError>,
) -> Result<T, ParseError<L, Tok, LiteralError>> {
    result.map_err(|error| ParseError::User { error })
}

pub fn identifier(text: &str, span: Span) -> Token {
    let name = FORMAT_CHARACTERS.replace_all(text, "").into_owned();
    Token::new(text, TokenValue::Identifier(name), span)
}

pub fn keyword(text: &str, span: Span) -> Result<Token, LiteralError> {
    let keyword = Keyword::from_text(text).ok_or_else(|| LiteralError::UnknownKeyword {
        text: text.to_owned(),
        offset: span.start,
    })?;
    Ok(Token::new(text, TokenValue::Keyword(keyword), span))
}

pub fn operator(text: &str, span: Span) -> Result<Token, LiteralError> {
    let op = Operator::from_symbol(text).ok_or_else(|| LiteralError::UnknownOperator {
        text: text.to_owned(),
        offset: span.start,
    })?;
    Ok(Token::new(text, TokenValue::Operator(op), span))
}

pub fn number(text: &str, span: Span) -> Result<Token, LiteralError> {
    let out_of_range = || LiteralError::NumberOutOfRange {
        text: text.to_owned(),
        offset: span.start,
    };
    let value: f64 = text.parse().map_err(|_| out_of_range())?;
    if !value.is_finite() {
        return Err(out_of_range());
    }
    Ok(Token::new(text, TokenValue::Number(value), span))
}

pub fn string(text: &str, span: Span) -> Result<Token, LiteralError> {
    let body = strip_quotes(text, '"');
    let value = unescape(body, span.start + 1)?;
    Ok(Token::new(text, TokenValue::Text(value), span))
}

pub fn character(text: &str, span: Span) -> Result<Token, LiteralError> {
    let body = strip_quotes(text, '\'');
    let value = unescape(body, span.start + 1)?;
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Token::new(text, TokenValue::Char(c), span)),
        _ => Err(LiteralError::CharLength {
            text: text.to_owned(),
            offset: span.start,
        }),
    }
}

fn strip_quotes(text: &str, quote: char) -> &str {
    text.strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .unwrap_or(text)
}

/// Decodes C-style escapes. `base` is the byte offset of `body` in the source.
fn unescape(body: &str, base: usize) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let invalid = |end: usize| LiteralError::InvalidEscape {
            sequence: body[start..end.min(body.len())].to_owned(),
            offset: base + start,
        };
        let Some((_, escape)) = chars.next() else {
            return Err(invalid(body.len()));
        };
        let decoded = match escape {
            '\'' => '\'',
            '"' => '"',
            '\\' => '\\',
            '0' => '\0',
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            'u' | 'U' | 'x' => {
                let (min, max) = match escape {
                    'u' => (4, 4),
                    'U' => (8, 8),
                    _ => (1, 4),
                };
                let mut digits = String::new();
                while digits.len() < max {
                    match chars.peek() {
                        Some((_, d)) if d.is_ascii_hexdigit() => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let end = start + 2 + digits.len();
                if digits.len() < min {
                    return Err(invalid(end));
                }
                u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid(end))?
            }
            other => return Err(invalid(start + 1 + other.len_utf8())),
        };
        out.push(decoded);
    }
    Ok(out)
}
