//! Syntax errors collected while parsing.

use goby_lexer::{LexerError, Position, Token};
use thiserror::Error;

/// Errors that can occur during parsing.
///
/// None of these abort a parse: the parser records them and keeps going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    #[error("no prefix parse function for {token} at line {line}, column {column}")]
    NoPrefixParser {
        token: String,
        line: usize,
        column: usize,
    },

    #[error("expected {expected}, got {found} at line {line}, column {column}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },

    #[error("could not parse {literal:?} as {reason} at line {line}, column {column}")]
    MalformedLiteral {
        literal: String,
        reason: String,
        line: usize,
        column: usize,
    },

    #[error("maximum expression depth exceeded at line {line}, column {column}")]
    MaxDepth { line: usize, column: usize },

    #[error("lexer error: {0}")]
    Lexer(#[from] LexerError),
}

impl ParserError {
    pub(crate) fn no_prefix_parser(token: &Token) -> Self {
        Self::NoPrefixParser {
            token: token.describe(),
            line: token.start.line_number(),
            column: token.start.column_number(),
        }
    }

    pub(crate) fn unexpected(expected: impl Into<String>, found: &Token) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.describe(),
            line: found.start.line_number(),
            column: found.start.column_number(),
        }
    }

    pub(crate) fn malformed(
        literal: impl Into<String>,
        reason: impl Into<String>,
        pos: Position,
    ) -> Self {
        Self::MalformedLiteral {
            literal: literal.into(),
            reason: reason.into(),
            line: pos.line_number(),
            column: pos.column_number(),
        }
    }

    pub(crate) fn max_depth(pos: Position) -> Self {
        Self::MaxDepth {
            line: pos.line_number(),
            column: pos.column_number(),
        }
    }

    /// The 1-based line the error was reported at, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParserError::NoPrefixParser { line, .. }
            | ParserError::UnexpectedToken { line, .. }
            | ParserError::MalformedLiteral { line, .. }
            | ParserError::MaxDepth { line, .. } => Some(*line),
            ParserError::Lexer(LexerError::InvalidNumber { line, .. })
            | ParserError::Lexer(LexerError::UnterminatedString { line, .. })
            | ParserError::Lexer(LexerError::InvalidEscape { line, .. }) => Some(*line),
        }
    }
}
