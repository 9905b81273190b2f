//! Token types for the Goby lexer.

use std::fmt;

/// Token kinds for the Goby language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    // Literals
    Int,
    String,
    Ident,
    Constant,

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Bang,

    // Comparison
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEquals,
    GtEquals,

    // Increment/Decrement
    PlusPlus,
    MinusMinus,

    // Namespace resolution
    ColonColon,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Colon,
    Period,
    Pipe,
    Arrow,

    // Keywords
    If,
    Else,
    End,
    Def,
    Do,
    SelfKw,
    True,
    False,
    Nil,

    // Special
    Newline,
    Eof,
    Illegal,
}

impl TokenKind {
    /// Returns true for `Newline`, `;` and `Eof`.
    pub fn is_statement_end(self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Int => "INT",
            TokenKind::String => "STRING",
            TokenKind::Ident => "IDENT",
            TokenKind::Constant => "CONSTANT",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Bang => "!",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEquals => "<=",
            TokenKind::GtEquals => ">=",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::ColonColon => "::",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Period => ".",
            TokenKind::Pipe => "|",
            TokenKind::Arrow => "=>",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::End => "end",
            TokenKind::Def => "def",
            TokenKind::Do => "do",
            TokenKind::SelfKw => "self",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Nil => "nil",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Eof => "EOF",
            TokenKind::Illegal => "ILLEGAL",
        };
        write!(f, "{}", s)
    }
}

/// Look up an identifier to see if it's a keyword, a constant or a plain
/// identifier. The classification is purely lexical.
pub fn lookup_identifier(ident: &str) -> TokenKind {
    match ident {
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "end" => TokenKind::End,
        "def" => TokenKind::Def,
        "do" => TokenKind::Do,
        "self" => TokenKind::SelfKw,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "nil" => TokenKind::Nil,
        _ if ident.starts_with(|c: char| c.is_ascii_uppercase()) => TokenKind::Constant,
        _ => TokenKind::Ident,
    }
}

/// Position in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Character offset within the source.
    pub char: usize,
    /// 0-indexed line number.
    pub line: usize,
    /// 0-indexed column number.
    pub column: usize,
}

impl Position {
    pub fn new(char: usize, line: usize, column: usize) -> Self {
        Self { char, line, column }
    }

    /// Returns the 1-indexed line number.
    pub fn line_number(&self) -> usize {
        self.line + 1
    }

    /// Returns the 1-indexed column number.
    pub fn column_number(&self) -> usize {
        self.column + 1
    }

    /// Advance this position by n characters on the same line.
    pub fn advance(&self, n: usize) -> Self {
        Self {
            char: self.char + n,
            line: self.line,
            column: self.column + n,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line_number(), self.column_number())
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The literal text; decoded contents for string literals.
    pub literal: String,
    /// Start position in source.
    pub start: Position,
    /// End position in source.
    pub end: Position,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            kind,
            literal: literal.into(),
            start,
            end,
        }
    }

    /// Describe the token for error messages, e.g. `IDENT "foo"` or `)`.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Int | TokenKind::Ident | TokenKind::Constant | TokenKind::Illegal => {
                format!("{} {:?}", self.kind, self.literal)
            }
            TokenKind::String => format!("STRING {:?}", self.literal),
            kind => kind.to_string(),
        }
    }
}
