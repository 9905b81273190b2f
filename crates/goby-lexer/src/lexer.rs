//! Lexer for the Goby scripting language.

use crate::token::{lookup_identifier, Position, Token, TokenKind};
use thiserror::Error;

/// Errors that can occur during lexing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("invalid number literal: {literal} at line {line}, column {column}")]
    InvalidNumber {
        literal: String,
        line: usize,
        column: usize,
    },

    #[error("unterminated string literal at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("invalid escape sequence: \\{ch} at line {line}, column {column}")]
    InvalidEscape {
        ch: char,
        line: usize,
        column: usize,
    },
}

/// Lexer tokenizes Goby source code.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    next_position: usize,
    ch: char,
    line: usize,
    column: isize,
    token_start: Position,
}

impl Lexer {
    /// Create a new lexer for the given input.
    pub fn new(input: &str) -> Self {
        let mut lexer = Self {
            chars: input.chars().collect(),
            position: 0,
            next_position: 0,
            ch: '\0',
            line: 0,
            column: -1,
            token_start: Position::default(),
        };
        lexer.read_char();
        lexer
    }

    fn current_position(&self) -> Position {
        Position::new(self.position, self.line, self.column.max(0) as usize)
    }

    fn read_char(&mut self) {
        self.ch = self.chars.get(self.next_position).copied().unwrap_or('\0');
        self.position = self.next_position;
        self.next_position += 1;
        self.column += 1;
    }

    fn peek_char(&self) -> char {
        self.chars.get(self.next_position).copied().unwrap_or('\0')
    }

    /// Skip whitespace (spaces and tabs, not newlines).
    fn skip_whitespace(&mut self) {
        while self.ch == ' ' || self.ch == '\t' {
            self.read_char();
        }
    }

    fn skip_to_end_of_line(&mut self) {
        while self.ch != '\n' && self.ch != '\r' && self.ch != '\0' {
            self.read_char();
        }
    }

    fn handle_newline(&mut self) {
        self.line += 1;
        self.column = -1;
    }

    fn start_token(&mut self) {
        self.token_start = self.current_position();
    }

    fn make_token(&self, kind: TokenKind, literal: String) -> Token {
        Token::new(kind, literal, self.token_start, self.current_position())
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        // Comments run to the end of the line
        while self.ch == '#' {
            self.skip_to_end_of_line();
            self.skip_whitespace();
        }

        self.start_token();

        if self.ch == '\0' {
            return Ok(self.make_token(TokenKind::Eof, String::new()));
        }

        if self.ch == '\n' {
            self.handle_newline();
            self.read_char();
            return Ok(self.make_token(TokenKind::Newline, "\n".to_string()));
        }

        // \r\n is a single newline; a lone \r also ends the line
        if self.ch == '\r' {
            if self.peek_char() == '\n' {
                self.read_char();
            }
            self.handle_newline();
            self.read_char();
            return Ok(self.make_token(TokenKind::Newline, "\n".to_string()));
        }

        if self.ch == '"' || self.ch == '\'' {
            return self.read_string(self.ch);
        }

        if self.ch.is_ascii_digit() {
            return self.read_number();
        }

        if is_letter(self.ch) {
            return Ok(self.read_identifier());
        }

        if let Some(tok) = self.read_operator() {
            return Ok(tok);
        }

        let ch = self.ch;
        self.read_char();
        Ok(self.make_token(TokenKind::Illegal, ch.to_string()))
    }

    /// Read an identifier, constant or keyword. A trailing `?` is part of
    /// the name (`empty?`).
    fn read_identifier(&mut self) -> Token {
        let start = self.position;
        while is_letter(self.ch) || self.ch.is_ascii_digit() {
            self.read_char();
        }
        if self.ch == '?' {
            self.read_char();
        }
        let literal: String = self.chars[start..self.position].iter().collect();
        let kind = lookup_identifier(&literal);
        self.make_token(kind, literal)
    }

    fn read_number(&mut self) -> Result<Token, LexerError> {
        let start = self.position;
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        let literal: String = self.chars[start..self.position].iter().collect();

        if is_letter(self.ch) {
            return Err(LexerError::InvalidNumber {
                literal: format!("{}{}", literal, self.ch),
                line: self.current_position().line_number(),
                column: self.current_position().column_number(),
            });
        }
        Ok(self.make_token(TokenKind::Int, literal))
    }

    /// Read a quoted string literal. Double-quoted strings process escape
    /// sequences; single-quoted strings only unescape `\\` and `\'`.
    fn read_string(&mut self, quote: char) -> Result<Token, LexerError> {
        let mut chars = Vec::new();
        self.read_char(); // consume opening quote

        while self.ch != quote && self.ch != '\0' && self.ch != '\n' {
            if self.ch != '\\' {
                chars.push(self.ch);
                self.read_char();
                continue;
            }
            self.read_char(); // consume backslash
            if quote == '"' {
                chars.push(self.read_escape_sequence()?);
            } else if self.ch == '\\' || self.ch == '\'' {
                chars.push(self.ch);
                self.read_char();
            } else {
                chars.push('\\');
            }
        }

        if self.ch != quote {
            return Err(LexerError::UnterminatedString {
                line: self.token_start.line_number(),
                column: self.token_start.column_number(),
            });
        }

        self.read_char(); // consume closing quote
        Ok(self.make_token(TokenKind::String, chars.into_iter().collect()))
    }

    fn read_escape_sequence(&mut self) -> Result<char, LexerError> {
        let ch = self.ch;
        let pos = self.current_position();
        self.read_char();

        match ch {
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            '0' => Ok('\0'),
            'e' => Ok('\x1B'),
            '\\' => Ok('\\'),
            '"' => Ok('"'),
            '\'' => Ok('\''),
            _ => Err(LexerError::InvalidEscape {
                ch,
                line: pos.line_number(),
                column: pos.column_number(),
            }),
        }
    }

    fn read_operator(&mut self) -> Option<Token> {
        let ch = self.ch;
        let next = self.peek_char();

        let two_char = match (ch, next) {
            ('=', '=') => Some((TokenKind::Eq, "==")),
            ('=', '>') => Some((TokenKind::Arrow, "=>")),
            ('!', '=') => Some((TokenKind::NotEq, "!=")),
            ('<', '=') => Some((TokenKind::LtEquals, "<=")),
            ('>', '=') => Some((TokenKind::GtEquals, ">=")),
            ('+', '+') => Some((TokenKind::PlusPlus, "++")),
            ('-', '-') => Some((TokenKind::MinusMinus, "--")),
            (':', ':') => Some((TokenKind::ColonColon, "::")),
            _ => None,
        };

        if let Some((kind, literal)) = two_char {
            self.read_char();
            self.read_char();
            return Some(self.make_token(kind, literal.to_string()));
        }

        let single_char = match ch {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '!' => TokenKind::Bang,
            '<' => TokenKind::Lt,
            '>' => TokenKind::Gt,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Period,
            '|' => TokenKind::Pipe,
            _ => return None,
        };

        self.read_char();
        Some(self.make_token(single_char, ch.to_string()))
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Tokenize an input string into a vector of tokens ending with `Eof`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_identifiers_and_constants() {
        let tokens = tokenize("foo Bar _baz empty?").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].literal, "foo");
        assert_eq!(tokens[1].kind, TokenKind::Constant);
        assert_eq!(tokens[1].literal, "Bar");
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[2].literal, "_baz");
        assert_eq!(tokens[3].kind, TokenKind::Ident);
        assert_eq!(tokens[3].literal, "empty?");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("if else end def do self true false nil"),
            vec![
                TokenKind::If,
                TokenKind::Else,
                TokenKind::End,
                TokenKind::Def,
                TokenKind::Do,
                TokenKind::SelfKw,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Nil,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_integers() {
        let tokens = tokenize("42 0 123456789").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert_eq!(tokens[0].literal, "42");
        assert_eq!(tokens[1].literal, "0");
        assert_eq!(tokens[2].literal, "123456789");
    }

    #[test]
    fn test_integer_followed_by_method_call() {
        assert_eq!(
            kinds("1.times"),
            vec![
                TokenKind::Int,
                TokenKind::Period,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_invalid_number() {
        let result = tokenize("123abc");
        assert!(matches!(
            result,
            Err(LexerError::InvalidNumber { ref literal, .. }) if literal == "123a"
        ));
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#""testString" 'test_string' '!@#!@!$123'"#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, "testString");
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].literal, "test_string");
        assert_eq!(tokens[2].literal, "!@#!@!$123");
    }

    #[test]
    fn test_escape_sequences() {
        let tokens = tokenize(r#""hello\nworld" "tab\there" "q\"uote""#).unwrap();
        assert_eq!(tokens[0].literal, "hello\nworld");
        assert_eq!(tokens[1].literal, "tab\there");
        assert_eq!(tokens[2].literal, "q\"uote");
    }

    #[test]
    fn test_single_quoted_strings_keep_backslashes() {
        let tokens = tokenize(r"'a\nb' 'it\'s' 'c\\d'").unwrap();
        assert_eq!(tokens[0].literal, r"a\nb");
        assert_eq!(tokens[1].literal, "it's");
        assert_eq!(tokens[2].literal, r"c\d");
    }

    #[test]
    fn test_unterminated_string() {
        let result = tokenize(r#""hello"#);
        assert!(matches!(
            result,
            Err(LexerError::UnterminatedString { line: 1, column: 1 })
        ));
    }

    #[test]
    fn test_invalid_escape() {
        let result = tokenize(r#""\z""#);
        assert!(matches!(result, Err(LexerError::InvalidEscape { ch: 'z', .. })));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ - * / ! == != < > <= >= ++ -- :: =>"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Asterisk,
                TokenKind::Slash,
                TokenKind::Bang,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::LtEquals,
                TokenKind::GtEquals,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::ColonColon,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("( ) [ ] { } , ; : . |"),
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Colon,
                TokenKind::Period,
                TokenKind::Pipe,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_hash_key_shorthand() {
        assert_eq!(
            kinds("{ test: 123 }"),
            vec![
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Int,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_namespace_resolution() {
        let tokens = tokenize("Foo::Bar").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Constant);
        assert_eq!(tokens[1].kind, TokenKind::ColonColon);
        assert_eq!(tokens[2].kind, TokenKind::Constant);
    }

    #[test]
    fn test_lone_equals_is_illegal() {
        let tokens = tokenize("a = 1").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Illegal);
        assert_eq!(tokens[1].literal, "=");
    }

    #[test]
    fn test_comments() {
        let tokens = tokenize("foo # comment\nbar").unwrap();
        assert_eq!(tokens[0].literal, "foo");
        assert_eq!(tokens[1].kind, TokenKind::Newline);
        assert_eq!(tokens[2].literal, "bar");
    }

    #[test]
    fn test_crlf() {
        assert_eq!(
            kinds("foo\r\nbar"),
            vec![
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Ident,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_carriage_return_positions() {
        for input in ["foo\r\n  bar", "foo\r  bar"] {
            let tokens = tokenize(input).unwrap();
            assert_eq!(tokens[1].kind, TokenKind::Newline);
            assert_eq!(tokens[2].literal, "bar");
            assert_eq!(tokens[2].start.line, 1, "input: {:?}", input);
            assert_eq!(tokens[2].start.column, 2, "input: {:?}", input);
        }
    }

    #[test]
    fn test_position_tracking() {
        let tokens = tokenize("foo\n  bar").unwrap();
        assert_eq!(tokens[0].start.line, 0);
        assert_eq!(tokens[0].start.column, 0);
        assert_eq!(tokens[0].end.column, 3);
        assert_eq!(tokens[2].start.line, 1);
        assert_eq!(tokens[2].start.column, 2);
    }

    #[test]
    fn test_block_call() {
        assert_eq!(
            kinds("[1].each do |i| puts(i) end"),
            vec![
                TokenKind::LBracket,
                TokenKind::Int,
                TokenKind::RBracket,
                TokenKind::Period,
                TokenKind::Ident,
                TokenKind::Do,
                TokenKind::Pipe,
                TokenKind::Ident,
                TokenKind::Pipe,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::RParen,
                TokenKind::End,
                TokenKind::Eof,
            ]
        );
    }
}
