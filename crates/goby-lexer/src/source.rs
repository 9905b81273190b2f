//! Token sources consumed by the parser.

use crate::lexer::{Lexer, LexerError};
use crate::token::{Position, Token, TokenKind};
use std::collections::VecDeque;

/// A finite stream of tokens terminated by `Eof`.
///
/// Once the end is reached, every further call returns an `Eof` token.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, LexerError>;
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Result<Token, LexerError> {
        Lexer::next_token(self)
    }
}

/// A token source over tokens that were produced ahead of time.
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
    last: Position,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into(),
            last: Position::default(),
        }
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl TokenSource for TokenStream {
    fn next_token(&mut self) -> Result<Token, LexerError> {
        match self.tokens.pop_front() {
            Some(tok) => {
                self.last = tok.end;
                Ok(tok)
            }
            None => Ok(Token::new(TokenKind::Eof, "", self.last, self.last)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    #[test]
    fn test_stream_yields_eof_after_end() {
        let pos = Position::default();
        let mut stream = TokenStream::new(vec![Token::new(TokenKind::Int, "1", pos, pos.advance(1))]);
        assert_eq!(stream.next_token().unwrap().kind, TokenKind::Int);
        let eof = stream.next_token().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.start.column, 1);
        assert_eq!(stream.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_stream_matches_lexer() {
        let tokens = tokenize("foo.bar(1)").unwrap();
        let mut stream = TokenStream::from(tokens.clone());
        let mut lexer = Lexer::new("foo.bar(1)");
        for expected in &tokens {
            assert_eq!(&TokenSource::next_token(&mut stream).unwrap(), expected);
            assert_eq!(&TokenSource::next_token(&mut lexer).unwrap(), expected);
        }
    }
}
