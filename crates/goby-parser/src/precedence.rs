//! Operator precedence levels for Pratt parsing.

use goby_lexer::TokenKind;

/// Precedence levels (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precedence {
    Lowest = 1,
    Equals = 2,      // == !=
    LessGreater = 3, // > < >= <=
    Sum = 4,         // + -
    Product = 5,     // * /
    Prefix = 6,      // -X !X
    Postfix = 7,     // x++ x-- x[i]
    Call = 8,        // recv.method foo()
    Resolution = 9,  // Foo::Bar
}

impl Precedence {
    /// Get the precedence for a token kind. Kinds that never continue an
    /// expression map to `Lowest`.
    pub const fn from_token(kind: TokenKind) -> Self {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEquals | TokenKind::GtEquals => {
                Precedence::LessGreater
            }
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::PlusPlus | TokenKind::MinusMinus | TokenKind::LBracket => {
                Precedence::Postfix
            }
            TokenKind::Period | TokenKind::LParen => Precedence::Call,
            TokenKind::ColonColon => Precedence::Resolution,
            TokenKind::Int
            | TokenKind::String
            | TokenKind::Ident
            | TokenKind::Constant
            | TokenKind::Bang
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Colon
            | TokenKind::Pipe
            | TokenKind::Arrow
            | TokenKind::If
            | TokenKind::Else
            | TokenKind::End
            | TokenKind::Def
            | TokenKind::Do
            | TokenKind::SelfKw
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Nil
            | TokenKind::Newline
            | TokenKind::Eof
            | TokenKind::Illegal => Precedence::Lowest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Precedence::Lowest < Precedence::Equals);
        assert!(Precedence::Equals < Precedence::LessGreater);
        assert!(Precedence::Sum < Precedence::Product);
        assert!(Precedence::Prefix < Precedence::Postfix);
        assert!(Precedence::Postfix < Precedence::Call);
        assert!(Precedence::Call < Precedence::Resolution);
    }

    #[test]
    fn test_from_token() {
        assert_eq!(Precedence::from_token(TokenKind::Eq), Precedence::Equals);
        assert_eq!(Precedence::from_token(TokenKind::GtEquals), Precedence::LessGreater);
        assert_eq!(Precedence::from_token(TokenKind::Minus), Precedence::Sum);
        assert_eq!(Precedence::from_token(TokenKind::Slash), Precedence::Product);
        assert_eq!(Precedence::from_token(TokenKind::LBracket), Precedence::Postfix);
        assert_eq!(Precedence::from_token(TokenKind::Period), Precedence::Call);
        assert_eq!(Precedence::from_token(TokenKind::ColonColon), Precedence::Resolution);
        assert_eq!(Precedence::from_token(TokenKind::Do), Precedence::Lowest);
    }
}
