//! Goby lexer - tokenization for the Goby scripting language.
//!
//! This crate turns source text into the token stream consumed by the
//! parser. The parser only depends on the [`TokenSource`] trait, so tokens
//! may also come from a pre-built [`TokenStream`].
//!
//! # Example
//!
//! ```
//! use goby_lexer::{Lexer, TokenKind};
//!
//! let mut lexer = Lexer::new("Foo::Bar");
//! let token = lexer.next_token().unwrap();
//! assert_eq!(token.kind, TokenKind::Constant);
//! ```

pub mod lexer;
pub mod source;
pub mod token;

pub use lexer::{tokenize, Lexer, LexerError};
pub use source::{TokenSource, TokenStream};
pub use token::{lookup_identifier, Position, Token, TokenKind};
