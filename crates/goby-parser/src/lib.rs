//! Goby parser - AST construction for the Goby scripting language.
//!
//! This crate turns a token stream into an AST with a Pratt parser.
//! Syntax errors never stop a parse; they are collected and returned next
//! to a best-effort tree.
//!
//! # Example
//!
//! ```
//! use goby_parser::{parse, Expr, Stmt};
//!
//! let (program, errors) = parse("[1, 2, 3].each do |i|\n  puts(i)\nend");
//! assert!(errors.is_empty());
//! assert!(matches!(&program.stmts[0], Stmt::Expr(Expr::Call(call)) if call.method == "each"));
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod precedence;

pub use ast::*;
pub use error::ParserError;
pub use parser::{parse, Parser, ParserConfig};
pub use precedence::Precedence;
