//! AST node types for the Goby parser.
//!
//! `Display` on every node prints canonical Goby source: parsing the printed
//! form of a tree yields the same tree again (up to positions).

use goby_lexer::{lookup_identifier, Position, TokenKind};
use std::fmt;

/// Method name used for index access: `a[i]` is `a.[](i)`.
pub const INDEX_METHOD: &str = "[]";

/// Base trait for all AST nodes.
pub trait Node: fmt::Display {
    fn pos(&self) -> Position;
    fn end(&self) -> Position;
}

// ============================================================================
// Expressions
// ============================================================================

/// Expression node enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(IntLit),
    String(StringLit),
    Bool(BoolLit),
    Nil(NilLit),
    Ident(Ident),
    Constant(Constant),
    SelfRef(SelfExpr),
    Prefix(Box<PrefixExpr>),
    Infix(Box<InfixExpr>),
    Array(ArrayLit),
    Hash(HashLit),
    Call(Box<CallExpr>),
    If(Box<IfExpr>),
}

impl Node for Expr {
    fn pos(&self) -> Position {
        match self {
            Expr::Int(e) => e.pos(),
            Expr::String(e) => e.pos(),
            Expr::Bool(e) => e.pos(),
            Expr::Nil(e) => e.pos(),
            Expr::Ident(e) => e.pos(),
            Expr::Constant(e) => e.pos(),
            Expr::SelfRef(e) => e.pos(),
            Expr::Prefix(e) => e.pos(),
            Expr::Infix(e) => e.pos(),
            Expr::Array(e) => e.pos(),
            Expr::Hash(e) => e.pos(),
            Expr::Call(e) => e.pos(),
            Expr::If(e) => e.pos(),
        }
    }

    fn end(&self) -> Position {
        match self {
            Expr::Int(e) => e.end(),
            Expr::String(e) => e.end(),
            Expr::Bool(e) => e.end(),
            Expr::Nil(e) => e.end(),
            Expr::Ident(e) => e.end(),
            Expr::Constant(e) => e.end(),
            Expr::SelfRef(e) => e.end(),
            Expr::Prefix(e) => e.end(),
            Expr::Infix(e) => e.end(),
            Expr::Array(e) => e.end(),
            Expr::Hash(e) => e.end(),
            Expr::Call(e) => e.end(),
            Expr::If(e) => e.end(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(e) => write!(f, "{}", e),
            Expr::String(e) => write!(f, "{}", e),
            Expr::Bool(e) => write!(f, "{}", e),
            Expr::Nil(e) => write!(f, "{}", e),
            Expr::Ident(e) => write!(f, "{}", e),
            Expr::Constant(e) => write!(f, "{}", e),
            Expr::SelfRef(e) => write!(f, "{}", e),
            Expr::Prefix(e) => write!(f, "{}", e),
            Expr::Infix(e) => write!(f, "{}", e),
            Expr::Array(e) => write!(f, "{}", e),
            Expr::Hash(e) => write!(f, "{}", e),
            Expr::Call(e) => write!(f, "{}", e),
            Expr::If(e) => write!(f, "{}", e),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// Statement node enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Def(DefStmt),
}

impl Node for Stmt {
    fn pos(&self) -> Position {
        match self {
            Stmt::Expr(e) => e.pos(),
            Stmt::Def(s) => s.pos(),
        }
    }

    fn end(&self) -> Position {
        match self {
            Stmt::Expr(e) => e.end(),
            Stmt::Def(s) => s.end(),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Expr(e) => write!(f, "{}", e),
            Stmt::Def(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// Literal Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct IntLit {
    pub position: Position,
    pub literal: String,
    pub value: i64,
}

impl Node for IntLit {
    fn pos(&self) -> Position {
        self.position
    }
    fn end(&self) -> Position {
        self.position.advance(self.literal.len())
    }
}

impl fmt::Display for IntLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    pub position: Position,
    pub value: String,
    pub end: Position,
}

impl Node for StringLit {
    fn pos(&self) -> Position {
        self.position
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl fmt::Display for StringLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, &self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLit {
    pub position: Position,
    pub value: bool,
}

impl Node for BoolLit {
    fn pos(&self) -> Position {
        self.position
    }
    fn end(&self) -> Position {
        let len = if self.value { 4 } else { 5 };
        self.position.advance(len)
    }
}

impl fmt::Display for BoolLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.value { "true" } else { "false" })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NilLit {
    pub position: Position,
}

impl Node for NilLit {
    fn pos(&self) -> Position {
        self.position
    }
    fn end(&self) -> Position {
        self.position.advance(3)
    }
}

impl fmt::Display for NilLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nil")
    }
}

// ============================================================================
// Names
// ============================================================================

/// A lower-case name: a local variable or a receiver-less method.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub position: Position,
    pub name: String,
}

impl Node for Ident {
    fn pos(&self) -> Position {
        self.position
    }
    fn end(&self) -> Position {
        self.position.advance(self.name.len())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// An upper-case name such as `Person` or the `Bar` in `Foo::Bar`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub position: Position,
    pub name: String,
}

impl Node for Constant {
    fn pos(&self) -> Position {
        self.position
    }
    fn end(&self) -> Position {
        self.position.advance(self.name.len())
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfExpr {
    pub position: Position,
}

impl SelfExpr {
    pub fn token_literal(&self) -> &'static str {
        "self"
    }
}

impl Node for SelfExpr {
    fn pos(&self) -> Position {
        self.position
    }
    fn end(&self) -> Position {
        self.position.advance(4)
    }
}

impl fmt::Display for SelfExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token_literal())
    }
}

// ============================================================================
// Operator Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpr {
    pub op_pos: Position,
    pub op: String,
    pub right: Expr,
}

impl Node for PrefixExpr {
    fn pos(&self) -> Position {
        self.op_pos
    }
    fn end(&self) -> Position {
        self.right.end()
    }
}

impl fmt::Display for PrefixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.op, self.right)
    }
}

/// Binary operator application, including namespace resolution (`::`).
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpr {
    pub left: Expr,
    pub op_pos: Position,
    pub op: String,
    pub right: Expr,
}

impl Node for InfixExpr {
    fn pos(&self) -> Position {
        self.left.pos()
    }
    fn end(&self) -> Position {
        self.right.end()
    }
}

impl fmt::Display for InfixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op == "::" {
            write!(f, "({}::{})", self.left, self.right)
        } else {
            write!(f, "({} {} {})", self.left, self.op, self.right)
        }
    }
}

// ============================================================================
// Collection Literals
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    pub lbrack: Position,
    pub items: Vec<Expr>,
    pub rbrack: Position,
}

impl Node for ArrayLit {
    fn pos(&self) -> Position {
        self.lbrack
    }
    fn end(&self) -> Position {
        self.rbrack.advance(1)
    }
}

impl fmt::Display for ArrayLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", join(&self.items, ", "))
    }
}

/// Hash literal. Keys are plain strings whichever way they were written
/// and are unique; pairs keep the order keys first appeared in.
#[derive(Debug, Clone, PartialEq)]
pub struct HashLit {
    pub lbrace: Position,
    pub pairs: Vec<(String, Expr)>,
    pub rbrace: Position,
}

impl HashLit {
    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Insert a pair. A repeated key replaces the earlier value in place and
    /// the replaced value is returned.
    pub(crate) fn insert(&mut self, key: String, value: Expr) -> Option<Expr> {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.pairs.push((key, value));
                None
            }
        }
    }
}

impl Node for HashLit {
    fn pos(&self) -> Position {
        self.lbrace
    }
    fn end(&self) -> Position {
        self.rbrace.advance(1)
    }
}

impl fmt::Display for HashLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pairs.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{ ")?;
        for (i, (key, value)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if is_shorthand_key(key) {
                write!(f, "{}: {}", key, value)?;
            } else {
                write_quoted(f, key)?;
                write!(f, " => {}", value)?;
            }
        }
        write!(f, " }}")
    }
}

// ============================================================================
// Calls
// ============================================================================

/// A method call.
///
/// Also the desugared form of index access (`a[i]`, method [`INDEX_METHOD`])
/// and of postfix `++`/`--` (method named after the operator, no arguments).
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    /// `None` for calls written without a receiver (`puts(1)`).
    pub receiver: Option<Expr>,
    pub method_pos: Position,
    pub method: String,
    pub args: Vec<Expr>,
    /// Parameters between pipes of a `do |a, b| ... end` block.
    pub block_params: Vec<Ident>,
    pub block: Option<Block>,
    pub end: Position,
}

impl CallExpr {
    fn is_index(&self) -> bool {
        self.method == INDEX_METHOD
            && self.receiver.is_some()
            && self.args.len() == 1
            && self.block.is_none()
    }

    fn is_postfix(&self) -> bool {
        (self.method == "++" || self.method == "--")
            && self.receiver.is_some()
            && self.args.is_empty()
            && self.block.is_none()
    }
}

impl Node for CallExpr {
    fn pos(&self) -> Position {
        self.receiver
            .as_ref()
            .map(|r| r.pos())
            .unwrap_or(self.method_pos)
    }
    fn end(&self) -> Position {
        self.end
    }
}

impl fmt::Display for CallExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(receiver) = &self.receiver {
            if self.is_index() {
                return write!(f, "{}[{}]", receiver, self.args[0]);
            }
            if self.is_postfix() {
                return write!(f, "({}{})", receiver, self.method);
            }
            write!(f, "{}.", receiver)?;
        }
        write!(f, "{}({})", self.method, join(&self.args, ", "))?;

        if let Some(block) = &self.block {
            write!(f, " do")?;
            if !self.block_params.is_empty() {
                write!(f, " |{}|", join(&self.block_params, ", "))?;
            }
            writeln!(f)?;
            write!(f, "{}end", block)?;
        }
        Ok(())
    }
}

// ============================================================================
// Control Flow
// ============================================================================

/// A sequence of statements closed by `end` (or `else`).
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub start: Position,
    pub stmts: Vec<Stmt>,
    pub end: Position,
}

impl Node for Block {
    fn pos(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

/// Each statement on its own line, newline-terminated.
impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            writeln!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub if_pos: Position,
    pub condition: Expr,
    pub consequence: Block,
    /// `None` when there is no `else`, as opposed to an empty `else`.
    pub alternative: Option<Block>,
    pub end_pos: Position,
}

impl Node for IfExpr {
    fn pos(&self) -> Position {
        self.if_pos
    }
    fn end(&self) -> Position {
        self.end_pos
    }
}

impl fmt::Display for IfExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "if {}", self.condition)?;
        write!(f, "{}", self.consequence)?;
        if let Some(alt) = &self.alternative {
            writeln!(f, "else")?;
            write!(f, "{}", alt)?;
        }
        write!(f, "end")
    }
}

// ============================================================================
// Definitions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DefStmt {
    pub def_pos: Position,
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
    pub end_pos: Position,
}

impl Node for DefStmt {
    fn pos(&self) -> Position {
        self.def_pos
    }
    fn end(&self) -> Position {
        self.end_pos
    }
}

impl fmt::Display for DefStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {}", self.name)?;
        if !self.params.is_empty() {
            write!(f, "({})", join(&self.params, ", "))?;
        }
        writeln!(f)?;
        write!(f, "{}end", self.body)
    }
}

// ============================================================================
// Program
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Node for Program {
    fn pos(&self) -> Position {
        self.stmts.first().map(|s| s.pos()).unwrap_or_default()
    }
    fn end(&self) -> Position {
        self.stmts.last().map(|s| s.end()).unwrap_or_default()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join(&self.stmts, "\n"))
    }
}

// ============================================================================
// Printing helpers
// ============================================================================

fn join<T: fmt::Display>(items: &[T], sep: &str) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            '\0' => write!(f, "\\0")?,
            '\x1B' => write!(f, "\\e")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

/// Keys that can be written as `key: value`.
fn is_shorthand_key(key: &str) -> bool {
    let mut chars = key.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_');
    starts_ok
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && lookup_identifier(key) == TokenKind::Ident
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64) -> Expr {
        Expr::Int(IntLit {
            position: Position::default(),
            literal: value.to_string(),
            value,
        })
    }

    fn ident(name: &str) -> Expr {
        Expr::Ident(Ident {
            position: Position::default(),
            name: name.to_string(),
        })
    }

    fn call(receiver: Option<Expr>, method: &str, args: Vec<Expr>) -> CallExpr {
        CallExpr {
            receiver,
            method_pos: Position::default(),
            method: method.to_string(),
            args,
            block_params: vec![],
            block: None,
            end: Position::default(),
        }
    }

    #[test]
    fn test_hash_insert_replaces_in_place() {
        let mut hash = HashLit {
            lbrace: Position::default(),
            pairs: vec![],
            rbrace: Position::default(),
        };
        assert!(hash.insert("a".into(), int(1)).is_none());
        assert!(hash.insert("b".into(), int(2)).is_none());
        assert_eq!(hash.insert("a".into(), int(3)), Some(int(1)));
        assert_eq!(hash.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(hash.get("a"), Some(&int(3)));
        assert_eq!(hash.len(), 2);
    }

    #[test]
    fn test_hash_display_quotes_non_identifier_keys() {
        let hash = HashLit {
            lbrace: Position::default(),
            pairs: vec![
                ("test".into(), int(1)),
                ("two words".into(), int(2)),
                ("end".into(), int(3)),
                ("Foo".into(), int(4)),
            ],
            rbrace: Position::default(),
        };
        assert_eq!(
            hash.to_string(),
            r#"{ test: 1, "two words" => 2, "end" => 3, "Foo" => 4 }"#
        );
    }

    #[test]
    fn test_call_display_forms() {
        let index = call(Some(ident("arr")), INDEX_METHOD, vec![int(0)]);
        assert_eq!(index.to_string(), "arr[0]");

        let postfix = call(Some(ident("i")), "++", vec![]);
        assert_eq!(postfix.to_string(), "(i++)");

        let bare = call(None, "puts", vec![int(1), int(2)]);
        assert_eq!(bare.to_string(), "puts(1, 2)");

        let mut with_block = call(Some(ident("list")), "each", vec![]);
        with_block.block_params = vec![Ident {
            position: Position::default(),
            name: "i".into(),
        }];
        with_block.block = Some(Block {
            start: Position::default(),
            stmts: vec![Stmt::Expr(Expr::Call(Box::new(call(
                None,
                "puts",
                vec![ident("i")],
            ))))],
            end: Position::default(),
        });
        assert_eq!(with_block.to_string(), "list.each() do |i|\nputs(i)\nend");
    }

    #[test]
    fn test_string_display_escapes() {
        let lit = StringLit {
            position: Position::default(),
            value: "say \"hi\"\n".into(),
            end: Position::default(),
        };
        assert_eq!(lit.to_string(), r#""say \"hi\"\n""#);
    }

    #[test]
    fn test_self_token_literal() {
        let expr = SelfExpr {
            position: Position::default(),
        };
        assert_eq!(expr.token_literal(), "self");
        assert_eq!(expr.end().column, 4);
    }
}
