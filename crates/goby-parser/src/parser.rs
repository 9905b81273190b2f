//! Pratt parser for Goby.

use crate::ast::*;
use crate::error::ParserError;
use crate::precedence::Precedence;
use goby_lexer::{Lexer, Position, Token, TokenKind, TokenSource};
use log::{debug, trace};

type PrefixParseFn<S> = fn(&mut Parser<S>) -> Option<Expr>;
type InfixParseFn<S> = fn(&mut Parser<S>, Expr) -> Option<Expr>;

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Deepest nesting of statements, blocks and expressions accepted
    /// before `MaxDepth` is reported.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_depth: 500 }
    }
}

/// Pratt parser over any [`TokenSource`].
///
/// Parsing never fails outright: syntax errors are collected and the
/// parser resynchronizes at the next statement boundary, so a single pass
/// reports every independent error alongside a best-effort tree.
pub struct Parser<S: TokenSource = Lexer> {
    source: S,
    cur_token: Token,
    peek_token: Token,
    /// End of the most recently consumed token.
    last_end: Position,
    /// Kind of the most recently consumed token.
    prev_kind: TokenKind,
    /// Cleared while paren-less arguments are parsed, so a trailing `do`
    /// belongs to the outer call rather than to the last argument.
    blocks_allowed: bool,
    /// Set once the source has failed; only `Eof` is produced afterwards.
    exhausted: bool,
    errors: Vec<ParserError>,
    config: ParserConfig,
    depth: usize,
}

impl Parser {
    /// Create a parser over source text with the default configuration.
    pub fn new(input: &str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    pub fn with_config(input: &str, config: ParserConfig) -> Self {
        Self::from_source(Lexer::new(input), config)
    }
}

impl<S: TokenSource> Parser<S> {
    /// Create a parser that pulls tokens from `source`.
    pub fn from_source(source: S, config: ParserConfig) -> Self {
        let start = Position::default();
        let placeholder = Token::new(TokenKind::Eof, "", start, start);
        let mut parser = Self {
            source,
            cur_token: placeholder.clone(),
            peek_token: placeholder,
            last_end: start,
            prev_kind: TokenKind::Eof,
            blocks_allowed: true,
            exhausted: false,
            errors: Vec::new(),
            config,
            depth: 0,
        };
        parser.next_token();
        parser.next_token();
        parser.last_end = start;
        parser.prev_kind = TokenKind::Eof;
        parser
    }

    /// Get all parse errors, in the order they were found.
    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParserError> {
        self.errors
    }

    fn pull_token(&mut self) -> Token {
        let at = self.peek_token.end;
        if self.exhausted {
            return Token::new(TokenKind::Eof, "", at, at);
        }
        match self.source.next_token() {
            Ok(tok) => tok,
            Err(err) => {
                self.exhausted = true;
                self.record(err.into());
                Token::new(TokenKind::Eof, "", at, at)
            }
        }
    }

    fn next_token(&mut self) {
        let next = self.pull_token();
        self.last_end = self.cur_token.end;
        self.prev_kind = self.cur_token.kind;
        self.cur_token = std::mem::replace(&mut self.peek_token, next);
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    fn cur_precedence(&self) -> Precedence {
        Precedence::from_token(self.cur_token.kind)
    }

    fn record(&mut self, err: ParserError) {
        debug!("syntax error: {}", err);
        self.errors.push(err);
    }

    /// Enter one level of nesting. Past the configured limit this records
    /// `MaxDepth` and returns false without entering.
    fn enter(&mut self) -> bool {
        if self.depth >= self.config.max_depth {
            let err = ParserError::max_depth(self.cur_token.start);
            self.record(err);
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn with_blocks<T>(&mut self, allowed: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.blocks_allowed, allowed);
        let out = f(self);
        self.blocks_allowed = saved;
        out
    }

    fn unexpected(&mut self, expected: &str) {
        let err = ParserError::unexpected(expected, &self.cur_token);
        self.record(err);
    }

    /// Consume the current token if it is `kind`, otherwise record an error
    /// and leave it in place.
    fn expect(&mut self, kind: TokenKind) -> bool {
        if self.cur_token_is(kind) {
            self.next_token();
            true
        } else {
            self.unexpected(&format!("'{}'", kind));
            false
        }
    }

    fn eat_newlines(&mut self) {
        while self.cur_token_is(TokenKind::Newline) {
            self.next_token();
        }
    }

    fn eat_separators(&mut self) {
        while self.cur_token_is(TokenKind::Newline) || self.cur_token_is(TokenKind::Semicolon) {
            self.next_token();
        }
    }

    /// Skip to the next statement boundary. Separators are left for the
    /// caller; `end` and `else` are left for the enclosing block.
    fn synchronize(&mut self) {
        while !self.cur_token.kind.is_statement_end()
            && !self.cur_token_is(TokenKind::End)
            && !self.cur_token_is(TokenKind::Else)
        {
            self.next_token();
        }
    }

    /// Parse the entire program.
    pub fn parse_program(&mut self) -> Program {
        let mut stmts = Vec::new();

        self.eat_separators();
        while !self.cur_token_is(TokenKind::Eof) {
            let start = self.cur_token.start;
            let errors_before = self.errors.len();
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            }
            self.finish_statement(errors_before, false);
            self.ensure_progress(start);
            self.eat_separators();
        }

        debug!(
            "parsed {} statements with {} errors",
            stmts.len(),
            self.errors.len()
        );
        Program { stmts }
    }

    // =========================================================================
    // Statement Parsing
    // =========================================================================

    fn parse_statement(&mut self) -> Option<Stmt> {
        trace!("statement at {}: {}", self.cur_token.start, self.cur_token.describe());
        if !self.enter() {
            self.skip_nested();
            return None;
        }
        let stmt = match self.cur_token.kind {
            TokenKind::Def => self.parse_def().map(Stmt::Def),
            _ => self.parse_expression(Precedence::Lowest).map(Stmt::Expr),
        };
        self.leave();
        stmt
    }

    /// Skip what remains of a construct nested past the depth limit,
    /// stopping at the `end` or `else` that closes it.
    fn skip_nested(&mut self) {
        let mut open = 0usize;
        loop {
            match self.cur_token.kind {
                TokenKind::Eof => return,
                TokenKind::Def | TokenKind::Do | TokenKind::If => open += 1,
                TokenKind::End | TokenKind::Else if open == 0 => return,
                TokenKind::End => open -= 1,
                _ => {}
            }
            self.next_token();
        }
    }

    /// Check that a statement ended where it should. Trailing tokens are an
    /// error unless the statement already reported one.
    fn finish_statement(&mut self, errors_before: usize, in_block: bool) {
        if self.cur_token.kind.is_statement_end() {
            return;
        }
        if in_block && (self.cur_token_is(TokenKind::End) || self.cur_token_is(TokenKind::Else)) {
            return;
        }
        if self.errors.len() == errors_before {
            self.unexpected("end of statement");
        }
        self.synchronize();
    }

    /// Skip the current token if a statement starting at `start` consumed
    /// nothing, which happens when the depth limit is hit immediately.
    fn ensure_progress(&mut self, start: Position) {
        if self.cur_token.start == start && !self.cur_token_is(TokenKind::Eof) {
            self.next_token();
        }
    }

    /// Statements up to (not including) one of `terminators` or `Eof`.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> Block {
        let start = self.cur_token.start;
        let stmts = if self.enter() {
            let stmts = self.with_blocks(true, |p| p.parse_statements(terminators));
            self.leave();
            stmts
        } else {
            self.skip_nested();
            Vec::new()
        };

        Block {
            start,
            stmts,
            end: self.cur_token.start,
        }
    }

    fn parse_statements(&mut self, terminators: &[TokenKind]) -> Vec<Stmt> {
        let mut stmts = Vec::new();

        self.eat_separators();
        while !terminators.contains(&self.cur_token.kind) && !self.cur_token_is(TokenKind::Eof) {
            let stmt_start = self.cur_token.start;
            let errors_before = self.errors.len();
            if let Some(stmt) = self.parse_statement() {
                stmts.push(stmt);
            }
            self.finish_statement(errors_before, true);
            self.ensure_progress(stmt_start);
            self.eat_separators();
        }
        stmts
    }

    fn parse_def(&mut self) -> Option<DefStmt> {
        let def_pos = self.cur_token.start;
        self.next_token();

        if !self.cur_token_is(TokenKind::Ident) {
            self.unexpected("method name");
            return None;
        }
        let name = Ident {
            position: self.cur_token.start,
            name: self.cur_token.literal.clone(),
        };
        self.next_token();

        let params = if self.cur_token_is(TokenKind::LParen) {
            self.parse_parameters(TokenKind::RParen)
        } else {
            Vec::new()
        };

        let body = self.parse_block(&[TokenKind::End]);
        self.expect(TokenKind::End);

        Some(DefStmt {
            def_pos,
            name,
            params,
            body,
            end_pos: self.last_end,
        })
    }

    /// Identifiers between the current opening token and `close`.
    fn parse_parameters(&mut self, close: TokenKind) -> Vec<Ident> {
        self.next_token();
        let mut params = Vec::new();

        while !self.cur_token_is(close) && !self.cur_token_is(TokenKind::Eof) {
            if !self.cur_token_is(TokenKind::Ident) {
                self.unexpected("parameter name");
                return params;
            }
            params.push(Ident {
                position: self.cur_token.start,
                name: self.cur_token.literal.clone(),
            });
            self.next_token();
            if !self.cur_token_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
        }

        self.expect(close);
        params
    }

    // =========================================================================
    // Expression Parsing
    // =========================================================================

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        if !self.enter() {
            return None;
        }
        let expr = self.parse_expression_inner(precedence);
        self.leave();
        expr
    }

    fn parse_expression_inner(&mut self, precedence: Precedence) -> Option<Expr> {
        trace!(
            "expression at {} ({:?}): {}",
            self.cur_token.start,
            precedence,
            self.cur_token.describe()
        );

        let Some(prefix_fn) = self.get_prefix_fn(self.cur_token.kind) else {
            let err = ParserError::no_prefix_parser(&self.cur_token);
            self.record(err);
            // Separators stay put so the statement loop still sees them.
            if !self.cur_token.kind.is_statement_end() {
                self.next_token();
            }
            return None;
        };

        let mut left = prefix_fn(self)?;

        loop {
            if self.cur_token_is(TokenKind::Eof) {
                break;
            }

            // A leading `.` on the next line continues a call chain.
            if self.cur_token_is(TokenKind::Newline) {
                if self.peek_token_is(TokenKind::Period) {
                    self.next_token();
                    continue;
                }
                break;
            }

            if precedence >= self.cur_precedence() {
                break;
            }

            let Some(infix_fn) = self.get_infix_fn(self.cur_token.kind) else {
                break;
            };

            left = infix_fn(self, left)?;
        }

        Some(left)
    }

    fn get_prefix_fn(&self, kind: TokenKind) -> Option<PrefixParseFn<S>> {
        match kind {
            TokenKind::Ident => Some(Self::parse_ident),
            TokenKind::Constant => Some(Self::parse_constant),
            TokenKind::Int => Some(Self::parse_int),
            TokenKind::String => Some(Self::parse_string),
            TokenKind::True | TokenKind::False => Some(Self::parse_bool),
            TokenKind::Nil => Some(Self::parse_nil),
            TokenKind::SelfKw => Some(Self::parse_self),
            TokenKind::Bang | TokenKind::Minus => Some(Self::parse_prefix),
            TokenKind::LParen => Some(Self::parse_grouped),
            TokenKind::LBracket => Some(Self::parse_array),
            TokenKind::LBrace => Some(Self::parse_hash),
            TokenKind::If => Some(Self::parse_if),
            TokenKind::Plus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEquals
            | TokenKind::GtEquals
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::ColonColon
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Colon
            | TokenKind::Period
            | TokenKind::Pipe
            | TokenKind::Arrow
            | TokenKind::Else
            | TokenKind::End
            | TokenKind::Def
            | TokenKind::Do
            | TokenKind::Newline
            | TokenKind::Eof
            | TokenKind::Illegal => None,
        }
    }

    fn get_infix_fn(&self, kind: TokenKind) -> Option<InfixParseFn<S>> {
        match kind {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Asterisk
            | TokenKind::Slash
            | TokenKind::Eq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::LtEquals
            | TokenKind::GtEquals
            | TokenKind::ColonColon => Some(Self::parse_infix),
            TokenKind::PlusPlus | TokenKind::MinusMinus => Some(Self::parse_postfix),
            TokenKind::LBracket => Some(Self::parse_index),
            TokenKind::LParen => Some(Self::parse_call),
            TokenKind::Period => Some(Self::parse_method_call),
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
            | TokenKind::Illegal => None,
        }
    }

    // =========================================================================
    // Literal Parsing
    // =========================================================================

    fn parse_ident(&mut self) -> Option<Expr> {
        let ident = Ident {
            position: self.cur_token.start,
            name: self.cur_token.literal.clone(),
        };
        self.next_token();

        // `puts i` and `loop do ... end` are calls without parentheses.
        if self.blocks_allowed && self.cur_token_is(TokenKind::Do) {
            return Some(self.finish_call(None, ident.position, ident.name, Vec::new()));
        }
        if self.starts_bare_argument() {
            let args = self.parse_bare_arguments();
            return Some(self.finish_call(None, ident.position, ident.name, args));
        }

        Some(Expr::Ident(ident))
    }

    fn parse_constant(&mut self) -> Option<Expr> {
        let constant = Constant {
            position: self.cur_token.start,
            name: self.cur_token.literal.clone(),
        };
        self.next_token();
        Some(Expr::Constant(constant))
    }

    fn parse_int(&mut self) -> Option<Expr> {
        let position = self.cur_token.start;
        let literal = self.cur_token.literal.clone();
        self.next_token();

        match literal.parse::<i64>() {
            Ok(value) => Some(Expr::Int(IntLit {
                position,
                literal,
                value,
            })),
            Err(_) => {
                self.record(ParserError::malformed(literal, "integer", position));
                None
            }
        }
    }

    fn parse_string(&mut self) -> Option<Expr> {
        let lit = StringLit {
            position: self.cur_token.start,
            value: self.cur_token.literal.clone(),
            end: self.cur_token.end,
        };
        self.next_token();
        Some(Expr::String(lit))
    }

    fn parse_bool(&mut self) -> Option<Expr> {
        let lit = BoolLit {
            position: self.cur_token.start,
            value: self.cur_token_is(TokenKind::True),
        };
        self.next_token();
        Some(Expr::Bool(lit))
    }

    fn parse_nil(&mut self) -> Option<Expr> {
        let lit = NilLit {
            position: self.cur_token.start,
        };
        self.next_token();
        Some(Expr::Nil(lit))
    }

    fn parse_self(&mut self) -> Option<Expr> {
        let expr = SelfExpr {
            position: self.cur_token.start,
        };
        self.next_token();
        Some(Expr::SelfRef(expr))
    }

    // =========================================================================
    // Operator Parsing
    // =========================================================================

    fn parse_prefix(&mut self) -> Option<Expr> {
        let op_pos = self.cur_token.start;
        let op = self.cur_token.literal.clone();
        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::Prefix(Box::new(PrefixExpr { op_pos, op, right })))
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let op_pos = self.cur_token.start;
        let op = self.cur_token.literal.clone();
        let precedence = self.cur_precedence();
        self.next_token();
        self.eat_newlines();

        let right = self.parse_expression(precedence)?;
        Some(Expr::Infix(Box::new(InfixExpr {
            left,
            op_pos,
            op,
            right,
        })))
    }

    /// `x++` is the call `x.++()`.
    fn parse_postfix(&mut self, left: Expr) -> Option<Expr> {
        let method_pos = self.cur_token.start;
        let method = self.cur_token.literal.clone();
        self.next_token();

        Some(Expr::Call(Box::new(CallExpr {
            receiver: Some(left),
            method_pos,
            method,
            args: Vec::new(),
            block_params: Vec::new(),
            block: None,
            end: self.last_end,
        })))
    }

    /// `a[i]` is the call `a.[](i)`.
    fn parse_index(&mut self, left: Expr) -> Option<Expr> {
        let method_pos = self.cur_token.start;
        self.next_token();
        self.eat_newlines();

        let index = self.with_blocks(true, |p| p.parse_expression(Precedence::Lowest))?;
        self.eat_newlines();
        self.expect(TokenKind::RBracket);

        Some(Expr::Call(Box::new(CallExpr {
            receiver: Some(left),
            method_pos,
            method: INDEX_METHOD.to_string(),
            args: vec![index],
            block_params: Vec::new(),
            block: None,
            end: self.last_end,
        })))
    }

    // =========================================================================
    // Grouping and Collections
    // =========================================================================

    fn parse_grouped(&mut self) -> Option<Expr> {
        self.next_token();
        self.eat_newlines();

        let expr = self.with_blocks(true, |p| p.parse_expression(Precedence::Lowest))?;
        self.eat_newlines();
        self.expect(TokenKind::RParen);
        Some(expr)
    }

    /// Comma-separated expressions after an opening token, through `close`.
    /// Returns the items and the position of the closing token.
    fn parse_expression_list(&mut self, close: TokenKind) -> (Vec<Expr>, Position) {
        self.next_token();
        self.eat_newlines();

        let mut items = Vec::new();
        while !self.cur_token_is(close) && !self.cur_token_is(TokenKind::Eof) {
            match self.with_blocks(true, |p| p.parse_expression(Precedence::Lowest)) {
                Some(item) => items.push(item),
                None => break,
            }
            self.eat_newlines();
            if !self.cur_token_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
            self.eat_newlines();
        }

        let close_pos = self.cur_token.start;
        self.expect(close);
        (items, close_pos)
    }

    fn parse_array(&mut self) -> Option<Expr> {
        let lbrack = self.cur_token.start;
        let (items, rbrack) = self.parse_expression_list(TokenKind::RBracket);
        Some(Expr::Array(ArrayLit {
            lbrack,
            items,
            rbrack,
        }))
    }

    fn parse_hash(&mut self) -> Option<Expr> {
        let lbrace = self.cur_token.start;
        self.next_token();
        self.eat_newlines();

        let mut hash = HashLit {
            lbrace,
            pairs: Vec::new(),
            rbrace: lbrace,
        };

        while !self.cur_token_is(TokenKind::RBrace) && !self.cur_token_is(TokenKind::Eof) {
            let Some(key) = self.parse_hash_key() else {
                break;
            };
            self.eat_newlines();
            let Some(value) = self.with_blocks(true, |p| p.parse_expression(Precedence::Lowest)) else {
                break;
            };
            if hash.insert(key.clone(), value).is_some() {
                debug!("duplicate hash key {:?}; keeping the last value", key);
            }

            self.eat_newlines();
            if !self.cur_token_is(TokenKind::Comma) {
                break;
            }
            self.next_token();
            self.eat_newlines();
        }

        hash.rbrace = self.cur_token.start;
        self.expect(TokenKind::RBrace);
        Some(Expr::Hash(hash))
    }

    /// `name:` or `"string" =>`.
    fn parse_hash_key(&mut self) -> Option<String> {
        let separator = match self.cur_token.kind {
            TokenKind::Ident | TokenKind::Constant => TokenKind::Colon,
            TokenKind::String => TokenKind::Arrow,
            _ => {
                self.unexpected("hash key");
                return None;
            }
        };
        let key = self.cur_token.literal.clone();
        self.next_token();

        if self.expect(separator) {
            Some(key)
        } else {
            None
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    fn starts_bare_argument(&self) -> bool {
        matches!(
            self.cur_token.kind,
            TokenKind::Ident
                | TokenKind::Constant
                | TokenKind::Int
                | TokenKind::String
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Nil
                | TokenKind::SelfKw
        )
    }

    /// Arguments written without parentheses: `puts a, b`.
    fn parse_bare_arguments(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        loop {
            if let Some(arg) = self.with_blocks(false, |p| p.parse_expression(Precedence::Lowest)) {
                args.push(arg);
            }
            if !self.cur_token_is(TokenKind::Comma) {
                return args;
            }
            self.next_token();
            self.eat_newlines();
        }
    }

    /// `foo(args)`: only a bare name can be called this way, so `(a)(1)`
    /// is rejected even though the grouping leaves a plain identifier.
    fn parse_call(&mut self, left: Expr) -> Option<Expr> {
        let named = matches!(self.prev_kind, TokenKind::Ident | TokenKind::Constant);
        let (method_pos, method) = match left {
            Expr::Ident(ident) if named => (ident.position, ident.name),
            Expr::Constant(constant) if named => (constant.position, constant.name),
            _ => {
                self.unexpected("method name before '('");
                return None;
            }
        };

        let (args, _) = self.parse_expression_list(TokenKind::RParen);
        Some(self.finish_call(None, method_pos, method, args))
    }

    /// `recv.method`, `recv.method(args)`, `recv.method args`.
    fn parse_method_call(&mut self, receiver: Expr) -> Option<Expr> {
        self.next_token();

        if !self.cur_token_is(TokenKind::Ident) && !self.cur_token_is(TokenKind::Constant) {
            self.unexpected("method name");
            return None;
        }
        let method_pos = self.cur_token.start;
        let method = self.cur_token.literal.clone();
        self.next_token();

        let args = if self.cur_token_is(TokenKind::LParen) {
            self.parse_expression_list(TokenKind::RParen).0
        } else if self.starts_bare_argument() {
            self.parse_bare_arguments()
        } else {
            Vec::new()
        };

        Some(self.finish_call(Some(receiver), method_pos, method, args))
    }

    /// Build a call, attaching a trailing `do ... end` block if present.
    fn finish_call(
        &mut self,
        receiver: Option<Expr>,
        method_pos: Position,
        method: String,
        args: Vec<Expr>,
    ) -> Expr {
        let mut call = CallExpr {
            receiver,
            method_pos,
            method,
            args,
            block_params: Vec::new(),
            block: None,
            end: self.last_end,
        };

        if self.blocks_allowed && self.cur_token_is(TokenKind::Do) {
            trace!("block for {} at {}", call.method, self.cur_token.start);
            self.next_token();
            if self.cur_token_is(TokenKind::Pipe) {
                call.block_params = self.parse_parameters(TokenKind::Pipe);
            }
            call.block = Some(self.parse_block(&[TokenKind::End]));
            self.expect(TokenKind::End);
            call.end = self.last_end;
        }

        Expr::Call(Box::new(call))
    }

    // =========================================================================
    // Control Flow
    // =========================================================================

    fn parse_if(&mut self) -> Option<Expr> {
        let if_pos = self.cur_token.start;
        self.next_token();

        // The body is consumed even when the condition is bad, so the
        // closing `end` is not reported a second time.
        let condition = self.parse_expression(Precedence::Lowest);
        let consequence = self.parse_block(&[TokenKind::Else, TokenKind::End]);
        let alternative = if self.cur_token_is(TokenKind::Else) {
            self.next_token();
            Some(self.parse_block(&[TokenKind::End]))
        } else {
            None
        };
        self.expect(TokenKind::End);

        Some(Expr::If(Box::new(IfExpr {
            if_pos,
            condition: condition?,
            consequence,
            alternative,
            end_pos: self.last_end,
        })))
    }
}

/// Parse source code into an AST along with every syntax error found.
pub fn parse(source: &str) -> (Program, Vec<ParserError>) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    (program, parser.into_errors())
}
