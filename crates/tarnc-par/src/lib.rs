//! tarnc-par - Parser and AST
//!
//! A hand-written recursive-descent parser over the token stream from
//! `tarnc-lex`. The grammar is small enough that one token of lookahead
//! (two for distinguishing `struct T x;` from `struct T { ... };`)
//! covers every decision point.
//!
//! Error handling follows the rest of the compiler: syntax errors go to
//! the shared diagnostic handler and the parser resynchronizes at the
//! next declaration or statement boundary, so one compile reports as
//! many syntax problems as it can. There is no error *recovery* in the
//! tree: a declaration that failed to parse is simply absent from the
//! program.
//!
//! The parser fills none of the annotation fields; see
//! [`ast`] for which pass owns which annotation.

pub mod ast;
mod expr;
mod stmt;
pub mod unparse;

#[cfg(test)]
mod edge_cases;

pub use ast::Program;
pub use unparse::unparse;

use ast::*;
use tarnc_lex::Token;
use tarnc_util::{Handler, Span};

/// Recursive-descent parser over a lexed token stream.
pub struct Parser<'a> {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    pub(crate) handler: &'a Handler,
}

impl<'a> Parser<'a> {
    /// Create a parser over `tokens`, reporting through `handler`.
    ///
    /// The stream is expected to end with [`Token::Eof`] (as produced by
    /// [`tarnc_lex::tokenize`]); a missing terminator is tolerated.
    pub fn new(tokens: Vec<(Token, Span)>, handler: &'a Handler) -> Self {
        let mut tokens = tokens;
        if !matches!(tokens.last(), Some((Token::Eof, _))) {
            let span = tokens.last().map(|(_, s)| *s).unwrap_or(Span::DUMMY);
            tokens.push((Token::Eof, span));
        }

        Self {
            tokens,
            pos: 0,
            handler,
        }
    }

    /// Parse the whole token stream into a program.
    pub fn parse(&mut self) -> Program {
        let mut decls = Vec::new();

        while !self.is_at_end() {
            match self.parse_decl() {
                Some(decl) => decls.push(decl),
                None => self.synchronize_decl(),
            }
        }

        Program { decls }
    }

    // =========================================================================
    // TOKEN STREAM PRIMITIVES
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    fn peek_token(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].0
    }

    pub(crate) fn bump(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    /// Consume the current token if it matches.
    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.current_token() == token {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token, or report a syntax error.
    pub(crate) fn expect(&mut self, token: &Token) -> Option<Span> {
        if self.current_token() == token {
            let span = self.current_span();
            self.bump();
            Some(span)
        } else {
            self.error_here(format!("syntax error: expected `{}`", token));
            None
        }
    }

    /// Consume an identifier token, or report a syntax error.
    pub(crate) fn expect_ident(&mut self) -> Option<Ident> {
        if let Token::Ident(name) = self.current_token() {
            let ident = Ident::new(name.clone(), self.current_span());
            self.bump();
            Some(ident)
        } else {
            self.error_here("syntax error: expected identifier");
            None
        }
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) {
        self.handler.fatal(self.current_span(), message);
    }

    // =========================================================================
    // DECLARATIONS
    // =========================================================================

    fn parse_decl(&mut self) -> Option<Decl> {
        match self.current_token() {
            Token::Struct => {
                // `struct T { ... };` is a definition, `struct T x;` a variable
                if matches!(self.peek_token(2), Token::LBrace) {
                    self.parse_struct_decl().map(Decl::Struct)
                } else {
                    self.parse_var_decl().map(Decl::Var)
                }
            }
            Token::Int | Token::Bool | Token::Void => {
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;

                if matches!(self.current_token(), Token::LParen) {
                    self.parse_fn_rest(ty, name).map(Decl::Fn)
                } else {
                    self.expect(&Token::Semicolon)?;
                    Some(Decl::Var(VarDecl { ty, name }))
                }
            }
            _ => {
                self.error_here("syntax error: expected declaration");
                None
            }
        }
    }

    /// Parse a written type: `int`, `bool`, `void` or `struct T`.
    fn parse_type(&mut self) -> Option<TypeSpec> {
        match self.current_token() {
            Token::Int => {
                self.bump();
                Some(TypeSpec::Int)
            }
            Token::Bool => {
                self.bump();
                Some(TypeSpec::Bool)
            }
            Token::Void => {
                self.bump();
                Some(TypeSpec::Void)
            }
            Token::Struct => {
                self.bump();
                let name = self.expect_ident()?;
                Some(TypeSpec::Struct(name))
            }
            _ => {
                self.error_here("syntax error: expected type");
                None
            }
        }
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.current_token(),
            Token::Int | Token::Bool | Token::Void | Token::Struct
        )
    }

    /// Parse a variable declaration (current token starts a type).
    fn parse_var_decl(&mut self) -> Option<VarDecl> {
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        self.expect(&Token::Semicolon)?;
        Some(VarDecl { ty, name })
    }

    fn parse_struct_decl(&mut self) -> Option<StructDecl> {
        self.bump(); // `struct`
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;

        let mut fields = Vec::new();
        while self.starts_type() {
            fields.push(self.parse_var_decl()?);
        }

        self.expect(&Token::RBrace)?;
        self.expect(&Token::Semicolon)?;
        Some(StructDecl { name, fields })
    }

    /// Parse the remainder of a function after `type id` (current token
    /// is the opening parenthesis).
    fn parse_fn_rest(&mut self, ret: TypeSpec, name: Ident) -> Option<FnDecl> {
        self.bump(); // `(`

        let mut formals = Vec::new();
        if !self.match_token(&Token::RParen) {
            loop {
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;
                formals.push(FormalDecl { ty, name });

                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
        }

        let body = self.parse_block()?;
        Some(FnDecl {
            ret,
            name,
            formals,
            body,
        })
    }

    /// Parse a braced body: `{ varDecl* stmt* }`.
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        self.expect(&Token::LBrace)?;

        let mut decls = Vec::new();
        while self.starts_type() {
            match self.parse_var_decl() {
                Some(decl) => decls.push(decl),
                None => self.synchronize_stmt(),
            }
        }

        let mut stmts = Vec::new();
        while !matches!(self.current_token(), Token::RBrace | Token::Eof) {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize_stmt(),
            }
        }

        self.expect(&Token::RBrace)?;
        Some(Block { decls, stmts })
    }

    // =========================================================================
    // RESYNCHRONIZATION
    // =========================================================================

    /// After a failed top-level declaration, skip to the next token that
    /// can start one.
    fn synchronize_decl(&mut self) {
        self.bump();
        while !self.is_at_end() && !self.starts_type() {
            self.bump();
        }
    }

    /// After a failed statement, skip past the next `;` (or stop at a
    /// closing brace).
    fn synchronize_stmt(&mut self) {
        while !matches!(
            self.current_token(),
            Token::Semicolon | Token::RBrace | Token::Eof
        ) {
            self.bump();
        }
        if matches!(self.current_token(), Token::Semicolon) {
            self.bump();
        }
    }
}

/// Lex and parse a source string in one step.
pub fn parse_source(source: &str, handler: &Handler) -> Program {
    let tokens = tarnc_lex::tokenize(source, handler);
    Parser::new(tokens, handler).parse()
}
