//! Statement parsing - assignment, increment, receive/print, control
//! flow, call and return statements.

use crate::ast::*;
use crate::Parser;
use tarnc_lex::Token;

impl<'a> Parser<'a> {
    /// Parse a statement
    pub(crate) fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.current_token() {
            Token::PlusPlus => {
                self.bump();
                let loc = self.parse_loc()?;
                self.expect(&Token::Semicolon)?;
                Some(Stmt::PreInc(loc))
            }
            Token::MinusMinus => {
                self.bump();
                let loc = self.parse_loc()?;
                self.expect(&Token::Semicolon)?;
                Some(Stmt::PreDec(loc))
            }
            Token::Receive => {
                self.bump();
                self.expect(&Token::Read)?;
                let target = self.parse_loc()?;
                self.expect(&Token::Semicolon)?;
                Some(Stmt::Receive(ReceiveStmt {
                    target,
                    operand_ty: None,
                }))
            }
            Token::Print => {
                self.bump();
                self.expect(&Token::Write)?;
                let value = self.parse_expr()?;
                self.expect(&Token::Semicolon)?;
                Some(Stmt::Print(PrintStmt {
                    value,
                    operand_ty: None,
                }))
            }
            Token::If => self.parse_if_stmt(),
            Token::While => {
                self.bump();
                let cond = self.parse_paren_cond()?;
                let body = self.parse_block()?;
                Some(Stmt::While(WhileStmt { cond, body }))
            }
            Token::Repeat => {
                self.bump();
                let cond = self.parse_paren_cond()?;
                let body = self.parse_block()?;
                Some(Stmt::Repeat(RepeatStmt { cond, body }))
            }
            Token::Return => {
                self.bump();
                if self.match_token(&Token::Semicolon) {
                    Some(Stmt::Return(None))
                } else {
                    let value = self.parse_expr()?;
                    self.expect(&Token::Semicolon)?;
                    Some(Stmt::Return(Some(value)))
                }
            }
            Token::Ident(_) => {
                // assignment or call statement
                let expr = self.parse_expr()?;
                self.expect(&Token::Semicolon)?;
                match expr {
                    Expr::Assign(assign) => Some(Stmt::Assign(*assign)),
                    Expr::Call(call) => Some(Stmt::Call(call)),
                    other => {
                        self.handler
                            .fatal(other.span(), "syntax error: expected statement");
                        None
                    }
                }
            }
            _ => {
                self.error_here("syntax error: expected statement");
                None
            }
        }
    }

    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        self.bump(); // `if`
        let cond = self.parse_paren_cond()?;
        let then_body = self.parse_block()?;

        if self.match_token(&Token::Else) {
            let else_body = self.parse_block()?;
            Some(Stmt::IfElse(IfElseStmt {
                cond,
                then_body,
                else_body,
            }))
        } else {
            Some(Stmt::If(IfStmt {
                cond,
                body: then_body,
            }))
        }
    }

    fn parse_paren_cond(&mut self) -> Option<Expr> {
        self.expect(&Token::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(&Token::RParen)?;
        Some(cond)
    }
}
