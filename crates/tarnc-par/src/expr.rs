//! Expression parsing - precedence climbing over the operator grammar.
//!
//! Precedence, low to high: assignment (right associative), `||`, `&&`,
//! equality, relational, additive, multiplicative, unary, atoms. Dot
//! access chains attach only to identifier-rooted atoms, matching the
//! `loc ::= id | loc . id` production.

use crate::ast::*;
use crate::Parser;
use tarnc_lex::Token;

impl<'a> Parser<'a> {
    /// Parse an expression
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Option<Expr> {
        let lhs = self.parse_or()?;

        if matches!(self.current_token(), Token::Eq) {
            if !matches!(lhs, Expr::Id(_) | Expr::Dot(_)) {
                self.error_here("syntax error: invalid assignment target");
                return None;
            }
            self.bump();
            let rhs = self.parse_assign()?;
            return Some(Expr::Assign(Box::new(AssignExpr { lhs, rhs })));
        }

        Some(lhs)
    }

    fn parse_or(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_and()?;

        while self.match_token(&Token::OrOr) {
            let rhs = self.parse_and()?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_and(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_equality()?;

        while self.match_token(&Token::AndAnd) {
            let rhs = self.parse_equality()?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Some(lhs)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_relational()?;

        loop {
            let op = match self.current_token() {
                Token::EqEq => BinOp::Equals,
                Token::NotEq => BinOp::NotEquals,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_relational()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_additive()?;

        loop {
            let op = match self.current_token() {
                Token::Lt => BinOp::Less,
                Token::Gt => BinOp::Greater,
                Token::LtEq => BinOp::LessEq,
                Token::GtEq => BinOp::GreaterEq,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinOp::Plus,
                Token::Minus => BinOp::Minus,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let mut lhs = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinOp::Times,
                Token::Slash => BinOp::Divide,
                _ => return Some(lhs),
            };
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.current_token() {
            Token::Minus => UnOp::Neg,
            Token::Not => UnOp::Not,
            _ => return self.parse_atom(),
        };
        let span = self.current_span();
        self.bump();
        let operand = self.parse_unary()?;
        Some(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
        }))
    }

    fn parse_atom(&mut self) -> Option<Expr> {
        match self.current_token().clone() {
            Token::IntLit(value) => {
                let span = self.current_span();
                self.bump();
                Some(Expr::IntLit(IntLit { value, span }))
            }
            Token::StrLit(raw) => {
                let span = self.current_span();
                self.bump();
                Some(Expr::StrLit(StrLit { raw, span }))
            }
            Token::Tru => {
                let span = self.current_span();
                self.bump();
                Some(Expr::True(span))
            }
            Token::Fls => {
                let span = self.current_span();
                self.bump();
                Some(Expr::False(span))
            }
            Token::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Some(inner)
            }
            Token::Ident(_) => {
                let ident = self.expect_ident()?;
                if matches!(self.current_token(), Token::LParen) {
                    self.parse_call_rest(ident).map(Expr::Call)
                } else {
                    self.parse_dot_chain(Expr::Id(ident))
                }
            }
            _ => {
                self.error_here("syntax error: expected expression");
                None
            }
        }
    }

    fn parse_call_rest(&mut self, callee: Ident) -> Option<CallExpr> {
        self.bump(); // `(`

        let mut args = Vec::new();
        if !self.match_token(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.match_token(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RParen)?;
        }

        Some(CallExpr { callee, args })
    }

    /// Parse a loc: an identifier followed by any dot-access chain.
    pub(crate) fn parse_loc(&mut self) -> Option<Expr> {
        let ident = self.expect_ident()?;
        self.parse_dot_chain(Expr::Id(ident))
    }

    fn parse_dot_chain(&mut self, mut loc: Expr) -> Option<Expr> {
        while self.match_token(&Token::Dot) {
            let field = self.expect_ident()?;
            loc = Expr::Dot(DotAccess {
                loc: Box::new(loc),
                field,
                def: None,
            });
        }
        Some(loc)
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}
