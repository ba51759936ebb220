use crate::expr::ast::*;
use crate::expr::error::{ExprError, ExprResult};
use crate::expr::eval::is_function_name;
use crate::expr::token::{Token, TokenKind};

/// Pratt parser for the expression mini-language.
///
/// Precedence, tightest first: unary minus, `^` (right-associative),
/// `*` `/`, `+` `-`.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

// Binding powers. Caret is right-associative (left > right); unary minus
// binds tighter than caret, so `-x^2` is `(-x)^2`.
const BP_ADD: (u8, u8) = (1, 2);
const BP_MUL: (u8, u8) = (3, 4);
const BP_POW: (u8, u8) = (6, 5);
const BP_NEG: u8 = 7;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse the whole token stream as a single expression.
    pub fn parse_expression(&mut self) -> ExprResult<Expr> {
        if self.is_at_end() {
            return Err(ExprError::parse("empty expression"));
        }
        let expr = self.parse_expr(0)?;
        if !self.is_at_end() {
            let tok = self.peek().clone();
            return Err(ExprError::parse(format!(
                "unexpected token after expression: {:?}",
                tok.kind
            ))
            .with_span(tok.span));
        }
        Ok(expr)
    }

    /// Pratt loop: parse expression with given minimum binding power.
    fn parse_expr(&mut self, min_bp: u8) -> ExprResult<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (op, left_bp, right_bp) = match self.peek_kind() {
                TokenKind::Plus => (BinOpKind::Add, BP_ADD.0, BP_ADD.1),
                TokenKind::Minus => (BinOpKind::Sub, BP_ADD.0, BP_ADD.1),
                TokenKind::Star => (BinOpKind::Mul, BP_MUL.0, BP_MUL.1),
                TokenKind::Slash => (BinOpKind::Div, BP_MUL.0, BP_MUL.1),
                TokenKind::Caret => (BinOpKind::Pow, BP_POW.0, BP_POW.1),
                _ => break,
            };

            if left_bp < min_bp {
                break;
            }

            self.advance(); // consume operator
            let rhs = self.parse_expr(right_bp)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }

        Ok(lhs)
    }

    /// Parse prefix expression (atom or unary minus).
    fn parse_prefix(&mut self) -> ExprResult<Expr> {
        match self.peek_kind() {
            TokenKind::Number(_) => {
                let tok = self.advance();
                match tok.kind {
                    TokenKind::Number(v) => Ok(Expr::Number(v, tok.span)),
                    _ => unreachable!(),
                }
            }
            TokenKind::Ident(_) => self.parse_ident(),
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::Minus => {
                let op_span = self.advance().span;
                let operand = self.parse_expr(BP_NEG)?;
                let span = op_span.merge(operand.span());
                Ok(Expr::UnaryOp {
                    op: UnaryOpKind::Neg,
                    operand: Box::new(operand),
                    span,
                })
            }
            _ => {
                let tok = self.peek().clone();
                Err(ExprError::parse(format!(
                    "expected expression, found {:?}",
                    tok.kind
                ))
                .with_span(tok.span))
            }
        }
    }

    /// Variable, constant, or function application.
    fn parse_ident(&mut self) -> ExprResult<Expr> {
        let tok = self.advance();
        let name = match tok.kind {
            TokenKind::Ident(name) => name,
            _ => unreachable!(),
        };

        // `sin(` lexes without an inserted `*`, so adjacency means application
        if is_function_name(&name) && self.peek_kind() == TokenKind::LParen {
            self.expect(TokenKind::LParen)?;
            let arg = self.parse_expr(0)?;
            let end = self.expect(TokenKind::RParen)?.span;
            return Ok(Expr::Call {
                name,
                arg: Box::new(arg),
                span: tok.span.merge(end),
            });
        }

        Ok(Expr::Ident(name, tok.span))
    }

    fn parse_grouped(&mut self) -> ExprResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expr(0)?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    // --- Token helpers ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens[self.pos].kind.clone()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> ExprResult<Token> {
        let tok = self.peek().clone();
        if std::mem::discriminant(&tok.kind) == std::mem::discriminant(&kind) {
            Ok(self.advance())
        } else {
            Err(ExprError::parse(format!(
                "expected {:?}, found {:?}",
                kind, tok.kind
            ))
            .with_span(tok.span))
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.tokens[self.pos].kind, TokenKind::Eof)
    }
}
