use crate::expr::token::Span;

/// Expression node.
///
/// The grammar is deliberately small: one free variable, two named
/// constants, arithmetic, and unary function application.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Numeric literal: `42`, `3.14`
    Number(f64, Span),

    /// The free variable `x` or a constant (`e`, `pi`).
    Ident(String, Span),

    /// Binary operation: `a + b`, `x^2`
    BinOp {
        op: BinOpKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },

    /// Unary negation: `-x`
    UnaryOp {
        op: UnaryOpKind,
        operand: Box<Expr>,
        span: Span,
    },

    /// Function application: `sin(x)`, `ln(x^2 + 1)`
    Call {
        name: String,
        arg: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Number(_, s) => *s,
            Expr::Ident(_, s) => *s,
            Expr::BinOp { span, .. } => *span,
            Expr::UnaryOp { span, .. } => *span,
            Expr::Call { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOpKind {
    Neg,
}
