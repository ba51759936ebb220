use std::f64::consts;

use crate::expr::ast::{BinOpKind, Expr, UnaryOpKind};
use crate::expr::error::ExprResult;
use crate::expr::lexer::Lexer;
use crate::expr::parser::Parser;

/// Function names the grammar recognizes for unary application.
pub const FUNCTION_NAMES: &[&str] = &["sin", "cos", "tan", "ln", "log", "sqrt"];

pub fn is_function_name(name: &str) -> bool {
    FUNCTION_NAMES.contains(&name)
}

/// A parsed expression over the free variable `x`, ready for repeated
/// evaluation. Sampling a curve evaluates the same expression hundreds of
/// times per redraw, so parsing happens once up front.
#[derive(Debug, Clone)]
pub struct ParsedExpr {
    root: Expr,
}

impl ParsedExpr {
    pub fn parse(source: &str) -> ExprResult<Self> {
        let tokens = Lexer::new(source).tokenize()?;
        let root = Parser::new(tokens).parse_expression()?;
        Ok(Self { root })
    }

    /// Evaluate at `x`. `None` is the undefined sentinel: domain errors
    /// (log of a non-positive, sqrt of a negative, negative base to a
    /// fractional power), division by zero, and overflow to infinity all
    /// land here. Nothing escapes as a panic or an error value.
    pub fn eval(&self, x: f64) -> Option<f64> {
        let value = eval_node(&self.root, x);
        value.is_finite().then_some(value)
    }
}

/// One-shot convenience: parse and evaluate. Any failure, including a
/// malformed expression, is the undefined sentinel.
pub fn evaluate(expression: &str, x: f64) -> Option<f64> {
    ParsedExpr::parse(expression).ok()?.eval(x)
}

/// Tree-walking numeric evaluation. `x` is substituted by lookup, never by
/// text replacement, so function names containing `x`-like substrings can
/// never be corrupted. Domain errors surface as NaN/infinity and are
/// filtered at the `ParsedExpr::eval` boundary.
fn eval_node(expr: &Expr, x: f64) -> f64 {
    match expr {
        Expr::Number(v, _) => *v,
        Expr::Ident(name, _) => match name.as_str() {
            "x" => x,
            "e" => consts::E,
            "pi" => consts::PI,
            _ => f64::NAN,
        },
        Expr::BinOp { op, lhs, rhs, .. } => {
            let a = eval_node(lhs, x);
            let b = eval_node(rhs, x);
            match op {
                BinOpKind::Add => a + b,
                BinOpKind::Sub => a - b,
                BinOpKind::Mul => a * b,
                BinOpKind::Div => a / b,
                BinOpKind::Pow => a.powf(b),
            }
        }
        Expr::UnaryOp {
            op: UnaryOpKind::Neg,
            operand,
            ..
        } => -eval_node(operand, x),
        Expr::Call { name, arg, .. } => {
            let v = eval_node(arg, x);
            match name.as_str() {
                "sin" => v.sin(),
                "cos" => v.cos(),
                "tan" => v.tan(),
                "ln" => v.ln(),
                "log" => v.log10(),
                "sqrt" => v.sqrt(),
                _ => f64::NAN,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(evaluate("x^2", 3.0), Some(9.0));
        assert_eq!(evaluate("sin(x)", 0.0), Some(0.0));
        assert_eq!(evaluate("e^x", 0.0), Some(1.0));
        assert_eq!(evaluate("2x+1", 5.0), Some(11.0));
    }

    #[test]
    fn test_constants() {
        assert_eq!(evaluate("pi", 0.0), Some(std::f64::consts::PI));
        assert_eq!(evaluate("e", 0.0), Some(std::f64::consts::E));
        let half_pi = evaluate("sin(pi/2)", 0.0).unwrap();
        assert!((half_pi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_implicit_multiplication_forms() {
        assert_eq!(evaluate("3(x+1)", 2.0), Some(9.0));
        assert_eq!(evaluate("(x+1)(x-1)", 3.0), Some(8.0));
        let v = evaluate("x sin(x)", std::f64::consts::PI / 2.0).unwrap();
        assert!((v - std::f64::consts::PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_domain_error_sentinel() {
        assert_eq!(evaluate("ln(x)", -1.0), None);
        assert_eq!(evaluate("sqrt(x)", -4.0), None);
        assert_eq!(evaluate("log(x)", 0.0), None);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("1/x", 0.0), None);
        assert_eq!(evaluate("1/(x-2)", 2.0), None);
    }

    #[test]
    fn test_negative_base_fractional_exponent() {
        assert_eq!(evaluate("x^0.5", -2.0), None);
    }

    #[test]
    fn test_overflow_is_undefined() {
        assert_eq!(evaluate("10^(10^10)", 0.0), None);
        assert_eq!(evaluate("e^x", 1e6), None);
    }

    #[test]
    fn test_parse_failure_is_undefined() {
        assert_eq!(evaluate("", 1.0), None);
        assert_eq!(evaluate("3 +* 4", 1.0), None);
        assert_eq!(evaluate("(x", 1.0), None);
        assert_eq!(evaluate("3 $ 4", 1.0), None);
    }

    #[test]
    fn test_unknown_identifier_is_undefined() {
        assert_eq!(evaluate("y + 1", 1.0), None);
        assert_eq!(evaluate("foo(x)", 1.0), None);
    }

    #[test]
    fn test_function_name_not_corrupted_by_variable() {
        // `exp`-like words must not pick up the value of x or e mid-token
        assert_eq!(evaluate("expand", 2.0), None);
        // sqrt contains no `x`, but `x` adjacent to it still multiplies
        let v = evaluate("x sqrt(4)", 3.0).unwrap();
        assert!((v - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_unary_minus_precedence() {
        // Unary minus binds tighter than caret
        assert_eq!(evaluate("-2^2", 0.0), Some(4.0));
        assert_eq!(evaluate("0 - 2^2", 0.0), Some(-4.0));
    }

    #[test]
    fn test_determinism() {
        let first = evaluate("sin(x) + x^3 - ln(x)", 1.75);
        for _ in 0..10 {
            assert_eq!(evaluate("sin(x) + x^3 - ln(x)", 1.75), first);
        }
    }

    #[test]
    fn test_parse_once_eval_many() {
        let f = ParsedExpr::parse("x^3 - 3*x").unwrap();
        assert_eq!(f.eval(2.0), Some(2.0));
        assert_eq!(f.eval(0.0), Some(0.0));
        assert_eq!(f.eval(-2.0), Some(-2.0));
    }
}
