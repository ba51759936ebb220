use crate::expr::eval::{evaluate, ParsedExpr};
use crate::presets::FunctionSpec;

/// Default step for the central-difference fallback. Small enough to keep
/// truncation error negligible, large enough that floating-point
/// cancellation in `f(x+h) - f(x-h)` stays below plotting accuracy.
pub const DEFAULT_STEP: f64 = 1e-8;

/// Instantaneous rate of change of `spec` at `x`.
///
/// Delegates to the evaluator when the preset carries an exact derivative
/// expression; otherwise estimates numerically. `None` when the slope is
/// undefined at `x`.
pub fn derivative_at(spec: &FunctionSpec, x: f64) -> Option<f64> {
    derivative_at_with_step(spec, x, DEFAULT_STEP)
}

/// Same as [`derivative_at`] with an explicit fallback step.
pub fn derivative_at_with_step(spec: &FunctionSpec, x: f64, h: f64) -> Option<f64> {
    match &spec.derivative {
        Some(expr) => evaluate(expr, x),
        None => {
            let f = ParsedExpr::parse(&spec.expression).ok()?;
            central_difference(|t| f.eval(t), x, h)
        }
    }
}

/// Central difference `(f(x+h) - f(x-h)) / 2h`. The symmetric sampling
/// cancels the first-order error term, giving O(h^2) accuracy for two
/// evaluations. If either endpoint is undefined the estimate is undefined;
/// there is no one-sided fallback.
pub fn central_difference<F>(f: F, x: f64, h: f64) -> Option<f64>
where
    F: Fn(f64) -> Option<f64>,
{
    let above = f(x + h)?;
    let below = f(x - h)?;
    let slope = (above - below) / (2.0 * h);
    slope.is_finite().then_some(slope)
}
