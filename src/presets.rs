/// A plottable function: expression, optional exact derivative, domain,
/// and display styling. Immutable once constructed; the UI swaps the
/// selected one wholesale.
#[derive(Debug, Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub expression: String,
    /// Algebraically exact derivative expression. When absent, the slope
    /// falls back to a central-difference estimate.
    pub derivative: Option<String>,
    /// Closed x-interval over which the function is displayed (min < max).
    pub domain: (f64, f64),
    /// Curve color (RGB).
    pub color: (u8, u8, u8),
}

impl FunctionSpec {
    pub fn new(
        name: &str,
        expression: &str,
        derivative: Option<&str>,
        domain: (f64, f64),
        color: (u8, u8, u8),
    ) -> Self {
        Self {
            name: name.to_string(),
            expression: expression.to_string(),
            derivative: derivative.map(|d| d.to_string()),
            domain,
            color,
        }
    }

    /// Whether `x` lies within the display domain.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.domain.0 && x <= self.domain.1
    }
}

/// The built-in preset registry: four classic teaching functions with
/// exact derivatives and distinct finite domains.
pub fn builtin_presets() -> Vec<FunctionSpec> {
    vec![
        FunctionSpec::new(
            "Quadratic: x^2",
            "x^2",
            Some("2*x"),
            (-5.0, 5.0),
            (59, 130, 246),
        ),
        FunctionSpec::new(
            "Cubic: x^3 - 3x",
            "x^3 - 3*x",
            Some("3*x^2 - 3"),
            (-3.0, 3.0),
            (139, 92, 246),
        ),
        FunctionSpec::new(
            "Sine: sin(x)",
            "sin(x)",
            Some("cos(x)"),
            (-6.28, 6.28),
            (16, 185, 129),
        ),
        FunctionSpec::new(
            "Exponential: e^x",
            "e^x",
            Some("e^x"),
            (-2.0, 3.0),
            (245, 158, 11),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::eval::evaluate;

    #[test]
    fn test_registry_shape() {
        let presets = builtin_presets();
        assert_eq!(presets.len(), 4);
        for spec in &presets {
            assert!(spec.domain.0 < spec.domain.1);
            assert!(spec.contains(0.0), "{} domain excludes 0", spec.name);
            assert!(spec.derivative.is_some());
        }
    }

    #[test]
    fn test_expressions_evaluate() {
        for spec in builtin_presets() {
            let mid = (spec.domain.0 + spec.domain.1) / 2.0;
            assert!(
                evaluate(&spec.expression, mid).is_some(),
                "{} undefined at domain midpoint",
                spec.name
            );
            assert!(evaluate(spec.derivative.as_deref().unwrap(), mid).is_some());
        }
    }

    #[test]
    fn test_contains_bounds() {
        let spec = &builtin_presets()[0];
        assert!(spec.contains(-5.0));
        assert!(spec.contains(5.0));
        assert!(!spec.contains(5.0001));
        assert!(!spec.contains(-5.0001));
    }
}
