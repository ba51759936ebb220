//! End-to-end tests: expression text through sampling, slope estimation,
//! and plot rendering.

use slopescope::calc::{derivative_at, sample_runs};
use slopescope::config::Config;
use slopescope::expr::eval::{evaluate, ParsedExpr};
use slopescope::plot::render::render_plot;
use slopescope::plot::transform::SurfaceTransform;
use slopescope::plot::types::PlotOptions;
use slopescope::presets::builtin_presets;
use slopescope::tui::app::{App, DEFAULT_TANGENT_X};

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

#[test]
fn evaluates_preset_expressions() {
    assert!(close(evaluate("x^2", 3.0).unwrap(), 9.0, 1e-12));
    assert!(close(evaluate("x^3 - 3*x", 2.0).unwrap(), 2.0, 1e-12));
    assert!(close(evaluate("sin(x)", std::f64::consts::PI / 2.0).unwrap(), 1.0, 1e-12));
    assert!(close(evaluate("e^x", 1.0).unwrap(), std::f64::consts::E, 1e-12));
}

#[test]
fn implicit_multiplication_matches_explicit() {
    for x in [-2.5, 0.0, 1.0, 3.7] {
        assert_eq!(evaluate("2x", x), evaluate("2*x", x));
        assert_eq!(evaluate("3sin(x)", x), evaluate("3*sin(x)", x));
        assert_eq!(evaluate("x(x+1)", x), evaluate("x*(x+1)", x));
    }
}

#[test]
fn undefined_inputs_yield_none_not_errors() {
    assert_eq!(evaluate("ln(x)", -1.0), None);
    assert_eq!(evaluate("sqrt(x)", -4.0), None);
    assert_eq!(evaluate("1/x", 0.0), None);
    assert_eq!(evaluate("x +* 2", 1.0), None); // malformed
}

#[test]
fn derivative_uses_symbolic_expression_when_present() {
    let quadratic = &builtin_presets()[0];
    assert!(quadratic.derivative.is_some());
    let slope = derivative_at(quadratic, 3.0).unwrap();
    assert!(close(slope, 6.0, 1e-12));
}

#[test]
fn derivative_falls_back_to_central_difference() {
    let spec = slopescope::presets::FunctionSpec::new(
        "square",
        "x^2",
        None,
        (-5.0, 5.0),
        (59, 130, 246),
    );
    let slope = derivative_at(&spec, 3.0).unwrap();
    assert!(close(slope, 6.0, 1e-5));
}

#[test]
fn asymptotic_curve_splits_into_runs() {
    let f = ParsedExpr::parse("tan(x)").unwrap();
    let runs = sample_runs(|x| f.eval(x), (-6.28, 6.28), (-10.0, 10.0), 680);
    assert!(runs.len() >= 4);
    // Every point of every run is inside the display range
    for run in &runs {
        assert!(!run.is_empty());
        for &(_, y) in &run.points {
            assert!((-10.0..=10.0).contains(&y));
        }
    }
}

#[test]
fn transform_round_trips_within_pixel_resolution() {
    let opts = PlotOptions::default();
    let transform = SurfaceTransform::new(&opts, (-6.28, 6.28));
    let pixel_res = 2.0 * 6.28 / 680.0;
    for i in 0..=50 {
        let x = -6.28 + 2.0 * 6.28 * i as f64 / 50.0;
        let back = transform.to_domain(transform.x_to_px(x));
        assert!(close(back, x, pixel_res));
    }
}

#[test]
fn every_preset_renders_a_png() {
    let opts = PlotOptions::default();
    for spec in &builtin_presets() {
        let x0 = DEFAULT_TANGENT_X.clamp(spec.domain.0, spec.domain.1);
        let plot = render_plot(spec, x0, true, true, &opts).unwrap();
        assert_eq!(&plot.png_bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}

#[test]
fn rendering_is_deterministic() {
    let spec = &builtin_presets()[1];
    let opts = PlotOptions::default();
    let a = render_plot(spec, 0.7, true, true, &opts).unwrap();
    let b = render_plot(spec, 0.7, true, true, &opts).unwrap();
    assert_eq!(a.png_bytes, b.png_bytes);
}

#[test]
fn moving_the_point_changes_the_frame() {
    let spec = &builtin_presets()[0];
    let opts = PlotOptions::default();
    let a = render_plot(spec, 1.0, true, true, &opts).unwrap();
    let b = render_plot(spec, 2.0, true, true, &opts).unwrap();
    assert_ne!(a.png_bytes, b.png_bytes);
}

#[test]
fn preset_switch_resets_the_point() {
    let mut app = App::new(None, Config::default());
    app.select_point(4.0);
    app.select_preset(2);
    assert_eq!(app.selected, 2);
    assert_eq!(app.tangent_x, DEFAULT_TANGENT_X);
}

#[test]
fn app_renders_frames_through_state_changes() {
    let mut app = App::new(None, Config::default());
    app.ensure_plot();
    let first = app.plot.clone().unwrap().png_bytes;

    app.toggle_derivative();
    app.ensure_plot();
    let second = app.plot.clone().unwrap().png_bytes;
    assert_ne!(first, second);

    app.toggle_derivative();
    app.ensure_plot();
    let third = app.plot.clone().unwrap().png_bytes;
    assert_eq!(first, third);
}
