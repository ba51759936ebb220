//! Plot rendering: FunctionSpec + tangent state -> PNG bytes via plotters.
//!
//! All geometry goes through the pure `SurfaceTransform`; this module only
//! issues drawing calls. Text (tick values, legend captions) is rendered
//! by the hosting UI next to the image, so the bitmap pipeline carries no
//! font dependency; the bitmap holds tick marks and legend color swatches.

use image::codecs::png::PngEncoder;
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::calc::derivative::{central_difference, derivative_at_with_step};
use crate::calc::sample::{sample_runs, SampleRun};
use crate::expr::eval::{evaluate, ParsedExpr};
use crate::plot::transform::SurfaceTransform;
use crate::plot::types::*;
use crate::presets::FunctionSpec;

type Surface<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Render one frame. Deterministic: identical inputs produce identical
/// bytes. Layering order: grid, axes and ticks, primary curve, derivative
/// curve, tangent segment, marker, legend swatches.
pub fn render_plot(
    spec: &FunctionSpec,
    tangent_x: f64,
    show_derivative: bool,
    show_tangent: bool,
    opts: &PlotOptions,
) -> Result<RenderedPlot, String> {
    let (width, height) = (opts.width, opts.height);
    let mut buf = vec![0u8; (width * height * 3) as usize];
    let transform = SurfaceTransform::new(opts, spec.domain);
    // One sample per pixel of horizontal advance
    let resolution = width.saturating_sub(2 * opts.padding).max(1) as usize;
    let y_range = (opts.y_min, opts.y_max);

    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&rgb(BG_COLOR)).map_err(|e| format!("fill: {}", e))?;

        draw_grid(&root, &transform, spec.domain, y_range)?;
        draw_axes(&root, &transform, spec.domain, y_range)?;

        // Primary curve. A malformed expression is undefined everywhere,
        // which renders as an empty curve, not an error.
        let parsed = ParsedExpr::parse(&spec.expression).ok();
        if let Some(f) = &parsed {
            let runs = sample_runs(|x| f.eval(x), spec.domain, y_range, resolution);
            draw_runs(&root, &transform, &runs, rgb(spec.color).stroke_width(3), None)?;
        }

        if show_derivative {
            let runs = match &spec.derivative {
                Some(d) => match ParsedExpr::parse(d) {
                    Ok(df) => sample_runs(|x| df.eval(x), spec.domain, y_range, resolution),
                    Err(_) => Vec::new(),
                },
                None => match &parsed {
                    Some(f) => sample_runs(
                        |x| central_difference(|u| f.eval(u), x, opts.derivative_step),
                        spec.domain,
                        y_range,
                        resolution,
                    ),
                    None => Vec::new(),
                },
            };
            draw_runs(
                &root,
                &transform,
                &runs,
                rgb(DERIVATIVE_COLOR).stroke_width(2),
                Some((5.0, 5.0)),
            )?;
        }

        if show_tangent {
            draw_tangent(&root, &transform, spec, tangent_x, opts)?;
        }

        draw_legend(&root, spec, opts, show_derivative, show_tangent)?;

        root.present().map_err(|e| format!("present: {}", e))?;
    }

    let png_bytes = encode_rgb_to_png(&buf, width, height)?;
    Ok(RenderedPlot {
        png_bytes,
        width,
        height,
    })
}

/// Light grid lines at integer domain coordinates, skipping the axes.
fn draw_grid(
    root: &Surface,
    transform: &SurfaceTransform,
    domain: (f64, f64),
    y_range: (f64, f64),
) -> Result<(), String> {
    let style = rgb(GRID_COLOR).stroke_width(1);
    let top = transform.y_to_px(y_range.1);
    let bottom = transform.y_to_px(y_range.0);
    let left = transform.x_to_px(domain.0);
    let right = transform.x_to_px(domain.1);

    for gx in (domain.0.ceil() as i64)..=(domain.1.floor() as i64) {
        if gx == 0 {
            continue;
        }
        let px = transform.x_to_px(gx as f64);
        root.draw(&PathElement::new(vec![(px, top), (px, bottom)], style))
            .map_err(|e| format!("grid: {}", e))?;
    }

    for gy in (y_range.0.ceil() as i64)..=(y_range.1.floor() as i64) {
        if gy == 0 {
            continue;
        }
        let py = transform.y_to_px(gy as f64);
        root.draw(&PathElement::new(vec![(left, py), (right, py)], style))
            .map_err(|e| format!("grid: {}", e))?;
    }

    Ok(())
}

/// Axes through the origin plus tick marks at integer coordinates.
fn draw_axes(
    root: &Surface,
    transform: &SurfaceTransform,
    domain: (f64, f64),
    y_range: (f64, f64),
) -> Result<(), String> {
    let style = rgb(AXIS_COLOR).stroke_width(2);
    let tick_style = rgb(AXIS_COLOR).stroke_width(1);
    let axis_py = transform.y_to_px(0.0);
    let axis_px = transform.x_to_px(0.0);
    let left = transform.x_to_px(domain.0);
    let right = transform.x_to_px(domain.1);
    let top = transform.y_to_px(y_range.1);
    let bottom = transform.y_to_px(y_range.0);

    root.draw(&PathElement::new(
        vec![(left, axis_py), (right, axis_py)],
        style,
    ))
    .map_err(|e| format!("x axis: {}", e))?;
    root.draw(&PathElement::new(
        vec![(axis_px, top), (axis_px, bottom)],
        style,
    ))
    .map_err(|e| format!("y axis: {}", e))?;

    for gx in (domain.0.ceil() as i64)..=(domain.1.floor() as i64) {
        if gx == 0 {
            continue;
        }
        let px = transform.x_to_px(gx as f64);
        root.draw(&PathElement::new(
            vec![(px, axis_py - 4), (px, axis_py + 4)],
            tick_style,
        ))
        .map_err(|e| format!("tick: {}", e))?;
    }
    for gy in (y_range.0.ceil() as i64)..=(y_range.1.floor() as i64) {
        if gy == 0 {
            continue;
        }
        let py = transform.y_to_px(gy as f64);
        root.draw(&PathElement::new(
            vec![(axis_px - 4, py), (axis_px + 4, py)],
            tick_style,
        ))
        .map_err(|e| format!("tick: {}", e))?;
    }

    Ok(())
}

/// Draw sample runs as disjoint polylines, optionally dashed.
fn draw_runs(
    root: &Surface,
    transform: &SurfaceTransform,
    runs: &[SampleRun],
    style: ShapeStyle,
    dash: Option<(f64, f64)>,
) -> Result<(), String> {
    for run in runs {
        let points: Vec<(i32, i32)> = run
            .points
            .iter()
            .map(|&(x, y)| transform.to_surface(x, y))
            .collect();
        match dash {
            None => {
                root.draw(&PathElement::new(points, style))
                    .map_err(|e| format!("curve: {}", e))?;
            }
            Some((dash_len, gap_len)) => {
                for segment in dash_polyline(&points, dash_len, gap_len) {
                    root.draw(&PathElement::new(segment, style))
                        .map_err(|e| format!("curve: {}", e))?;
                }
            }
        }
    }
    Ok(())
}

/// Tangent segment and marker point. If either `f(x0)` or the slope is
/// undefined, both are omitted for this pass; transient undefined states
/// while dragging are normal interaction, not errors.
fn draw_tangent(
    root: &Surface,
    transform: &SurfaceTransform,
    spec: &FunctionSpec,
    tangent_x: f64,
    opts: &PlotOptions,
) -> Result<(), String> {
    let (fx, slope) = match (
        evaluate(&spec.expression, tangent_x),
        derivative_at_with_step(spec, tangent_x, opts.derivative_step),
    ) {
        (Some(fx), Some(slope)) => (fx, slope),
        _ => return Ok(()),
    };

    let x1 = (tangent_x - TANGENT_HALF_SPAN).max(spec.domain.0);
    let x2 = (tangent_x + TANGENT_HALF_SPAN).min(spec.domain.1);
    let y1 = fx + slope * (x1 - tangent_x);
    let y2 = fx + slope * (x2 - tangent_x);

    let points = vec![
        transform.to_surface(x1, y1),
        transform.to_surface(x2, y2),
    ];
    let style = rgb(TANGENT_COLOR).stroke_width(2);
    for segment in dash_polyline(&points, 10.0, 5.0) {
        root.draw(&PathElement::new(segment, style))
            .map_err(|e| format!("tangent: {}", e))?;
    }

    root.draw(&Circle::new(
        transform.to_surface(tangent_x, fx),
        6,
        rgb(TANGENT_COLOR).filled(),
    ))
    .map_err(|e| format!("marker: {}", e))?;

    Ok(())
}

/// Legend color swatches, top right. Captions are text and live in the
/// hosting UI.
fn draw_legend(
    root: &Surface,
    spec: &FunctionSpec,
    opts: &PlotOptions,
    show_derivative: bool,
    show_tangent: bool,
) -> Result<(), String> {
    let x = (opts.width as i32) - 200;
    let mut y = (opts.padding as i32) + 10;

    let mut swatches = vec![rgb(spec.color)];
    if show_derivative {
        swatches.push(rgb(DERIVATIVE_COLOR));
    }
    if show_tangent {
        swatches.push(rgb(TANGENT_COLOR));
    }

    for color in swatches {
        root.draw(&Rectangle::new([(x, y), (x + 20, y + 3)], color.filled()))
            .map_err(|e| format!("legend: {}", e))?;
        y += 25;
    }

    Ok(())
}

/// Chop a pixel-space polyline into on-segments of length `dash`
/// separated by `gap` (canvas setLineDash semantics).
fn dash_polyline(points: &[(i32, i32)], dash: f64, gap: f64) -> Vec<Vec<(i32, i32)>> {
    let mut segments: Vec<Vec<(i32, i32)>> = Vec::new();
    if points.len() < 2 {
        return segments;
    }

    let round = |p: (f64, f64)| (p.0.round() as i32, p.1.round() as i32);
    let mut current: Vec<(f64, f64)> = vec![(points[0].0 as f64, points[0].1 as f64)];
    let mut drawing = true;
    let mut remaining = dash;

    for pair in points.windows(2) {
        let (x0, y0) = (pair[0].0 as f64, pair[0].1 as f64);
        let (x1, y1) = (pair[1].0 as f64, pair[1].1 as f64);
        let mut len = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if len == 0.0 {
            continue;
        }
        let (ux, uy) = ((x1 - x0) / len, (y1 - y0) / len);
        let (mut cx, mut cy) = (x0, y0);

        while len >= remaining {
            cx += ux * remaining;
            cy += uy * remaining;
            len -= remaining;
            if drawing {
                current.push((cx, cy));
                segments.push(current.iter().copied().map(round).collect());
                current = Vec::new();
            } else {
                current = vec![(cx, cy)];
            }
            drawing = !drawing;
            remaining = if drawing { dash } else { gap };
        }
        remaining -= len;
        // When a boundary landed exactly on the endpoint, it is already
        // the last point of `current`
        if drawing && len > 0.0 {
            current.push((x1, y1));
        }
    }

    if drawing && current.len() >= 2 {
        segments.push(current.into_iter().map(round).collect());
    }
    segments
}

fn rgb(c: (u8, u8, u8)) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Encode a raw RGB pixel buffer to PNG.
fn encode_rgb_to_png(rgb: &[u8], width: u32, height: u32) -> Result<Vec<u8>, String> {
    let mut png = Vec::new();
    let encoder = PngEncoder::new(&mut png);
    encoder
        .write_image(rgb, width, height, image::ExtendedColorType::Rgb8)
        .map_err(|e| format!("PNG encode: {}", e))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::builtin_presets;

    fn render(spec: &FunctionSpec, x0: f64, d: bool, t: bool) -> RenderedPlot {
        render_plot(spec, x0, d, t, &PlotOptions::default()).unwrap()
    }

    #[test]
    fn test_render_produces_png() {
        let spec = &builtin_presets()[0];
        let plot = render(spec, 1.0, true, true);
        assert!(!plot.png_bytes.is_empty());
        assert_eq!(&plot.png_bytes[1..4], b"PNG");
        assert_eq!(plot.width, PLOT_WIDTH);
        assert_eq!(plot.height, PLOT_HEIGHT);
    }

    #[test]
    fn test_render_is_deterministic() {
        let spec = &builtin_presets()[2];
        let a = render(spec, 0.5, true, true);
        let b = render(spec, 0.5, true, true);
        assert_eq!(a.png_bytes, b.png_bytes);
    }

    #[test]
    fn test_tangent_state_changes_output() {
        let spec = &builtin_presets()[0];
        let with_tangent = render(spec, 1.0, false, true);
        let without = render(spec, 1.0, false, false);
        assert_ne!(with_tangent.png_bytes, without.png_bytes);
    }

    #[test]
    fn test_undefined_tangent_is_omitted() {
        // ln(x) has no value and no slope left of 0: the tangent and
        // marker are skipped, so the image is independent of x0 there.
        let spec = FunctionSpec::new("ln", "ln(x)", None, (-2.0, 5.0), (59, 130, 246));
        let at_minus_one = render(&spec, -1.0, false, true);
        let at_minus_half = render(&spec, -0.5, false, true);
        assert_eq!(at_minus_one.png_bytes, at_minus_half.png_bytes);
    }

    #[test]
    fn test_malformed_expression_still_renders() {
        let spec = FunctionSpec::new("bad", "x +* 2", None, (-5.0, 5.0), (0, 0, 0));
        let plot = render_plot(&spec, 0.0, true, true, &PlotOptions::default()).unwrap();
        assert_eq!(&plot.png_bytes[1..4], b"PNG");
    }

    #[test]
    fn test_asymptotic_function_renders() {
        let spec = FunctionSpec::new("tan", "tan(x)", None, (-6.0, 6.0), (16, 185, 129));
        let plot = render_plot(&spec, 0.5, true, true, &PlotOptions::default()).unwrap();
        assert!(!plot.png_bytes.is_empty());
    }

    #[test]
    fn test_dash_polyline_alternates() {
        let segments = dash_polyline(&[(0, 0), (100, 0)], 10.0, 10.0);
        // 100px at 10 on / 10 off -> 5 on-segments
        assert_eq!(segments.len(), 5);
        for seg in &segments {
            assert!(seg.len() >= 2);
        }
    }

    #[test]
    fn test_dash_polyline_short_line_is_single_dash() {
        let segments = dash_polyline(&[(0, 0), (4, 0)], 10.0, 5.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0], vec![(0, 0), (4, 0)]);
    }
}
