use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::Frame;

use crate::tui::theme::Theme;

pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    preset_name: &str,
    point: Option<(f64, f64, f64)>,
) {
    let version = env!("CARGO_PKG_VERSION");
    let left_text = format!(" slopescope v{} | {}", version, preset_name);
    let right_text = match point {
        Some((x, fx, slope)) => {
            format!("x = {:.3}  f(x) = {:.4}  f'(x) = {:.4} ", x, fx, slope)
        }
        None => "x outside domain or f undefined ".to_string(),
    };

    let left = Span::styled(left_text.clone(), Theme::status_bar());
    let right = Span::styled(right_text.clone(), Theme::status_bar());

    let width = area.width as usize;
    let padding = width.saturating_sub(left_text.len() + right_text.len());

    let line = Line::from(vec![
        left,
        Span::styled(" ".repeat(padding), Theme::status_bar()),
        right,
    ]);

    frame.render_widget(line, area);
}
