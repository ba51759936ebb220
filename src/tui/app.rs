use std::cell::RefCell;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use ratatui_image::StatefulImage;

use crate::calc::derivative::derivative_at_with_step;
use crate::config::Config;
use crate::expr::eval::evaluate;
use crate::plot::render::render_plot;
use crate::plot::transform::SurfaceTransform;
use crate::plot::types::{PlotOptions, RenderedPlot, PLOT_HEIGHT, PLOT_WIDTH};
use crate::presets::{builtin_presets, FunctionSpec};
use crate::tui::event::is_quit;
use crate::tui::status::render_status_bar;
use crate::tui::theme::Theme;

/// Where the point of tangency lands after switching presets.
pub const DEFAULT_TANGENT_X: f64 = 0.0;

pub struct App {
    pub presets: Vec<FunctionSpec>,
    pub selected: usize,
    pub tangent_x: f64,
    pub show_derivative: bool,
    pub show_tangent: bool,
    pub should_quit: bool,
    pub picker: Option<Picker>,
    pub config: Config,
    pub plot: Option<RenderedPlot>,
    pub plot_error: Option<String>,
    plot_dirty: bool,
    // Interior mutability: the image protocol is (re)built during render,
    // which only has &self for this path.
    image_state: RefCell<Option<StatefulProtocol>>,
    /// Terminal cells occupied by the plot image in the last frame, used
    /// to map mouse clicks back onto the plot surface.
    plot_area: Rect,
}

impl App {
    pub fn new(picker: Option<Picker>, config: Config) -> Self {
        let presets = builtin_presets();
        let tangent_x = clamp_to_domain(1.0, presets[0].domain);
        Self {
            presets,
            selected: 0,
            tangent_x,
            show_derivative: true,
            show_tangent: true,
            should_quit: false,
            picker,
            config,
            plot: None,
            plot_error: None,
            plot_dirty: true,
            image_state: RefCell::new(None),
            plot_area: Rect::default(),
        }
    }

    pub fn current(&self) -> &FunctionSpec {
        &self.presets[self.selected]
    }

    fn plot_options(&self) -> PlotOptions {
        PlotOptions {
            y_min: self.config.y_min,
            y_max: self.config.y_max,
            derivative_step: self.config.derivative_step,
            ..PlotOptions::default()
        }
    }

    /// Switch presets; the point of tangency does not follow across, it
    /// resets to the default (clamped into the new domain).
    pub fn select_preset(&mut self, index: usize) {
        if index >= self.presets.len() {
            return;
        }
        self.selected = index;
        self.tangent_x = clamp_to_domain(DEFAULT_TANGENT_X, self.presets[index].domain);
        self.plot_dirty = true;
    }

    /// Move the point of tangency. Out-of-domain requests are ignored,
    /// not clamped: a click in the margin does nothing.
    pub fn select_point(&mut self, x: f64) {
        if self.current().contains(x) {
            self.tangent_x = x;
            self.plot_dirty = true;
        }
    }

    /// Step the point left or right by 1% of the domain span.
    pub fn nudge_point(&mut self, direction: f64) {
        let (x_min, x_max) = self.current().domain;
        let step = (x_max - x_min) / 100.0;
        self.tangent_x = clamp_to_domain(self.tangent_x + direction * step, (x_min, x_max));
        self.plot_dirty = true;
    }

    pub fn toggle_derivative(&mut self) {
        self.show_derivative = !self.show_derivative;
        self.plot_dirty = true;
    }

    pub fn toggle_tangent(&mut self) {
        self.show_tangent = !self.show_tangent;
        self.plot_dirty = true;
    }

    /// x0, f(x0), and slope at the current point, when all are defined.
    pub fn point_info(&self) -> Option<(f64, f64, f64)> {
        let spec = self.current();
        let fx = evaluate(&spec.expression, self.tangent_x)?;
        let slope = derivative_at_with_step(spec, self.tangent_x, self.config.derivative_step)?;
        Some((self.tangent_x, fx, slope))
    }

    /// Label/value pairs for the analysis panel.
    fn analysis_entries(&self) -> Vec<(String, String)> {
        let spec = self.current();
        let mut entries = vec![
            ("f(x)".to_string(), spec.expression.clone()),
            (
                "f'(x)".to_string(),
                spec.derivative
                    .clone()
                    .unwrap_or_else(|| "numeric estimate".to_string()),
            ),
        ];
        match self.point_info() {
            Some((x, fx, slope)) => {
                entries.push(("x0".to_string(), format!("{:.3}", x)));
                entries.push(("f(x0)".to_string(), format!("{:.4}", fx)));
                entries.push(("slope".to_string(), format!("{:.4}", slope)));
            }
            None => {
                entries.push(("x0".to_string(), format!("{:.3}", self.tangent_x)));
                entries.push(("f(x0)".to_string(), "undefined".to_string()));
                entries.push(("slope".to_string(), "undefined".to_string()));
            }
        }
        entries
    }

    /// Handle a key event. Returns true if the screen should be redrawn.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if is_quit(&key) {
            self.should_quit = true;
            return true;
        }

        match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                if index < self.presets.len() {
                    self.select_preset(index);
                    return true;
                }
                false
            }
            KeyCode::Left => {
                self.nudge_point(-1.0);
                true
            }
            KeyCode::Right => {
                self.nudge_point(1.0);
                true
            }
            KeyCode::Char('d') => {
                self.toggle_derivative();
                true
            }
            KeyCode::Char('t') => {
                self.toggle_tangent();
                true
            }
            _ => false,
        }
    }

    /// Handle a mouse event. A left click on the plot image picks a new
    /// point of tangency.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return false;
        }
        let area = self.plot_area;
        if area.width == 0
            || mouse.column < area.x
            || mouse.column >= area.x + area.width
            || mouse.row < area.y
            || mouse.row >= area.y + area.height
        {
            return false;
        }

        let px = self.surface_px_from_column(mouse.column);
        let transform = SurfaceTransform::new(&self.plot_options(), self.current().domain);
        if let Some(x) = transform.pick(px) {
            self.select_point(x);
            return true;
        }
        false
    }

    /// Cell column -> surface pixel column, at cell centers. The image
    /// protocol fits the 800x600 surface into the panel preserving aspect
    /// ratio and anchored left, so with a known font size the mapping goes
    /// through the fitted scale; clicks right of the fitted image land
    /// past the surface and get rejected by the domain pick.
    fn surface_px_from_column(&self, column: u16) -> i32 {
        let area = self.plot_area;
        let cell = (column - area.x) as f64 + 0.5;
        match self.picker.as_ref().map(|p| p.font_size()) {
            Some((fw, fh)) if fw > 0 && fh > 0 => {
                let panel_px_w = area.width as f64 * fw as f64;
                let panel_px_h = area.height as f64 * fh as f64;
                let scale =
                    (panel_px_w / PLOT_WIDTH as f64).min(panel_px_h / PLOT_HEIGHT as f64);
                (cell * fw as f64 / scale) as i32
            }
            // No picker: no image, assume the text fallback spans the panel
            _ => (cell / area.width as f64 * PLOT_WIDTH as f64) as i32,
        }
    }

    /// Re-render the plot PNG if any input changed since the last frame.
    pub fn ensure_plot(&mut self) {
        if !self.plot_dirty {
            return;
        }
        let opts = self.plot_options();
        match render_plot(
            self.current(),
            self.tangent_x,
            self.show_derivative,
            self.show_tangent,
            &opts,
        ) {
            Ok(plot) => {
                self.plot = Some(plot);
                self.plot_error = None;
            }
            Err(e) => {
                self.plot = None;
                self.plot_error = Some(e);
            }
        }
        // Image protocol caches the old frame; drop it
        *self.image_state.borrow_mut() = None;
        self.plot_dirty = false;
    }

    /// Render the full UI.
    pub fn render(&mut self, frame: &mut Frame) {
        self.ensure_plot();

        let outer = Layout::vertical([
            Constraint::Length(1), // Status bar
            Constraint::Min(5),    // Main area
        ])
        .split(frame.area());

        render_status_bar(frame, outer[0], &self.current().name, self.point_info());

        let main = Layout::horizontal([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(outer[1]);

        // Honor the configured image height; leftover rows stay blank
        let plot_rows = plot_panel_rows(main[0].height, self.config.plot_height);
        let plot_slices =
            Layout::vertical([Constraint::Length(plot_rows), Constraint::Min(0)]).split(main[0]);

        self.render_plot_panel(frame, plot_slices[0]);
        self.render_sidebar(frame, main[1]);
    }

    fn render_plot_panel(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(" Plot ");

        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.plot_area = inner;

        if let Some(error) = &self.plot_error {
            frame.render_widget(
                Paragraph::new(Span::styled(format!("[plot error: {}]", error), Theme::error())),
                inner,
            );
            return;
        }

        self.render_plot_image(frame, inner);
    }

    /// Render the plot PNG into the given area using ratatui-image.
    fn render_plot_image(&self, frame: &mut Frame, area: Rect) {
        let png_bytes = match &self.plot {
            Some(plot) => &plot.png_bytes,
            None => return,
        };

        let needs_init = self.image_state.borrow().is_none();
        if needs_init {
            if let Some(picker) = &self.picker {
                match image::load_from_memory(png_bytes) {
                    Ok(dyn_image) => {
                        let protocol = picker.new_resize_protocol(dyn_image);
                        *self.image_state.borrow_mut() = Some(protocol);
                    }
                    Err(e) => {
                        frame.render_widget(
                            Paragraph::new(Span::styled(
                                format!("[plot decode error: {}]", e),
                                Theme::error(),
                            )),
                            area,
                        );
                        return;
                    }
                }
            } else {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!(
                            "[plot: {} \u{2014} image display requires Kitty/iTerm2]",
                            self.current().name
                        ),
                        Theme::hint(),
                    )),
                    area,
                );
                return;
            }
        }

        let mut state = self.image_state.borrow_mut();
        if let Some(protocol) = state.as_mut() {
            let image_widget = StatefulImage::default();
            frame.render_stateful_widget(image_widget, area, protocol);
        }
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let sections = Layout::vertical([
            Constraint::Min(6),    // Presets
            Constraint::Length(7), // Analysis
            Constraint::Length(5), // Legend / toggles
            Constraint::Length(7), // Keys
        ])
        .split(area);

        self.render_presets(frame, sections[0]);
        self.render_analysis(frame, sections[1]);
        self.render_legend(frame, sections[2]);
        self.render_keys(frame, sections[3]);
    }

    fn render_analysis(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Analysis ", Theme::sidebar_title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = self
            .analysis_entries()
            .into_iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!(" {:<6}", label), Theme::sidebar_title()),
                    Span::styled(value, Theme::sidebar_item()),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_presets(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Presets ", Theme::sidebar_title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let items: Vec<ListItem> = self
            .presets
            .iter()
            .enumerate()
            .map(|(i, preset)| {
                let style = if i == self.selected {
                    Theme::sidebar_selected()
                } else {
                    Theme::sidebar_item()
                };
                ListItem::new(Span::styled(format!(" {} {}", i + 1, preset.name), style))
            })
            .collect();

        frame.render_widget(List::new(items), inner);
    }

    fn render_legend(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Curves ", Theme::sidebar_title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let toggle = |on: bool, style| if on { style } else { Theme::toggle_off() };
        let lines = vec![
            Line::from(Span::styled(" \u{2500}\u{2500} f(x)", Theme::legend_function())),
            Line::from(Span::styled(
                " \u{254c}\u{254c} f'(x)",
                toggle(self.show_derivative, Theme::legend_derivative()),
            )),
            Line::from(Span::styled(
                " \u{254c}\u{254c} tangent",
                toggle(self.show_tangent, Theme::legend_tangent()),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_keys(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Keys ", Theme::sidebar_title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            Line::from(Span::styled(" 1-4    preset", Theme::hint())),
            Line::from(Span::styled(" \u{2190}/\u{2192}    move point", Theme::hint())),
            Line::from(Span::styled(" click  pick point", Theme::hint())),
            Line::from(Span::styled(" d/t    toggle curves", Theme::hint())),
            Line::from(Span::styled(" q      quit", Theme::hint())),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

fn clamp_to_domain(x: f64, domain: (f64, f64)) -> f64 {
    x.clamp(domain.0, domain.1)
}

/// Rows for the plot panel: the configured image height plus the border,
/// capped by the available area.
fn plot_panel_rows(available: u16, plot_height: u16) -> u16 {
    plot_height.saturating_add(2).min(available)
}
