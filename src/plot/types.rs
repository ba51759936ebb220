/// Plot surface dimensions and layout, in pixels.
pub const PLOT_WIDTH: u32 = 800;
pub const PLOT_HEIGHT: u32 = 600;
pub const PLOT_PADDING: u32 = 60;

/// Fixed display range for the y axis, regardless of domain.
pub const DEFAULT_Y_MIN: f64 = -10.0;
pub const DEFAULT_Y_MAX: f64 = 10.0;

/// Half-width of the tangent segment, in domain units.
pub const TANGENT_HALF_SPAN: f64 = 3.0;

/// Background and chrome colors (RGB).
pub const BG_COLOR: (u8, u8, u8) = (255, 255, 255);
pub const GRID_COLOR: (u8, u8, u8) = (229, 231, 235);
pub const AXIS_COLOR: (u8, u8, u8) = (55, 65, 81);

/// Derivative curve and tangent line colors.
pub const DERIVATIVE_COLOR: (u8, u8, u8) = (139, 92, 246);
pub const TANGENT_COLOR: (u8, u8, u8) = (239, 68, 68);

/// Rendering parameters. Width/height/padding define the surface;
/// the y range and derivative step carry the configurable defaults.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub y_min: f64,
    pub y_max: f64,
    /// Step for the central-difference fallback when a preset has no
    /// derivative expression.
    pub derivative_step: f64,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: PLOT_WIDTH,
            height: PLOT_HEIGHT,
            padding: PLOT_PADDING,
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
            derivative_step: crate::calc::derivative::DEFAULT_STEP,
        }
    }
}

/// A rendered plot image.
#[derive(Debug, Clone)]
pub struct RenderedPlot {
    pub png_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}
