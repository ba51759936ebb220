pub mod render;
pub mod transform;
pub mod types;

pub use render::render_plot;
pub use transform::SurfaceTransform;
pub use types::{PlotOptions, RenderedPlot};
