//! slopescope: an interactive terminal visualizer for a function, its
//! derivative, and the tangent line at a movable point.
//!
//! The pipeline is expression text -> AST ([`expr`]) -> samples and slope
//! estimates ([`calc`]) -> a PNG plot surface ([`plot`]) displayed inline
//! in the terminal ([`tui`]).

pub mod calc;
pub mod config;
pub mod expr;
pub mod plot;
pub mod presets;
pub mod tui;

pub use calc::derivative::derivative_at;
pub use expr::eval::evaluate;
