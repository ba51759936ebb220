pub mod app;
pub mod event;
pub mod status;
pub mod theme;
