pub mod actions;
pub mod context;
pub mod render_model;
pub mod renderer;
