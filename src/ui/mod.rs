//! Terminal dashboard over a running fleet session

pub mod layout;
pub mod renderer;
pub mod terminal;

pub use terminal::run_ui;
