//! Terminal user interface
//!
//! Ratatui front end: roster, balloon board, compose box and popups, driven
//! by one async event loop.

mod app;
mod backend;
mod balloons;
mod compose;
mod debug_log;
mod help;
pub mod log_capture;
mod overlays;
mod roster;
mod ui;

pub use app::run;
