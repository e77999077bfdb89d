//! Ratatui front-end: two record tables, the statistics line, the activity
//! panel and modal popups for every store operation.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
