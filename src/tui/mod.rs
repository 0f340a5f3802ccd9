//! Interactive shell built on Ratatui: pick documents, write a prompt, process, save.

pub mod app;
pub mod events;
pub mod handler;
pub mod ui;

pub use handler::run_tui;
