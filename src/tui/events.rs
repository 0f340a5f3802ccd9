//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::pipeline::{EmptyInput, RunEvent};
use crate::results::ResultSet;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// Progress from the running pipeline
    Run(RunEvent),
    /// The run ended
    RunFinished(Result<ResultSet, EmptyInput>),
    /// The run task itself failed (panicked or was cancelled)
    RunAborted(String),
}
