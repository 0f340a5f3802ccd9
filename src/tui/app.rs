//! TUI application state management.

use std::path::{Path, PathBuf};

use crate::document::{Document, DocumentKind};
use crate::pipeline::{EmptyInput, RunEvent};
use crate::results::{DocumentOutcome, ResultSet};

/// Which pane receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Documents,
    Prompt,
}

/// Per-document progress during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocStatus {
    Pending,
    Running,
    Done,
    Failed,
    Skipped,
}

/// One-line message under the panes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Info(String),
    Warning(String),
    Success(String),
    Error(String),
}

/// Application state for the TUI
#[derive(Debug)]
pub struct App {
    pub focus: Focus,
    /// Path being typed in the documents pane
    pub path_input: String,
    /// Selected documents, in upload order
    pub documents: Vec<Document>,
    /// Highlighted document in the list
    pub selected: Option<usize>,
    /// Prompt text (may span lines)
    pub prompt: String,
    /// Cursor position in the prompt (char index)
    pub prompt_cursor: usize,
    /// Status of each document in the current run
    pub statuses: Vec<DocStatus>,
    /// Outcomes received so far, kept in upload order
    pub outcomes: Vec<(usize, DocumentOutcome)>,
    /// Completed run, once finished
    pub results: Option<ResultSet>,
    pub is_processing: bool,
    pub spinner_tick: usize,
    pub banner: Banner,
    pub export_path: PathBuf,
    pub model: String,
    pub show_help: bool,
    pub results_scroll: u16,
}

impl App {
    pub fn new(model: String, export_path: PathBuf) -> Self {
        Self {
            focus: Focus::Documents,
            path_input: String::new(),
            documents: Vec::new(),
            selected: None,
            prompt: String::new(),
            prompt_cursor: 0,
            statuses: Vec::new(),
            outcomes: Vec::new(),
            results: None,
            is_processing: false,
            spinner_tick: 0,
            banner: Banner::Info("Type a document path and press Enter. Tab switches to the prompt.".into()),
            export_path,
            model,
            show_help: false,
            results_scroll: 0,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Documents => Focus::Prompt,
            Focus::Prompt => Focus::Documents,
        };
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ----- Documents -----

    /// Add the document named by `path_input`; only `.pdf` and `.docx` pass the filter.
    pub fn submit_path(&mut self) {
        let raw = self.path_input.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
        if raw.is_empty() {
            return;
        }
        match self.add_document_path(Path::new(&raw)) {
            Ok(name) => {
                self.banner = Banner::Info(format!("Added {}", name));
                self.path_input.clear();
            }
            Err(msg) => self.banner = Banner::Warning(msg),
        }
    }

    pub fn add_document_path(&mut self, path: &Path) -> Result<String, String> {
        if self.is_processing {
            return Err("Cannot change documents while processing".into());
        }
        let name = path.to_string_lossy();
        if DocumentKind::from_name(&name).is_none() {
            return Err(format!(
                "Unsupported file type: {} (accepted: .{})",
                name,
                DocumentKind::EXTENSIONS.join(", .")
            ));
        }
        let doc = Document::from_path(path).map_err(|e| e.to_string())?;
        let name = doc.name.clone();
        self.add_document(doc);
        Ok(name)
    }

    pub fn add_document(&mut self, doc: Document) {
        self.documents.push(doc);
        self.selected = Some(self.documents.len() - 1);
    }

    pub fn remove_selected(&mut self) {
        if self.is_processing {
            return;
        }
        if let Some(i) = self.selected {
            if i < self.documents.len() {
                let doc = self.documents.remove(i);
                self.banner = Banner::Info(format!("Removed {}", doc.name));
            }
            self.selected = if self.documents.is_empty() {
                None
            } else {
                Some(i.min(self.documents.len() - 1))
            };
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(i) = self.selected {
            self.selected = Some(i.saturating_sub(1));
        }
    }

    pub fn select_next(&mut self) {
        if let Some(i) = self.selected {
            if i + 1 < self.documents.len() {
                self.selected = Some(i + 1);
            }
        }
    }

    // ----- Prompt editing helpers -----

    pub fn insert_char(&mut self, c: char) {
        let at = char_to_byte_index(&self.prompt, self.prompt_cursor);
        self.prompt.insert(at, c);
        self.prompt_cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        let at = char_to_byte_index(&self.prompt, self.prompt_cursor);
        self.prompt.insert_str(at, s);
        self.prompt_cursor += s.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.prompt_cursor > 0 {
            let at = char_to_byte_index(&self.prompt, self.prompt_cursor - 1);
            self.prompt.remove(at);
            self.prompt_cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        if self.prompt_cursor < self.prompt.chars().count() {
            let at = char_to_byte_index(&self.prompt, self.prompt_cursor);
            self.prompt.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.prompt_cursor = self.prompt_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.prompt_cursor < self.prompt.chars().count() {
            self.prompt_cursor += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.prompt_cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.prompt_cursor = self.prompt.chars().count();
    }

    /// Prompt text before the cursor, for cursor placement.
    pub fn prompt_before_cursor(&self) -> &str {
        &self.prompt[..char_to_byte_index(&self.prompt, self.prompt_cursor)]
    }

    // ----- Runs -----

    /// Snapshot of documents and prompt for a new run, or the empty-input warning.
    pub fn begin_run(&mut self) -> Option<(Vec<Document>, String)> {
        if self.is_processing {
            return None;
        }
        if self.documents.is_empty() || self.prompt.is_empty() {
            self.banner = Banner::Warning(EmptyInput.to_string());
            return None;
        }

        self.is_processing = true;
        self.statuses = vec![DocStatus::Pending; self.documents.len()];
        self.outcomes.clear();
        self.results = None;
        self.results_scroll = 0;
        self.banner = Banner::Info("Processing files...".into());
        Some((self.documents.clone(), self.prompt.clone()))
    }

    pub fn apply_run_event(&mut self, event: RunEvent) {
        match event {
            RunEvent::Started { index, .. } => self.set_status(index, DocStatus::Running),
            RunEvent::Skipped { index, .. } => self.set_status(index, DocStatus::Skipped),
            RunEvent::Finished { index, outcome } => {
                let status = if outcome.result.is_ok() { DocStatus::Done } else { DocStatus::Failed };
                self.set_status(index, status);
                let at = self.outcomes.partition_point(|(i, _)| *i < index);
                self.outcomes.insert(at, (index, outcome));
            }
        }
    }

    pub fn finish_run(&mut self, result: Result<ResultSet, EmptyInput>) {
        self.is_processing = false;
        match result {
            Ok(results) => {
                let failures = results.failures().count();
                self.banner = if failures == 0 {
                    Banner::Success("Processing complete!".into())
                } else {
                    Banner::Warning(format!("Processing complete with {} failed document(s)", failures))
                };
                // Skipped documents have no outcome; index the rest by upload position.
                let processed = self
                    .statuses
                    .iter()
                    .enumerate()
                    .filter(|(_, status)| **status != DocStatus::Skipped)
                    .map(|(index, _)| index);
                self.outcomes = processed.zip(results.outcomes().iter().cloned()).collect();
                self.results = Some(results);
            }
            Err(warning) => self.banner = Banner::Warning(warning.to_string()),
        }
    }

    pub fn finish_run_with_error(&mut self, message: String) {
        self.is_processing = false;
        self.banner = Banner::Error(message);
    }

    /// The export action is offered only once a run produced at least one record.
    pub fn can_export(&self) -> bool {
        !self.is_processing && self.results.as_ref().is_some_and(ResultSet::has_records)
    }

    pub fn tick(&mut self) {
        if self.is_processing {
            self.spinner_tick = self.spinner_tick.wrapping_add(1);
        }
    }

    pub fn scroll_results_up(&mut self) {
        self.results_scroll = self.results_scroll.saturating_sub(1);
    }

    pub fn scroll_results_down(&mut self) {
        self.results_scroll = self.results_scroll.saturating_add(1);
    }

    fn set_status(&mut self, index: usize, status: DocStatus) {
        if let Some(slot) = self.statuses.get_mut(index) {
            *slot = status;
        }
    }
}

/// Convert a character index (0-based) to a byte index in the given string.
/// If `n` exceeds the number of characters, returns `s.len()`.
fn char_to_byte_index(s: &str, n: usize) -> usize {
    match s.char_indices().nth(n) {
        Some((i, _)) => i,
        None => s.len(),
    }
}
