//! Async event handler for the interactive shell.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::{
    config::Config,
    document::Document,
    export,
    llm::LlmClient,
    pipeline::Pipeline,
};
use super::{
    app::{App, Banner, Focus},
    events::TuiEvent,
    ui::render_ui,
};

/// Frames between spinner steps (~100ms at 60 FPS).
const SPINNER_EVERY: usize = 6;

/// Run the interactive shell until the user quits.
pub async fn run_tui(cfg: &Config, client: LlmClient, documents: Vec<Document>, prompt: String) -> Result<()> {
    // Check if we're in a proper terminal environment
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("TUI mode requires a proper terminal environment"));
    }

    let mut app = App::new(client.model().to_string(), cfg.output_path());
    for doc in documents {
        app.add_document(doc);
    }
    app.insert_str(&prompt);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (event_tx, event_rx) = mpsc::unbounded_channel::<TuiEvent>();
    let client = Arc::new(client);

    let result = run_app(&mut terminal, &mut app, client, cfg.max_concurrency(), event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: Arc<LlmClient>,
    concurrency: usize,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
    mut event_rx: mpsc::UnboundedReceiver<TuiEvent>,
) -> Result<()> {
    // Spawn input handler; it stops once the loop below drops the receiver.
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        while !input_tx.is_closed() {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => input_tx.send(TuiEvent::Key(key)),
                    Ok(Event::Paste(text)) => input_tx.send(TuiEvent::Paste(text)),
                    _ => Ok(()),
                };
                if forwarded.is_err() {
                    break;
                }
            }
        }
    });

    let mut frame_count = 0usize;
    loop {
        terminal.draw(|frame| render_ui(frame, app))?;

        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, key, &client, concurrency, &event_tx) {
                        return Ok(());
                    }
                }
                TuiEvent::Paste(text) => match app.focus {
                    Focus::Prompt => app.insert_str(&text),
                    Focus::Documents => app.path_input.push_str(text.trim()),
                },
                TuiEvent::Run(run_event) => app.apply_run_event(run_event),
                TuiEvent::RunFinished(result) => app.finish_run(result),
                TuiEvent::RunAborted(message) => app.finish_run_with_error(message),
            }
        }

        frame_count = frame_count.wrapping_add(1);
        if frame_count % SPINNER_EVERY == 0 {
            app.tick();
        }

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await; // ~60 FPS
    }
}

/// Handle keyboard events; returns true when the user asked to quit.
fn handle_key_event(
    app: &mut App,
    key: crossterm::event::KeyEvent,
    client: &Arc<LlmClient>,
    concurrency: usize,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return true;
    }
    if app.show_help {
        app.toggle_help();
        return false;
    }

    match key.code {
        KeyCode::Char('r') if ctrl => {
            if let Some((documents, prompt)) = app.begin_run() {
                spawn_run(Arc::clone(client), concurrency, documents, prompt, event_tx.clone());
            }
        }
        KeyCode::Char('s') if ctrl => export_results(app),
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),
        KeyCode::PageUp => app.scroll_results_up(),
        KeyCode::PageDown => app.scroll_results_down(),
        _ => match app.focus {
            Focus::Documents => handle_documents_key(app, key.code),
            Focus::Prompt => handle_prompt_key(app, key.code),
        },
    }
    false
}

fn handle_documents_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.submit_path(),
        KeyCode::Backspace => {
            app.path_input.pop();
        }
        KeyCode::Delete => app.remove_selected(),
        KeyCode::Up => app.select_prev(),
        KeyCode::Down => app.select_next(),
        KeyCode::Char(c) => app.path_input.push(c),
        _ => {}
    }
}

fn handle_prompt_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.insert_char('\n'),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::Char(c) => app.insert_char(c),
        _ => {}
    }
}

/// Run the pipeline in the background, forwarding progress to the UI loop.
fn spawn_run(
    client: Arc<LlmClient>,
    concurrency: usize,
    documents: Vec<Document>,
    prompt: String,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
) {
    let done_tx = event_tx.clone();
    let handle = tokio::spawn(async move {
        let (run_tx, mut run_rx) = mpsc::unbounded_channel();
        let forward_tx = event_tx.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(run_event) = run_rx.recv().await {
                if forward_tx.send(TuiEvent::Run(run_event)).is_err() {
                    break;
                }
            }
        });

        let result = {
            let pipeline = Pipeline::new(client.as_ref())
                .with_concurrency(concurrency)
                .with_events(run_tx);
            pipeline.run(documents, &prompt).await
        };

        // Progress must be delivered before the final result.
        let _ = forwarder.await;
        let _ = event_tx.send(TuiEvent::RunFinished(result));
    });

    tokio::spawn(async move {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "run task failed");
            let _ = done_tx.send(TuiEvent::RunAborted(format!("Processing aborted: {}", err)));
        }
    });
}

fn export_results(app: &mut App) {
    if !app.can_export() {
        app.banner = Banner::Warning("No results to export yet".into());
        return;
    }
    let Some(results) = app.results.as_ref() else {
        return;
    };

    let count = results.record_count();
    let saved = export::save(results.records(), &app.export_path);
    app.banner = match saved {
        Ok(()) => Banner::Success(format!("Saved {} record(s) to {}", count, app.export_path.display())),
        Err(err) => Banner::Error(format!("Export failed: {:#}", err)),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use std::path::{Path, PathBuf};

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let client = Arc::new(LlmClient::from_config(&Config::load_from(Path::new("/nonexistent/.invoicerc"))).unwrap());
        let (tx, _rx) = mpsc::unbounded_channel();
        handle_key_event(app, KeyEvent::new(code, modifiers), &client, 1, &tx)
    }

    #[test]
    fn test_ctrl_c_quits_while_help_is_open() {
        let mut app = App::new("gpt-3.5-turbo".into(), PathBuf::from("results.xlsx"));
        app.toggle_help();
        assert!(press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL));
    }

    #[test]
    fn test_other_keys_only_close_help() {
        let mut app = App::new("gpt-3.5-turbo".into(), PathBuf::from("results.xlsx"));
        app.toggle_help();
        assert!(!press(&mut app, KeyCode::Char('x'), KeyModifiers::NONE));
        assert!(!app.show_help);
        assert!(app.path_input.is_empty());
    }
}
