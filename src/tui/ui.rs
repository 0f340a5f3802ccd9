//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{App, Banner, DocStatus, Focus};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Documents + prompt
            Constraint::Min(3),     // Results
            Constraint::Length(1),  // Banner
            Constraint::Length(1),  // Status bar
        ])
        .split(frame.area());

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_layout[0]);

    render_documents(frame, app, top[0]);
    render_prompt(frame, app, top[1]);
    render_results(frame, app, main_layout[1]);
    render_banner(frame, app, main_layout[2]);
    render_status_bar(frame, app, main_layout[3]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Block::default().borders(Borders::ALL).title(title).border_style(style)
}

/// Path input on the first line, then the selected documents with their run status.
fn render_documents(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Documents;
    let mut lines = vec![Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Green)),
        Span::raw(app.path_input.clone()),
    ])];

    for (i, doc) in app.documents.iter().enumerate() {
        let (marker, style) = match app.statuses.get(i) {
            Some(DocStatus::Running) => (SPINNER[app.spinner_tick % SPINNER.len()], Style::default().fg(Color::Yellow)),
            Some(DocStatus::Done) => ("✓", Style::default().fg(Color::Green)),
            Some(DocStatus::Failed) => ("✗", Style::default().fg(Color::Red)),
            Some(DocStatus::Skipped) => ("-", Style::default().fg(Color::DarkGray)),
            Some(DocStatus::Pending) | None => (" ", Style::default()),
        };
        let selected = app.selected == Some(i);
        let name_style = if selected { style.add_modifier(Modifier::REVERSED) } else { style };
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", marker), style),
            Span::styled(format!("{}. {}", i + 1, doc.name), name_style),
        ]));
    }

    let title = format!("Documents (.pdf, .docx) [{}]", app.documents.len());
    let paragraph = Paragraph::new(Text::from(lines)).block(pane_block(title, focused));
    frame.render_widget(paragraph, area);

    if focused && !app.show_help {
        let x = area.x + 1 + 2 + app.path_input.width() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_prompt(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Prompt;
    let paragraph = Paragraph::new(app.prompt.as_str()).block(pane_block("Prompt".into(), focused));
    frame.render_widget(paragraph, area);

    if focused && !app.show_help {
        let before = app.prompt_before_cursor();
        let row = before.matches('\n').count() as u16;
        let col = before.rsplit('\n').next().unwrap_or("").width() as u16;
        let x = (area.x + 1 + col).min(area.right().saturating_sub(2));
        let y = (area.y + 1 + row).min(area.bottom().saturating_sub(2));
        frame.set_cursor_position((x, y));
    }
}

/// One section per processed document: heading plus pretty JSON, or the error.
fn render_results(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();

    for (_, outcome) in &app.outcomes {
        match &outcome.result {
            Ok(record) => {
                lines.push(Line::from(Span::styled(
                    format!("Extracted content from {}:", outcome.name),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
                let pretty = serde_json::to_string_pretty(record).unwrap_or_default();
                for line in pretty.lines() {
                    lines.push(Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Cyan))));
                }
            }
            Err(err) => {
                lines.push(Line::from(Span::styled(
                    format!("Failed to process {}:", outcome.name),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red))));
            }
        }
        lines.push(Line::from(""));
    }

    let title = match &app.results {
        Some(results) => format!("Results ({} record(s))", results.record_count()),
        None => "Results".to_string(),
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
        .scroll((app.results_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_banner(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.banner {
        Banner::Info(m) => (m.clone(), Style::default().fg(Color::Gray)),
        Banner::Warning(m) => (format!("⚠ {}", m), Style::default().fg(Color::Yellow)),
        Banner::Success(m) => (format!("✓ {}", m), Style::default().fg(Color::Green)),
        Banner::Error(m) => (format!("✗ {}", m), Style::default().fg(Color::Red)),
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status_text = if app.is_processing {
        format!(
            "{} Processing files... | Model: {} | ctrl+c quit",
            SPINNER[app.spinner_tick % SPINNER.len()],
            app.model
        )
    } else {
        let mut actions = vec!["tab focus", "ctrl+r process"];
        if app.can_export() {
            actions.push("ctrl+s save");
        }
        actions.push("F1 help");
        format!("Model: {} | {}", app.model, actions.join(" | "))
    };

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_paragraph, area);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(70, 60, frame.area());

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Documents pane:"),
        Line::from("  type a path + Enter - Add a .pdf or .docx file"),
        Line::from("  ↑/↓                 - Select document"),
        Line::from("  Delete              - Remove selected document"),
        Line::from(""),
        Line::from("Prompt pane:"),
        Line::from("  Enter               - New line"),
        Line::from("  ←/→ Home/End        - Move cursor"),
        Line::from(""),
        Line::from("Anywhere:"),
        Line::from("  Tab                 - Switch pane"),
        Line::from("  Ctrl+R              - Process files"),
        Line::from("  Ctrl+S              - Save results workbook"),
        Line::from("  PgUp/PgDn           - Scroll results"),
        Line::from("  F1                  - Toggle this help"),
        Line::from("  Ctrl+C              - Quit"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::normalize::normalize;
    use crate::results::{DocumentOutcome, ResultSet};
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render_ui(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_results_and_save_hint() {
        let mut app = App::new("gpt-3.5-turbo".into(), PathBuf::from("results.xlsx"));
        app.add_document(Document::new("invoice.pdf", Vec::new()));
        app.prompt = "Summarize".into();
        app.begin_run().unwrap();
        let mut results = ResultSet::new();
        results.append(DocumentOutcome::success("invoice.pdf", normalize(r#"{"summary":"ok"}"#)));
        app.finish_run(Ok(results));

        let text = screen(&app);
        assert!(text.contains("Extracted content from invoice.pdf:"));
        assert!(text.contains("\"summary\": \"ok\""));
        assert!(text.contains("ctrl+s save"));
    }

    #[test]
    fn test_no_save_hint_without_results() {
        let app = App::new("gpt-3.5-turbo".into(), PathBuf::from("results.xlsx"));
        assert!(!screen(&app).contains("ctrl+s save"));
    }
}
