//! Printers for line mode: colored banners (owo-colors) and markdown headings (termimad).

use owo_colors::OwoColorize;
use termimad::MadSkin;

use crate::normalize::NormalizedRecord;
use crate::results::DocumentError;

pub struct TextPrinter {
    pub color: Option<&'static str>,
}

impl TextPrinter {
    pub fn print(&self, text: &str) {
        if let Some(c) = self.color {
            match c {
                "green" => println!("{}", text.green()),
                "cyan" => println!("{}", text.cyan()),
                "red" => eprintln!("{}", text.red()),
                "yellow" => eprintln!("{}", text.yellow()),
                _ => println!("{}", text),
            }
        } else {
            println!("{}", text);
        }
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) {
        self.skin.print_text(text);
    }
}

/// Heading plus pretty-printed JSON for one processed document.
pub fn print_record(name: &str, record: &NormalizedRecord) {
    MarkdownPrinter::default().print(&format!("### Extracted content from {}:", name));
    let pretty = serde_json::to_string_pretty(record).unwrap_or_else(|_| format!("{:?}", record));
    TextPrinter { color: Some("cyan") }.print(&pretty);
    println!();
}

pub fn print_failure(name: &str, error: &DocumentError) {
    TextPrinter { color: Some("red") }.print(&format!("✗ {}: {}", name, error));
}

pub fn print_warning(text: &str) {
    TextPrinter { color: Some("yellow") }.print(&format!("⚠ {}", text));
}

pub fn print_success(text: &str) {
    TextPrinter { color: Some("green") }.print(&format!("✓ {}", text));
}
