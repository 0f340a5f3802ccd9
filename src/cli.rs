use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "invoice-extract", about = "Apply an LLM prompt to PDF/DOCX documents and export the results", version)]
#[command(group(ArgGroup::new("prompt_source").args(["prompt", "prompt_file"]).multiple(false)))]
pub struct Cli {
    /// Document to process (.pdf or .docx). Can be used multiple times:
    /// --doc invoice1.pdf --doc invoice2.docx
    #[arg(long = "doc", value_name = "FILE", action = clap::ArgAction::Append)]
    pub doc: Vec<PathBuf>,

    /// Prompt applied to every document.
    #[arg(short = 'p', long)]
    pub prompt: Option<String>,

    /// Read the prompt from a file (multi-line prompts).
    #[arg(long = "prompt-file", value_name = "FILE")]
    pub prompt_file: Option<PathBuf>,

    /// Large language model to use.
    #[arg(long)]
    pub model: Option<String>,

    /// Where to write the exported workbook.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Documents processed at once (results keep upload order).
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: Option<u16>,

    /// Run once without the terminal UI (implied when stdout is not a terminal).
    #[arg(long = "no-tui")]
    pub no_tui: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_docs_and_prompt() {
        let cli = Cli::try_parse_from([
            "invoice-extract",
            "--doc",
            "a.pdf",
            "--doc",
            "b.docx",
            "-p",
            "Summarize",
            "--no-tui",
        ])
        .unwrap();
        assert_eq!(cli.doc, vec![PathBuf::from("a.pdf"), PathBuf::from("b.docx")]);
        assert_eq!(cli.prompt.as_deref(), Some("Summarize"));
        assert!(cli.no_tui);
    }

    #[test]
    fn test_prompt_sources_are_exclusive() {
        let res = Cli::try_parse_from(["invoice-extract", "-p", "x", "--prompt-file", "p.txt"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Cli::try_parse_from(["invoice-extract", "--concurrency", "0"]).is_err());
    }
}
