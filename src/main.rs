use std::fs;
use std::sync::Mutex;

use anyhow::{Context, Result};
use invoice_extract::{
    cli::Cli,
    config::Config,
    document::{Document, DocumentKind},
    export,
    llm::LlmClient,
    pipeline::Pipeline,
    printer,
    tui,
};
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Load config; CLI flags override it
    let mut cfg = Config::load();
    if let Some(model) = &args.model {
        cfg.set("DEFAULT_MODEL", model.clone());
    }
    if let Some(output) = &args.output {
        cfg.set("OUTPUT_FILE", output.to_string_lossy());
    }
    if let Some(n) = args.concurrency {
        cfg.set("MAX_CONCURRENCY", n.to_string());
    }

    let use_tui = !args.no_tui && std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
    init_logging(&cfg, use_tui);

    let prompt = match &args.prompt_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file '{}'", path.display()))?,
        None => args.prompt.clone().unwrap_or_default(),
    };

    // Same filter as the upload control: only .pdf and .docx get through.
    let mut documents = Vec::with_capacity(args.doc.len());
    for path in &args.doc {
        if DocumentKind::from_name(&path.to_string_lossy()).is_none() {
            printer::print_warning(&format!("Skipping unsupported file: {}", path.display()));
            continue;
        }
        documents.push(Document::from_path(path)?);
    }

    let client = LlmClient::from_config(&cfg)?;

    if use_tui {
        tui::run_tui(&cfg, client, documents, prompt).await
    } else {
        run_line_mode(&cfg, &client, documents, &prompt).await
    }
}

/// Process once, print every result, then write the workbook if anything succeeded.
async fn run_line_mode(cfg: &Config, client: &LlmClient, documents: Vec<Document>, prompt: &str) -> Result<()> {
    let pipeline = Pipeline::new(client).with_concurrency(cfg.max_concurrency());
    let results = match pipeline.run(documents, prompt).await {
        Ok(results) => results,
        Err(warning) => {
            printer::print_warning(&warning.to_string());
            return Ok(());
        }
    };

    for outcome in results.outcomes() {
        match &outcome.result {
            Ok(record) => printer::print_record(&outcome.name, record),
            Err(err) => printer::print_failure(&outcome.name, err),
        }
    }
    printer::print_success("Processing complete!");

    if results.has_records() {
        let path = cfg.output_path();
        export::save(results.records(), &path)?;
        printer::print_success(&format!("Saved {} record(s) to {}", results.record_count(), path.display()));
    }
    Ok(())
}

/// Line mode logs warnings to stderr; the TUI owns the screen, so it logs to a file.
fn init_logging(cfg: &Config, tui: bool) {
    let default_filter = if tui { "invoice_extract=info" } else { "invoice_extract=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if !tui {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    let path = cfg.log_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(&path) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}
