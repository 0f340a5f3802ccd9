//! One run: extract → process → normalize → append, per document, in upload order.

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::document::Document;
use crate::extract;
use crate::llm::Completion;
use crate::normalize::normalize;
use crate::processor;
use crate::results::{DocumentError, DocumentOutcome, ResultSet};

/// Raised instead of processing when there is nothing to do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please upload files and enter a prompt before processing.")]
pub struct EmptyInput;

/// Progress notifications for a live display.
#[derive(Debug, Clone)]
pub enum RunEvent {
    Started { index: usize, name: String },
    Skipped { index: usize, name: String },
    Finished { index: usize, outcome: DocumentOutcome },
}

pub struct Pipeline<'a, C: Completion + ?Sized> {
    client: &'a C,
    concurrency: usize,
    events: Option<UnboundedSender<RunEvent>>,
}

impl<'a, C: Completion + ?Sized> Pipeline<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client, concurrency: 1, events: None }
    }

    /// Documents in flight at once. Results keep upload order regardless.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<RunEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Process every document against `prompt`.
    ///
    /// Unsupported documents are skipped silently. A failing document is
    /// recorded as a failed outcome and the remaining documents still run.
    pub async fn run(&self, documents: Vec<Document>, prompt: &str) -> Result<ResultSet, EmptyInput> {
        if documents.is_empty() || prompt.is_empty() {
            tracing::warn!(documents = documents.len(), "nothing to process");
            return Err(EmptyInput);
        }

        tracing::info!(documents = documents.len(), concurrency = self.concurrency, "starting run");

        let outcomes: Vec<Option<DocumentOutcome>> = stream::iter(documents.into_iter().enumerate())
            .map(|(index, document)| self.process_document(index, document, prompt))
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut results = ResultSet::new();
        for outcome in outcomes.into_iter().flatten() {
            results.append(outcome);
        }

        tracing::info!(
            records = results.record_count(),
            failures = results.failures().count(),
            "run complete"
        );
        Ok(results)
    }

    async fn process_document(&self, index: usize, document: Document, prompt: &str) -> Option<DocumentOutcome> {
        let name = document.name.clone();
        self.emit(RunEvent::Started { index, name: name.clone() });

        let outcome = match tokio::task::spawn_blocking(move || extract::extract(&document)).await {
            Ok(Ok(Some(text))) => match processor::process(self.client, &text, prompt).await {
                Ok(reply) => DocumentOutcome::success(&name, normalize(&reply)),
                Err(err) => {
                    tracing::warn!(name = %name, error = %format!("{:#}", err), "completion failed");
                    DocumentOutcome::failure(&name, DocumentError::completion(&err))
                }
            },
            Ok(Ok(None)) => {
                self.emit(RunEvent::Skipped { index, name });
                return None;
            }
            Ok(Err(err)) => {
                tracing::warn!(name = %name, error = %err, "extraction failed");
                DocumentOutcome::failure(&name, err.into())
            }
            Err(join) => {
                tracing::error!(name = %name, error = %join, "extraction task failed");
                DocumentOutcome::failure(&name, DocumentError::Task(join.to_string()))
            }
        };

        self.emit(RunEvent::Finished { index, outcome: outcome.clone() });
        Some(outcome)
    }

    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            // Receiver gone means nobody is watching; the run continues.
            let _ = tx.send(event);
        }
    }
}
