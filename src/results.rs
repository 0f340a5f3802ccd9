//! Per-document outcomes and their ordered aggregation.

use thiserror::Error;

use crate::extract::ExtractError;
use crate::normalize::NormalizedRecord;

/// Why one document produced no record.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("extraction task failed: {0}")]
    Task(String),

    #[error("completion request failed: {0}")]
    Completion(String),
}

impl DocumentError {
    pub fn completion(err: &anyhow::Error) -> Self {
        Self::Completion(format!("{:#}", err))
    }
}

#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub name: String,
    pub result: Result<NormalizedRecord, DocumentError>,
}

impl DocumentOutcome {
    pub fn success(name: impl Into<String>, record: NormalizedRecord) -> Self {
        Self { name: name.into(), result: Ok(record) }
    }

    pub fn failure(name: impl Into<String>, error: DocumentError) -> Self {
        Self { name: name.into(), result: Err(error) }
    }

    pub fn record(&self) -> Option<&NormalizedRecord> {
        self.result.as_ref().ok()
    }
}

/// Outcomes of one run, in upload order. Append-only; no dedup, no bound.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    outcomes: Vec<DocumentOutcome>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, outcome: DocumentOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[DocumentOutcome] {
        &self.outcomes
    }

    /// Successful records only, preserving order.
    pub fn records(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.outcomes.iter().filter_map(DocumentOutcome::record)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &DocumentError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    pub fn record_count(&self) -> usize {
        self.records().count()
    }

    pub fn has_records(&self) -> bool {
        self.records().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
