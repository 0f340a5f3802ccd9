//! Apply a natural-language prompt to PDF/DOCX documents through an
//! OpenAI-compatible chat API, normalize each reply into a JSON object and
//! export the results as a one-sheet XLSX workbook.

pub mod cli;
pub mod config;
pub mod document;
pub mod export;
pub mod extract;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod printer;
pub mod processor;
pub mod results;
pub mod tui;
