//! Spreadsheet export of normalized records.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatBorder, Workbook};

use crate::normalize::NormalizedRecord;

pub const SHEET_NAME: &str = "Responses";
pub const COLUMN_HEADER: &str = "Extracted Data";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Excel refuses cell strings longer than this.
const MAX_CELL_CHARS: usize = 32_767;

/// Serialize records into a one-sheet, one-column XLSX workbook.
///
/// Row 0 is the header; each following row holds one record re-serialized as
/// compact JSON text, in the order given. The cursor is rewound to the start.
pub fn export<'a, I>(records: I) -> Result<Cursor<Vec<u8>>>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold().set_border(FormatBorder::Thin);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;
    worksheet.write_string_with_format(0, 0, COLUMN_HEADER, &header)?;

    let mut rows = 0u32;
    for record in records {
        let cell = cell_text(record)?;
        rows += 1;
        worksheet.write_string(rows, 0, &cell)?;
    }

    let bytes = workbook.save_to_buffer().context("failed to build XLSX workbook")?;
    tracing::debug!(rows, bytes = bytes.len(), "exported records");

    // A fresh cursor starts at position 0.
    Ok(Cursor::new(bytes))
}

/// Export and write the workbook to `path`.
pub fn save<'a, I>(records: I, path: &Path) -> Result<()>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let cursor = export(records)?;
    fs::write(path, cursor.into_inner()).with_context(|| format!("failed to write '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "saved results workbook");
    Ok(())
}

fn cell_text(record: &NormalizedRecord) -> Result<String> {
    let text = serde_json::to_string(record)?;
    if text.chars().count() <= MAX_CELL_CHARS {
        return Ok(text);
    }
    tracing::warn!(chars = text.chars().count(), "record exceeds the XLSX cell limit; truncating");
    Ok(text.chars().take(MAX_CELL_CHARS).collect())
}
