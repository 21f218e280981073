use std::path::Path;

use tracing::debug;

use crate::error::{CoreError, Result};

pub const DEFAULT_LINK_COLUMN: &str = "Link";

/// Read article URLs from the named column of a CSV file with a header row.
/// Blank and missing cells are dropped; order is preserved.
pub fn load_links(path: &Path, column: &str) -> Result<Vec<String>> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;
    read_links(reader, column)
}

pub fn read_links<R: std::io::Read>(mut reader: csv::Reader<R>, column: &str) -> Result<Vec<String>> {
    let idx = reader
        .headers()?
        .iter()
        .position(|header| header.trim() == column)
        .ok_or_else(|| CoreError::MissingColumn(column.to_string()))?;

    let mut links = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(value) = row.get(idx).map(str::trim).filter(|v| !v.is_empty()) {
            links.push(value.to_string());
        }
    }

    debug!(count = links.len(), column, "loaded links");
    Ok(links)
}
