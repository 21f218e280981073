use std::path::Path;

use crate::error::Result;
use crate::models::MetadataRecord;

/// Write records as a pretty-printed (two-space indented) JSON array,
/// creating the parent directory if needed.
pub fn write_records(path: &Path, records: &[MetadataRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<MetadataRecord>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
