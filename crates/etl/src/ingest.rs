//! Raw record loading
//!
//! Inputs are newline-delimited JSON. A file that starts with `[` is read
//! as a single JSON array instead.

use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

use crate::errors::{EtlError, Result};

/// Read every record of `path` into memory.
pub fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|source| EtlError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let records = parse_records(&content, path)?;
    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse JSON lines (or a JSON array) from an in-memory buffer.
///
/// `origin` is only used for error messages.
pub fn parse_records<T: DeserializeOwned>(content: &str, origin: &Path) -> Result<Vec<T>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).map_err(|source| EtlError::Parse {
            path: origin.to_path_buf(),
            line: source.line(),
            source,
        });
    }

    let mut records = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = serde_json::from_str(line).map_err(|source| EtlError::Parse {
            path: origin.to_path_buf(),
            line: line_idx + 1,
            source,
        })?;
        records.push(record);
    }

    Ok(records)
}
