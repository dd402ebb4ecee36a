//! Flat-file output
//!
//! The unified table is written to a temporary file next to the target and
//! renamed over it, so a re-run replaces the previous output whole.

use offerlab_types::{UnifiedRecord, UNIFIED_COLUMNS};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use crate::errors::{EtlError, Result};

/// Serialize rows as CSV with a header into any writer.
pub fn write_csv<W: Write>(writer: W, rows: &[UnifiedRecord]) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    csv_writer.write_record(UNIFIED_COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write the unified table to `path`, replacing any previous file.
pub fn write_unified(path: &Path, rows: &[UnifiedRecord]) -> Result<()> {
    let write_err = |source: std::io::Error| EtlError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    write_csv(tmp.as_file_mut(), rows)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;

    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use offerlab_types::EventKind;

    fn row() -> UnifiedRecord {
        UnifiedRecord {
            account_id: "a1".into(),
            offer_id: Some("o1".into()),
            event: EventKind::OfferReceived,
            time: Some(0.0),
            amount: None,
            reward: None,
            gender: Some("F".into()),
            age: Some(45.0),
            credit_card_limit: Some(64_000.0),
            registered_on: NaiveDate::from_ymd_opt(2017, 2, 12),
            offer_type: Some("bogo".into()),
            discount_value: Some(10.0),
            min_value: Some(10.0),
            duration: Some(7.0),
            web: Some(0),
            email: Some(1),
            mobile: Some(1),
            social: Some(1),
        }
    }

    #[test]
    fn header_matches_column_order() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.trim_end(), UNIFIED_COLUMNS.join(","));
    }

    #[test]
    fn nulls_are_written_as_empty_fields() {
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[row()]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let line = text.lines().nth(1).unwrap();

        assert_eq!(
            line,
            "a1,o1,offer received,0.0,,,F,45.0,64000.0,2017-02-12,bogo,10.0,10.0,7.0,0,1,1,1"
        );
    }

    #[test]
    fn output_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("unified.csv");

        write_unified(&path, &[row(), row()]).unwrap();
        write_unified(&path, &[row()]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
